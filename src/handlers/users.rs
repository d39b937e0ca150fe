// handlers/users.rs - /users routes
//
// Collection routes need an admin; /users/:username accepts an admin or
// that user (see app::user_routes).

use axum::{
    extract::{rejection::JsonRejection, Path},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::validate::{json_body, update_fields, Validator};
use crate::auth::create_token;
use crate::database::models::{NewUser, User};
use crate::database::DatabaseManager;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

pub(crate) fn validate_new_user(data: &NewUser) -> Result<(), ApiError> {
    Validator::new()
        .length("username", &data.username, 1, 30)
        .length("password", &data.password, 5, 20)
        .length("firstName", &data.first_name, 1, 30)
        .length("lastName", &data.last_name, 1, 30)
        .length("email", &data.email, 6, 60)
        .email("email", &data.email)
        .finish()
}

fn validate_update(data: &UserUpdate) -> Result<(), ApiError> {
    let mut v = Validator::new();
    if let Some(first_name) = &data.first_name {
        v.length("firstName", first_name, 1, 30);
    }
    if let Some(last_name) = &data.last_name {
        v.length("lastName", last_name, 1, 30);
    }
    if let Some(password) = &data.password {
        v.length("password", password, 5, 20);
    }
    if let Some(email) = &data.email {
        v.length("email", email, 6, 60).email("email", email);
    }
    v.finish()
}

/// POST /users - admin only. Unlike /auth/register this can create admins.
pub async fn create(payload: Result<Json<NewUser>, JsonRejection>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let data = json_body(payload)?;
    validate_new_user(&data)?;

    let pool = DatabaseManager::pool()?;
    let user = User::register(&pool, &data).await?;
    let token = create_token(&user.username, user.is_admin)?;
    Ok((StatusCode::CREATED, Json(json!({ "user": user, "token": token }))))
}

/// GET /users - admin only
pub async fn list() -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool()?;
    let users = User::find_all(&pool).await?;
    Ok(Json(json!({ "users": users })))
}

/// GET /users/:username
pub async fn get(Path(username): Path<String>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool()?;
    let user = User::get(&pool, &username).await?;
    Ok(Json(json!({ "user": user })))
}

/// PATCH /users/:username
pub async fn update(
    Path(username): Path<String>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let data = json_body(payload)?;
    validate_update(&data)?;
    let fields = update_fields(&data)?;

    let pool = DatabaseManager::pool()?;
    let user = User::update(&pool, &username, &fields).await?;
    Ok(Json(json!({ "user": user })))
}

/// DELETE /users/:username
pub async fn remove(Path(username): Path<String>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool()?;
    User::remove(&pool, &username).await?;
    Ok(Json(json!({ "deleted": username })))
}
