// handlers/auth.rs - public token acquisition

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::users::validate_new_user;
use super::validate::{json_body, Validator};
use crate::auth::create_token;
use crate::database::models::{NewUser, User};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ensure_logged_in, CurrentUser};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        NewUser {
            username: req.username,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            is_admin: false,
        }
    }
}

/// POST /auth/token { username, password } => { token }
pub async fn token(payload: Result<Json<TokenRequest>, JsonRejection>) -> Result<Json<Value>, ApiError> {
    let req = json_body(payload)?;
    Validator::new()
        .length("username", &req.username, 1, 30)
        .length("password", &req.password, 5, 20)
        .finish()?;

    let pool = DatabaseManager::pool()?;
    let user = User::authenticate(&pool, &req.username, &req.password).await?;
    let token = create_token(&user.username, user.is_admin)?;
    Ok(Json(json!({ "token": token })))
}

/// POST /auth/register { user } => { token }. Self-registered users are never admins.
pub async fn register(
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let data = NewUser::from(json_body(payload)?);
    validate_new_user(&data)?;

    let pool = DatabaseManager::pool()?;
    let user = User::register(&pool, &data).await?;
    let token = create_token(&user.username, user.is_admin)?;
    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

/// GET /auth/whoami - the identity carried by the caller's token
pub async fn whoami(Extension(current): Extension<CurrentUser>) -> Result<Json<Value>, ApiError> {
    let principal = ensure_logged_in(current.principal())?;
    Ok(Json(json!({ "user": principal })))
}
