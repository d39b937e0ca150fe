// handlers/companies.rs - /companies routes
//
// Reads are public; create, update and delete sit behind the admin gate
// (see app::company_routes).

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::validate::{json_body, nullable, query_params, update_fields, Validator};
use crate::database::models::{Company, NewCompany};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::sql::{sql_for_company_search, CompanySearch};

/// PATCH body. `numEmployees` and `logoUrl` may be set to `null` to clear
/// them; `name` and `description` are required columns.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<Option<String>>,
}

fn validate_new(data: &NewCompany) -> Result<(), ApiError> {
    let mut v = Validator::new();
    v.length("handle", &data.handle, 1, 25).length("name", &data.name, 1, 100);
    if let Some(n) = data.num_employees {
        v.non_negative("numEmployees", n);
    }
    if let Some(url) = &data.logo_url {
        v.url("logoUrl", url);
    }
    v.finish()
}

fn validate_update(data: &CompanyUpdate) -> Result<(), ApiError> {
    let mut v = Validator::new();
    if let Some(name) = &data.name {
        v.length("name", name, 1, 100);
    }
    if let Some(Some(n)) = data.num_employees {
        v.non_negative("numEmployees", n);
    }
    if let Some(Some(url)) = &data.logo_url {
        v.url("logoUrl", url);
    }
    v.finish()
}

/// POST /companies - admin only
pub async fn create(payload: Result<Json<NewCompany>, JsonRejection>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let data = json_body(payload)?;
    validate_new(&data)?;

    let pool = DatabaseManager::pool()?;
    let company = Company::create(&pool, &data).await?;
    Ok((StatusCode::CREATED, Json(json!({ "company": company }))))
}

/// GET /companies?nameLike=&minEmployees=&maxEmployees=
pub async fn list(query: Result<Query<CompanySearch>, QueryRejection>) -> Result<Json<Value>, ApiError> {
    let search = query_params(query)?;
    let filter = sql_for_company_search(&search)?;

    let pool = DatabaseManager::pool()?;
    let companies = Company::find_all(&pool, &filter).await?;
    Ok(Json(json!({ "companies": companies })))
}

/// GET /companies/:handle
pub async fn get(Path(handle): Path<String>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool()?;
    let company = Company::get(&pool, &handle).await?;
    Ok(Json(json!({ "company": company })))
}

/// PATCH /companies/:handle - admin only
pub async fn update(
    Path(handle): Path<String>,
    payload: Result<Json<CompanyUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let data = json_body(payload)?;
    validate_update(&data)?;
    let fields = update_fields(&data)?;

    let pool = DatabaseManager::pool()?;
    let company = Company::update(&pool, &handle, &fields).await?;
    Ok(Json(json!({ "company": company })))
}

/// DELETE /companies/:handle - admin only
pub async fn remove(Path(handle): Path<String>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool()?;
    Company::remove(&pool, &handle).await?;
    Ok(Json(json!({ "deleted": handle })))
}
