//! Request body validation.

use std::collections::HashMap;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::sql::FieldUpdateSet;

/// Unwrap a JSON body, reporting malformed JSON and wrong field types as 400.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
    }
}

/// Unwrap a query string, reporting repeated or conflicting keys as 400.
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    match query {
        Ok(Query(params)) => Ok(params),
        Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
    }
}

/// For `Option<Option<T>>` update fields: absent stays `None`, an explicit
/// `null` becomes `Some(None)`. Use with `#[serde(default)]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Fields of an update body that were actually supplied, in declaration order.
pub fn update_fields<T: Serialize>(update: &T) -> Result<FieldUpdateSet, ApiError> {
    match serde_json::to_value(update) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => {
            tracing::error!("Update body serialized to non-object: {}", other);
            Err(ApiError::internal_server_error("Failed to read update"))
        }
        Err(e) => {
            tracing::error!("Failed to serialize update body: {}", e);
            Err(ApiError::internal_server_error("Failed to read update"))
        }
    }
}

/// Collects per-field problems and reports them together.
#[derive(Debug, Default)]
pub struct Validator {
    field_errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let len = value.chars().count();
        if len < min || len > max {
            self.fail(field, format!("must be between {} and {} characters", min, max));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        let valid = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };
        if !valid {
            self.fail(field, "must be a valid email address");
        }
        self
    }

    pub fn url(&mut self, field: &str, value: &str) -> &mut Self {
        if url::Url::parse(value).is_err() {
            self.fail(field, "must be a valid URL");
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: i32) -> &mut Self {
        if value < 0 {
            self.fail(field, "must not be negative");
        }
        self
    }

    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.field_errors.is_empty() {
            return Ok(());
        }
        Err(ApiError::validation_error(
            "Invalid request data",
            Some(std::mem::take(&mut self.field_errors)),
        ))
    }
}
