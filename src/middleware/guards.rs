//! Route gates.
//!
//! The `ensure_*` functions are the decisions; they look only at the
//! principal (and route parameters) handed to them. The `require_*` functions
//! adapt them to axum middleware for use with `route_layer`. A request that
//! never passed through [`authenticate_jwt`](super::authenticate_jwt) is
//! treated as anonymous.

use std::collections::HashMap;

use axum::{
    extract::{Path, Request},
    middleware::Next,
    response::Response,
};

use super::auth::CurrentUser;
use crate::auth::Principal;
use crate::error::ApiError;

const UNAUTHORIZED: &str = "Unauthorized";

/// Passes for any principal with a username.
pub fn ensure_logged_in(principal: Option<&Principal>) -> Result<&Principal, ApiError> {
    match principal {
        Some(p) if !p.username.is_empty() => Ok(p),
        _ => Err(ApiError::unauthorized(UNAUTHORIZED)),
    }
}

/// Passes only for admins.
pub fn ensure_admin(principal: Option<&Principal>) -> Result<&Principal, ApiError> {
    match principal {
        Some(p) if p.is_admin => Ok(p),
        _ => Err(ApiError::unauthorized(UNAUTHORIZED)),
    }
}

/// Passes for admins and for the user named by the route's `:username`.
pub fn ensure_admin_or_correct_user<'p>(
    principal: Option<&'p Principal>,
    username: &str,
) -> Result<&'p Principal, ApiError> {
    match principal {
        Some(p) if p.is_admin => Ok(p),
        Some(p) if !p.username.is_empty() && p.username == username => Ok(p),
        _ => Err(ApiError::unauthorized(UNAUTHORIZED)),
    }
}

fn current_principal(request: &Request) -> Option<&Principal> {
    request
        .extensions()
        .get::<CurrentUser>()
        .and_then(CurrentUser::principal)
}

pub async fn require_logged_in(request: Request, next: Next) -> Result<Response, ApiError> {
    if let Err(e) = ensure_logged_in(current_principal(&request)) {
        tracing::debug!("Denied {} {}: not logged in", request.method(), request.uri().path());
        return Err(e);
    }
    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    if let Err(e) = ensure_admin(current_principal(&request)) {
        tracing::debug!("Denied {} {}: admin required", request.method(), request.uri().path());
        return Err(e);
    }
    Ok(next.run(request).await)
}

pub async fn require_admin_or_correct_user(
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let username = params.get("username").map(String::as_str).unwrap_or_default();
    if let Err(e) = ensure_admin_or_correct_user(current_principal(&request), username) {
        tracing::debug!(
            "Denied {} {}: admin or user '{}' required",
            request.method(),
            request.uri().path(),
            username
        );
        return Err(e);
    }
    Ok(next.run(request).await)
}
