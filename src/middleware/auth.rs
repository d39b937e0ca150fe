use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{decode_token, Principal};
use crate::config;

/// Result of identity extraction for the current request.
///
/// Always inserted by [`authenticate_jwt`]; `None` means anonymous.
#[derive(Clone, Debug, Default)]
pub struct CurrentUser(pub Option<Principal>);

impl CurrentUser {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

/// Identity extraction middleware. Never rejects a request: a missing or bad
/// token just leaves the request anonymous for the gates further down.
pub async fn authenticate_jwt(mut request: Request, next: Next) -> Response {
    let principal = extract_principal(request.headers(), &config::config().security.jwt_secret);
    request.extensions_mut().insert(CurrentUser(principal));
    next.run(request).await
}

/// Verify the bearer token in `headers`, if any.
pub fn extract_principal(headers: &HeaderMap, secret: &str) -> Option<Principal> {
    let token = match extract_bearer_token(headers) {
        Ok(token) => token,
        Err(reason) => {
            tracing::trace!("No identity on request: {}", reason);
            return None;
        }
    };

    match decode_token(token, secret) {
        Ok(claims) => Some(Principal::from(claims)),
        Err(e) => {
            tracing::debug!("Ignoring bearer token: {}", e);
            None
        }
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "invalid Authorization header encoding")?;

    // Scheme names are case-insensitive
    let (scheme, token) = auth_str
        .trim_start()
        .split_once(' ')
        .ok_or("Authorization header must use Bearer scheme")?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err("Authorization header must use Bearer scheme");
    }
    let token = token.trim();

    if token.is_empty() {
        return Err("empty bearer token");
    }
    Ok(token)
}
