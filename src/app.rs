use axum::{
    http::{header, HeaderValue, StatusCode},
    middleware::from_fn,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{self, Environment};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::{auth, companies, users};
use crate::middleware::{authenticate_jwt, require_admin, require_admin_or_correct_user, require_logged_in};

/// The full application router.
///
/// Identity extraction wraps every route; the per-route gates run after
/// routing so they can see path parameters such as `:username`.
pub fn app() -> Router {
    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(company_routes())
        .merge(user_routes())
        .fallback(not_found)
        .layer(from_fn(authenticate_jwt))
        .layer(cors_layer());

    if config::config().api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn auth_routes() -> Router {
    Router::new()
        .route("/auth/token", post(auth::token))
        .route("/auth/register", post(auth::register))
        .route("/auth/whoami", get(auth::whoami).route_layer(from_fn(require_logged_in)))
}

fn company_routes() -> Router {
    Router::new()
        .route(
            "/companies",
            get(companies::list).merge(post(companies::create).route_layer(from_fn(require_admin))),
        )
        .route(
            "/companies/:handle",
            get(companies::get).merge(
                axum::routing::patch(companies::update)
                    .delete(companies::remove)
                    .route_layer(from_fn(require_admin)),
            ),
        )
}

fn user_routes() -> Router {
    Router::new()
        .route(
            "/users",
            post(users::create)
                .get(users::list)
                .route_layer(from_fn(require_admin)),
        )
        .route(
            "/users/:username",
            get(users::get)
                .patch(users::update)
                .delete(users::remove)
                .route_layer(from_fn(require_admin_or_correct_user)),
        )
}

fn cors_layer() -> CorsLayer {
    let security = &config::config().security;
    if config::config().environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Jobly API",
        "version": version,
        "endpoints": {
            "auth": "/auth/token, /auth/register (public), /auth/whoami (logged in)",
            "companies": "/companies[/:handle] (reads public, writes admin)",
            "users": "/users (admin), /users/:username (admin or same user)",
        }
    }))
}

async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use crate::auth::{encode_token, Claims};
    use crate::testing::{admin_token, u1_token, u2_token};

    async fn send(router: Router, method: &str, uri: &str, auth: Option<&str>) -> StatusCode {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let body = if method == "GET" || method == "DELETE" {
            Body::empty()
        } else {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(r#"{"firstName":"New"}"#)
        };
        router.oneshot(builder.body(body).unwrap()).await.unwrap().status()
    }

    /// Same gates as `app()`, with handlers that don't need a database.
    fn gated_stub_router() -> Router {
        async fn ok() -> &'static str {
            "ok"
        }

        Router::new()
            .route("/auth/whoami", get(auth::whoami).route_layer(from_fn(require_logged_in)))
            .route("/users", get(ok).post(ok).route_layer(from_fn(require_admin)))
            .route(
                "/users/:username",
                get(ok).patch(ok).delete(ok).route_layer(from_fn(require_admin_or_correct_user)),
            )
            .layer(from_fn(authenticate_jwt))
    }

    #[tokio::test]
    async fn anonymous_requests_to_user_routes_are_401() {
        for (method, uri) in [
            ("POST", "/users"),
            ("GET", "/users"),
            ("GET", "/users/u1"),
            ("PATCH", "/users/u1"),
            ("DELETE", "/users/u1"),
            ("GET", "/users/nope"),
            ("GET", "/auth/whoami"),
        ] {
            assert_eq!(send(app(), method, uri, None).await, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }

    #[tokio::test]
    async fn non_admin_cannot_reach_admin_routes() {
        let token = u1_token();
        for (method, uri) in [
            ("POST", "/users"),
            ("GET", "/users"),
            ("POST", "/companies"),
            ("PATCH", "/companies/c1"),
            ("DELETE", "/companies/c1"),
        ] {
            assert_eq!(
                send(app(), method, uri, Some(&token)).await,
                StatusCode::UNAUTHORIZED,
                "{} {}",
                method,
                uri
            );
        }
    }

    #[tokio::test]
    async fn other_user_is_401_even_for_missing_user() {
        let token = u2_token();
        for (method, uri) in [
            ("GET", "/users/u1"),
            ("PATCH", "/users/u1"),
            ("DELETE", "/users/u1"),
            ("PATCH", "/users/nope"),
            ("DELETE", "/users/nope"),
        ] {
            assert_eq!(
                send(app(), method, uri, Some(&token)).await,
                StatusCode::UNAUTHORIZED,
                "{} {}",
                method,
                uri
            );
        }
    }

    #[tokio::test]
    async fn bad_tokens_behave_like_anonymous() {
        let wrong_secret = format!(
            "Bearer {}",
            encode_token(&Claims::new("uA", true), "wrong").unwrap()
        );
        assert_eq!(send(app(), "GET", "/users", Some(&wrong_secret)).await, StatusCode::UNAUTHORIZED);
        assert_eq!(send(app(), "GET", "/users", Some("Bearer garbage")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(send(app(), "GET", "/users", Some(&admin_token().replacen("Bearer", "Token", 1))).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn gates_admit_admin_and_owner() {
        let admin = admin_token();
        let u1 = u1_token();

        assert_eq!(send(gated_stub_router(), "GET", "/users", Some(&admin)).await, StatusCode::OK);
        assert_eq!(send(gated_stub_router(), "POST", "/users", Some(&admin)).await, StatusCode::OK);
        assert_eq!(send(gated_stub_router(), "GET", "/users/u1", Some(&admin)).await, StatusCode::OK);
        assert_eq!(send(gated_stub_router(), "GET", "/users/u1", Some(&u1)).await, StatusCode::OK);
        assert_eq!(send(gated_stub_router(), "PATCH", "/users/u1", Some(&u1)).await, StatusCode::OK);
        assert_eq!(send(gated_stub_router(), "DELETE", "/users/u1", Some(&u1)).await, StatusCode::OK);
        assert_eq!(send(gated_stub_router(), "GET", "/users", Some(&u1)).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn whoami_returns_token_identity() {
        let response = gated_stub_router()
            .oneshot(
                Request::builder()
                    .uri("/auth/whoami")
                    .header(header::AUTHORIZATION, admin_token())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "user": { "username": "uA", "isAdmin": true } }));
    }

    #[tokio::test]
    async fn unauthorized_body_is_json_error() {
        let response = app()
            .oneshot(Request::builder().uri("/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        assert_eq!(send(app(), "GET", "/nope", None).await, StatusCode::NOT_FOUND);
    }

    async fn send_json(method: &str, uri: &str, auth: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let response = app()
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn malformed_query_string_is_json_400() {
        for uri in [
            "/companies?minBound=1&minEmployees=2",
            "/companies?nameLike=a&nameLike=b",
        ] {
            let response = app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json", "{}", uri);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["error"], true);
            assert_eq!(body["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn create_user_with_missing_data_is_400() {
        let (status, body) = send_json("POST", "/users", Some(&admin_token()), json!({ "username": "u-new" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn update_user_with_invalid_data_is_400() {
        for token in [admin_token(), u1_token()] {
            let (status, body) = send_json("PATCH", "/users/u1", Some(&token), json!({ "firstName": 42 })).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn empty_update_is_no_data() {
        let (status, body) = send_json("PATCH", "/companies/c1", Some(&admin_token()), json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "No data");
    }

    #[tokio::test]
    async fn lowercase_bearer_scheme_is_accepted() {
        let token = admin_token().replacen("Bearer", "bearer", 1);
        assert_eq!(send(gated_stub_router(), "GET", "/users", Some(&token)).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_search_bounds_are_400_before_database() {
        let status = send(app(), "GET", "/companies?minEmployees=5&maxEmployees=2", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
