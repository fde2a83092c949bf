// Application assembly: state, routes, middleware stack
// Decision: All routes live under /api/v1; trailing slashes are trimmed before routing
// Decision: CORS allows any origin unless CORS_ALLOWED_ORIGINS narrows it

use authgate_core::Database;
use axum::http::{header, HeaderValue, Method};
use axum::{middleware, Router};
use std::sync::Arc;
use tower::Layer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth::{self, Authenticator};
use crate::config::ApiConfig;

/// State shared by every handler and the auth guard
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    /// Active strategy; None when authentication is disabled
    pub auth: Option<Arc<dyn Authenticator>>,
}

impl AppState {
    pub fn new(config: &ApiConfig, db: Arc<Database>) -> Self {
        let auth = auth::build_authenticator(config, db.clone());
        Self { db, auth }
    }
}

/// The complete HTTP service
pub type App = NormalizePath<Router>;

/// Build the router with the auth guard, CORS and request tracing
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let api_routes = Router::new()
        .merge(api::index::routes())
        .merge(api::users::routes())
        .merge(api::session_auth::routes());

    Router::new()
        .nest("/api/v1", api_routes)
        .fallback(api::index::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::before_request,
        ))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the full service; trailing slashes are stripped before routing
pub fn build_app(config: &ApiConfig, db: Arc<Database>) -> App {
    let state = AppState::new(config, db);
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, &config.cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
        ])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_trailing_slash_is_optional() {
        let app = build_app(&ApiConfig::default(), Arc::new(Database::new()));

        for uri in ["/api/v1/status", "/api/v1/status/"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), 200, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_cors_any_origin_by_default() {
        let app = build_app(&ApiConfig::default(), Arc::new(Database::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/status")
                    .header(header::ORIGIN, "https://elsewhere.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_configured_origins() {
        let config = ApiConfig {
            cors_origins: vec!["https://app.example.com".to_string()],
            ..Default::default()
        };
        let app = build_app(&config, Arc::new(Database::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/status")
                    .header(header::ORIGIN, "https://app.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.example.com"
        );
    }
}
