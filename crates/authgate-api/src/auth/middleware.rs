// Request guard and current-user extractor
// Decision: The guard is router-wide middleware, so it runs before route resolution
//           and unknown protected paths answer 401/403 before 404
// Decision: The resolved user travels in request extensions

use authgate_core::User;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::api::ApiError;
use crate::app::AppState;

/// Paths reachable without credentials
pub const EXCLUDED_PATHS: &[&str] = &[
    "/api/v1/status/",
    "/api/v1/unauthorized/",
    "/api/v1/forbidden/",
    "/api/v1/auth_session/login/",
];

/// User resolved by the guard for the current request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Enforce the active authentication strategy before any handler runs.
///
/// - no authenticator configured: pass through
/// - path excluded: pass through
/// - neither Authorization header nor session cookie: 401
/// - credentials resolve to no user: 403
pub async fn before_request(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(auth) = state.auth.clone() else {
        return Ok(next.run(request).await);
    };

    let path = request.uri().path().to_owned();
    if !auth.require_auth(&path, EXCLUDED_PATHS) {
        return Ok(next.run(request).await);
    }

    let headers = request.headers();
    if auth.authorization_header(headers).is_none() && auth.session_cookie(headers).is_none() {
        tracing::debug!(path = %path, "Rejected request without credentials");
        return Err(ApiError::Unauthorized);
    }

    let Some(user) = auth.current_user(headers).await else {
        tracing::debug!(path = %path, auth_type = %auth.auth_type(), "Credentials resolved to no user");
        return Err(ApiError::Forbidden);
    };

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Extracts the user attached by `before_request`.
/// Rejects with 401 when the guard did not resolve a user.
#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}
