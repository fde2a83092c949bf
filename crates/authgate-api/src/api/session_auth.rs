// Session authentication views
// Decision: Login takes form fields (email, password) and answers with the user JSON plus the session cookie
// Decision: Without a session strategy these routes answer 404

use authgate_core::UserJson;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{delete, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use utoipa::ToSchema;

use super::common::{ApiError, EmptyResponse, ErrorResponse};
use crate::app::AppState;
use crate::auth::SessionAuth;

/// Login form
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Session routes, relative to /api/v1
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth_session/login", post(login))
        .route("/auth_session/logout", delete(logout))
}

fn session_auth(state: &AppState) -> Result<&SessionAuth, ApiError> {
    state
        .auth
        .as_deref()
        .and_then(|auth| auth.sessions())
        .ok_or(ApiError::NotFound)
}

/// POST /api/v1/auth_session/login - Log in with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth_session/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logged in; session cookie set", body = UserJson),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 404, description = "No user for this email", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Option<Form<LoginForm>>,
) -> Result<(CookieJar, Json<UserJson>), ApiError> {
    let sessions = session_auth(&state)?;
    let form = form.map(|Form(form)| form).unwrap_or_default();

    let email = form
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("email missing"))?;
    let password = form
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("password missing"))?;

    let users = state.db.search_users_by_email(&email).await;
    if users.is_empty() {
        return Err(ApiError::with_status(
            StatusCode::NOT_FOUND,
            "no user found for this email",
        ));
    }

    let mut matched = None;
    for user in users {
        if user.is_valid_password(&password).await {
            matched = Some(user);
            break;
        }
    }
    let user = matched.ok_or_else(|| {
        tracing::info!(email = %email, "Login rejected: wrong password");
        ApiError::with_status(StatusCode::UNAUTHORIZED, "wrong password")
    })?;

    let session_id = sessions.create_session(user.id).await?;

    let mut cookie = Cookie::build((sessions.cookie_name().to_owned(), session_id))
        .path("/")
        .http_only(true);
    if let Some(max_age) = sessions.max_age() {
        cookie = cookie.max_age(time::Duration::seconds(max_age.num_seconds()));
    }

    tracing::info!(user_id = %user.id, name = %user.display_name(), "User logged in");
    Ok((jar.add(cookie), Json(user.to_json())))
}

/// DELETE /api/v1/auth_session/logout - Destroy the current session
#[utoipa::path(
    delete,
    path = "/api/v1/auth_session/logout",
    responses(
        (status = 200, description = "Session destroyed", body = EmptyResponse),
        (status = 404, description = "No session to destroy", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<EmptyResponse>), ApiError> {
    let sessions = session_auth(&state)?;

    if !sessions.destroy_session(&headers).await {
        return Err(ApiError::NotFound);
    }

    let jar = jar.remove(Cookie::build(sessions.cookie_name().to_owned()).path("/"));
    Ok((jar, Json(EmptyResponse::default())))
}
