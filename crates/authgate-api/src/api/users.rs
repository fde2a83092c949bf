// Users API routes
// Decision: Request bodies are parsed by hand so malformed JSON answers 400 "Wrong format"
// Decision: `me` as user id resolves to the user attached by the auth guard

use authgate_core::{CreateUser, UpdateUser, User, UserJson};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{ApiError, EmptyResponse, ErrorResponse};
use crate::app::AppState;
use crate::auth::CurrentUser;

/// Request to create a user
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "bob@hbtn.io")]
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Request to update a user's names
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// User routes, relative to /api/v1
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

async fn find_user(state: &AppState, user_id: &str) -> Result<User, ApiError> {
    let id = Uuid::parse_str(user_id).map_err(|_| ApiError::NotFound)?;
    state.db.get_user(id).await.ok_or(ApiError::NotFound)
}

/// GET /api/v1/users - List all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "List of users", body = Vec<UserJson>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<UserJson>> {
    let users = state.db.list_users().await;
    Json(users.iter().map(User::to_json).collect())
}

/// GET /api/v1/users/{user_id} - Get a user; `me` is the authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User ID or `me`")),
    responses(
        (status = 200, description = "User found", body = UserJson),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    current_user: Option<CurrentUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UserJson>, ApiError> {
    if user_id == "me" {
        let CurrentUser(user) = current_user.ok_or(ApiError::NotFound)?;
        return Ok(Json(user.to_json()));
    }

    let user = find_user(&state, &user_id).await?;
    Ok(Json(user.to_json()))
}

/// POST /api/v1/users - Create a user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserJson),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<UserJson>), ApiError> {
    let req: CreateUserRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::bad_request("Wrong format"))?;

    let email = req
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("email missing"))?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("password missing"))?;

    let user = state
        .db
        .create_user(CreateUser {
            email,
            password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await
        .map_err(|e| {
            if e.is_client_error() {
                ApiError::bad_request(format!("Can't create User: {}", e))
            } else {
                ApiError::Internal(e)
            }
        })?;

    tracing::info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user.to_json())))
}

/// PUT /api/v1/users/{user_id} - Update a user's names
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserJson),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Json<UserJson>, ApiError> {
    let user = find_user(&state, &user_id).await?;

    let req: UpdateUserRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::bad_request("Wrong format"))?;

    let updated = state
        .db
        .update_user(
            user.id,
            UpdateUser {
                first_name: req.first_name,
                last_name: req.last_name,
            },
        )
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(updated.to_json()))
}

/// DELETE /api/v1/users/{user_id} - Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = EmptyResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<EmptyResponse>, ApiError> {
    let user = find_user(&state, &user_id).await?;

    if !state.db.delete_user(user.id).await? {
        return Err(ApiError::NotFound);
    }

    tracing::info!(user_id = %user.id, "User deleted");
    Ok(Json(EmptyResponse::default()))
}
