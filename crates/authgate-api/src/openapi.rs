// OpenAPI specification generation
//
// Used by the export-openapi binary for static spec generation.

use crate::api;
use authgate_core::UserJson;
use utoipa::OpenApi;

/// OpenAPI documentation for the Authgate API
#[derive(OpenApi)]
#[openapi(
    paths(
        api::index::status,
        api::index::stats,
        api::index::unauthorized,
        api::index::forbidden,
        api::users::list_users,
        api::users::get_user,
        api::users::create_user,
        api::users::update_user,
        api::users::delete_user,
        api::session_auth::login,
        api::session_auth::logout,
    ),
    components(
        schemas(
            UserJson,
            api::ErrorResponse,
            api::EmptyResponse,
            api::index::StatusResponse,
            api::index::StatsResponse,
            api::users::CreateUserRequest,
            api::users::UpdateUserRequest,
            api::session_auth::LoginForm,
        )
    ),
    tags(
        (name = "index", description = "Status and probe endpoints"),
        (name = "users", description = "User management endpoints"),
        (name = "auth", description = "Session authentication endpoints")
    ),
    info(
        title = "Authgate API",
        version = "0.1.0",
        description = "REST API guarded by a pluggable authentication strategy",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI spec as a pretty-printed JSON string
    pub fn to_json() -> Result<String, serde_json::Error> {
        Self::openapi().to_pretty_json()
    }
}
