// HTTP API routes
//
// Each submodule owns the handlers for one view group; all of them share
// the application state defined in `crate::app`.

pub mod common;
pub mod index;
pub mod session_auth;
pub mod users;

pub use common::{ApiError, EmptyResponse, ErrorResponse};
