// Authgate Core
//
// Domain types and storage shared by the API server and its tools.
//
// Key design decisions:
// - User and UserSession are plain serde types; JSON shape for the API is produced by User::to_json
// - Database is in-memory with optional JSON file persistence per collection
// - Password hashes are Argon2id PHC strings
// - Telemetry is a tracing-subscriber registry configured from the environment

pub mod database;
pub mod error;
pub mod password;
pub mod telemetry;
pub mod user;
pub mod user_session;

pub use database::Database;
pub use error::{Error, Result};
pub use user::{CreateUser, UpdateUser, User, UserJson};
pub use user_session::UserSession;
