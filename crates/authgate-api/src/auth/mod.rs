// Authentication module
// Decision: Strategy chosen once at startup from AUTH_TYPE and shared behind Arc<dyn Authenticator>
// Decision: Session strategies share one implementation with pluggable session stores

pub mod base;
pub mod basic;
pub mod config;
pub mod middleware;
pub mod session;

use authgate_core::Database;
use std::sync::Arc;

pub use base::{require_auth, Auth, Authenticator};
pub use basic::BasicAuth;
pub use config::AuthType;
pub use middleware::{before_request, CurrentUser, EXCLUDED_PATHS};
pub use session::{DbSessionStore, MemorySessionStore, SessionAuth, SessionStore};

use crate::config::ApiConfig;

/// Instantiate the strategy selected by `config.auth_type`.
///
/// Returns None when authentication is disabled.
pub fn build_authenticator(config: &ApiConfig, db: Arc<Database>) -> Option<Arc<dyn Authenticator>> {
    let base = Auth::new(config.session_name.clone());

    let auth: Arc<dyn Authenticator> = match config.auth_type {
        AuthType::None => return None,
        AuthType::Auth => Arc::new(base),
        AuthType::BasicAuth => Arc::new(BasicAuth::new(base, db)),
        AuthType::SessionAuth => Arc::new(SessionAuth::new(base, db)),
        AuthType::SessionExpAuth => {
            Arc::new(SessionAuth::with_expiry(base, config.session_duration, db))
        }
        AuthType::SessionDbAuth => {
            Arc::new(SessionAuth::with_database(base, config.session_duration, db))
        }
    };

    Some(auth)
}
