// Authenticator trait and the base strategy
// Decision: Strategies compose the base `Auth` instead of re-implementing header/cookie access
// Decision: Paths are compared with a trailing slash; excluded entries ending in `*` match by prefix

use async_trait::async_trait;
use authgate_core::User;
use axum::http::{header, HeaderMap};
use axum_extra::extract::CookieJar;

use super::config::AuthType;
use super::session::SessionAuth;

/// Decides whether a request is authorized and resolves the current user.
#[async_trait]
pub trait Authenticator: Send + Sync {
    fn auth_type(&self) -> AuthType;

    /// Whether `path` must carry credentials
    fn require_auth(&self, path: &str, excluded_paths: &[&str]) -> bool {
        require_auth(Some(path), excluded_paths)
    }

    /// Raw value of the Authorization header
    fn authorization_header<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str>;

    /// Value of the session cookie
    fn session_cookie(&self, headers: &HeaderMap) -> Option<String>;

    /// User the request's credentials resolve to
    async fn current_user(&self, headers: &HeaderMap) -> Option<User>;

    /// Session management, for strategies that issue session cookies
    fn sessions(&self) -> Option<&SessionAuth> {
        None
    }
}

/// Check whether `path` requires authentication given the excluded paths.
///
/// Returns true when there is no path or nothing is excluded.
pub fn require_auth(path: Option<&str>, excluded_paths: &[&str]) -> bool {
    let Some(path) = path else {
        return true;
    };
    if excluded_paths.is_empty() {
        return true;
    }

    let path = with_trailing_slash(path);

    for excluded in excluded_paths {
        match excluded.strip_suffix('*') {
            Some(prefix) => {
                if path.starts_with(prefix) {
                    return false;
                }
            }
            None => {
                if with_trailing_slash(excluded) == path {
                    return false;
                }
            }
        }
    }

    true
}

fn with_trailing_slash(path: &str) -> String {
    if path.is_empty() || path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Base strategy: reads credentials but resolves no user, so every
/// credentialed request to a protected path is forbidden.
#[derive(Debug, Clone)]
pub struct Auth {
    session_name: String,
}

impl Auth {
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
        }
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn authorization_header<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
    }

    pub fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        CookieJar::from_headers(headers)
            .get(&self.session_name)
            .map(|cookie| cookie.value().to_string())
    }
}

#[async_trait]
impl Authenticator for Auth {
    fn auth_type(&self) -> AuthType {
        AuthType::Auth
    }

    fn authorization_header<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        Auth::authorization_header(self, headers)
    }

    fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        Auth::session_cookie(self, headers)
    }

    async fn current_user(&self, _headers: &HeaderMap) -> Option<User> {
        None
    }
}
