// HTTP Basic authentication
// Decision: Credentials are `email:password`, split at the first colon so passwords may contain colons
// Decision: Any malformed step yields no user (403 from the guard), never an error response

use async_trait::async_trait;
use authgate_core::{Database, User};
use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

use super::base::{Auth, Authenticator};
use super::config::AuthType;

const BASIC_PREFIX: &str = "Basic ";

pub struct BasicAuth {
    base: Auth,
    db: Arc<Database>,
}

impl BasicAuth {
    pub fn new(base: Auth, db: Arc<Database>) -> Self {
        Self { base, db }
    }

    /// Base64 part of a `Basic <credentials>` header value
    pub fn extract_base64_authorization_header(header: &str) -> Option<&str> {
        header.strip_prefix(BASIC_PREFIX)
    }

    /// Decode base64 credentials into a UTF-8 string
    pub fn decode_base64_authorization_header(encoded: &str) -> Option<String> {
        let bytes = STANDARD.decode(encoded).ok()?;
        String::from_utf8(bytes).ok()
    }

    /// Split decoded credentials into (email, password)
    pub fn extract_user_credentials(decoded: &str) -> Option<(&str, &str)> {
        decoded.split_once(':')
    }

    /// Stored user with this email whose password matches
    pub async fn user_object_from_credentials(&self, email: &str, password: &str) -> Option<User> {
        for user in self.db.search_users_by_email(email).await {
            if user.is_valid_password(password).await {
                return Some(user);
            }
        }

        tracing::debug!(email = %email, "Basic credentials did not match a user");
        None
    }
}

#[async_trait]
impl Authenticator for BasicAuth {
    fn auth_type(&self) -> AuthType {
        AuthType::BasicAuth
    }

    fn authorization_header<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        self.base.authorization_header(headers)
    }

    fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        self.base.session_cookie(headers)
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        let header = self.base.authorization_header(headers)?;
        let encoded = Self::extract_base64_authorization_header(header)?;
        let decoded = Self::decode_base64_authorization_header(encoded)?;
        let (email, password) = Self::extract_user_credentials(&decoded)?;
        self.user_object_from_credentials(email, password).await
    }
}
