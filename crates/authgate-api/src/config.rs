// Server configuration loaded from environment variables
// Decision: API_HOST/API_PORT default to 0.0.0.0:5000
// Decision: Invalid numeric values for SESSION_DURATION fall back to 0 (no expiry)

use std::path::PathBuf;
use thiserror::Error;

use crate::auth::AuthType;

/// Default cookie name carrying the session id
pub const DEFAULT_SESSION_NAME: &str = "_my_session_id";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API_PORT: {0}")]
    InvalidPort(String),
}

/// Seed user created at startup when it does not exist yet
#[derive(Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Complete API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Active authentication strategy (AUTH_TYPE)
    pub auth_type: AuthType,
    /// Cookie name carrying the session id (SESSION_NAME)
    pub session_name: String,
    /// Session lifetime in seconds; <= 0 disables expiry (SESSION_DURATION)
    pub session_duration: i64,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
    /// Directory for persisted collections; None keeps everything in memory
    pub data_dir: Option<PathBuf>,
    pub admin: Option<AdminConfig>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            auth_type: AuthType::None,
            session_name: DEFAULT_SESSION_NAME.to_string(),
            session_duration: 0,
            cors_origins: Vec::new(),
            data_dir: None,
            admin: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = var("API_HOST")
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);

        let port = match var("API_PORT").filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => defaults.port,
        };

        let auth_type = AuthType::from_env_value(var("AUTH_TYPE").as_deref());

        let session_name = var("SESSION_NAME")
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.session_name);

        let session_duration = var("SESSION_DURATION")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0);

        // Example: CORS_ALLOWED_ORIGINS="https://app.example.com,https://admin.example.com"
        let cors_origins = var("CORS_ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty() && o != "*")
                    .collect()
            })
            .unwrap_or_default();

        let data_dir = var("DATA_DIR").filter(|s| !s.is_empty()).map(PathBuf::from);

        let admin = match (var("AUTH_ADMIN_EMAIL"), var("AUTH_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminConfig { email, password })
            }
            _ => None,
        };

        Ok(Self {
            host,
            port,
            auth_type,
            session_name,
            session_duration,
            cors_origins,
            data_dir,
            admin,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.auth_type, AuthType::None);
        assert_eq!(config.session_name, DEFAULT_SESSION_NAME);
        assert_eq!(config.session_duration, 0);
        assert!(config.cors_origins.is_empty());
        assert!(config.data_dir.is_none());
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_host_port_and_auth_type() {
        let config = load(&[
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "8080"),
            ("AUTH_TYPE", "session_auth"),
            ("SESSION_NAME", "sid"),
        ])
        .unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.auth_type, AuthType::SessionAuth);
        assert_eq!(config.session_name, "sid");
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let err = load(&[("API_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(p) if p == "not-a-port"));
    }

    #[test]
    fn test_session_duration_parsing() {
        assert_eq!(load(&[("SESSION_DURATION", "60")]).unwrap().session_duration, 60);
        assert_eq!(load(&[("SESSION_DURATION", "abc")]).unwrap().session_duration, 0);
        assert_eq!(load(&[("SESSION_DURATION", "-5")]).unwrap().session_duration, -5);
    }

    #[test]
    fn test_cors_origins() {
        let config = load(&[(
            "CORS_ALLOWED_ORIGINS",
            "https://a.example.com, https://b.example.com,,",
        )])
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example.com", "https://b.example.com"]
        );

        let any = load(&[("CORS_ALLOWED_ORIGINS", "*")]).unwrap();
        assert!(any.cors_origins.is_empty());
    }

    #[test]
    fn test_admin_requires_both_fields() {
        assert!(load(&[("AUTH_ADMIN_EMAIL", "admin@example.com")])
            .unwrap()
            .admin
            .is_none());

        let config = load(&[
            ("AUTH_ADMIN_EMAIL", "admin@example.com"),
            ("AUTH_ADMIN_PASSWORD", "changeme"),
        ])
        .unwrap();
        let admin = config.admin.unwrap();
        assert_eq!(admin.email, "admin@example.com");
        assert!(!format!("{:?}", admin).contains("changeme"));
    }
}
