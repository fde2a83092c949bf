// Authentication strategy selection
// Decision: An unset or unknown AUTH_TYPE disables the guard entirely

/// Authentication strategy selected by AUTH_TYPE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthType {
    /// No authenticator; every request passes the guard
    #[default]
    None,
    /// Base strategy: checks for credentials but never resolves a user
    Auth,
    /// HTTP Basic credentials checked against stored users
    BasicAuth,
    /// Session cookie backed by an in-process map
    SessionAuth,
    /// Session cookie with SESSION_DURATION expiry
    SessionExpAuth,
    /// Session cookie persisted as UserSession records, with expiry
    SessionDbAuth,
}

impl AuthType {
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "auth" => AuthType::Auth,
            "basic_auth" => AuthType::BasicAuth,
            "session_auth" => AuthType::SessionAuth,
            "session_exp_auth" => AuthType::SessionExpAuth,
            "session_db_auth" => AuthType::SessionDbAuth,
            _ => AuthType::None,
        }
    }

    pub fn from_env_value(value: Option<&str>) -> Self {
        value.map(Self::from_str).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::None => "none",
            AuthType::Auth => "auth",
            AuthType::BasicAuth => "basic_auth",
            AuthType::SessionAuth => "session_auth",
            AuthType::SessionExpAuth => "session_exp_auth",
            AuthType::SessionDbAuth => "session_db_auth",
        }
    }
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
