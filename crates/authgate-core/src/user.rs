// User entity
//
// User is the persisted account record. The password is only ever stored as
// an Argon2id hash and is excluded from the JSON representation served by the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::password::verify_password_blocking;

/// Timestamp format used in the public JSON representation
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Persisted user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Argon2id PHC string
    #[serde(default, rename = "_password")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public JSON representation of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserJson {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = "2024-01-31T12:00:00"))]
    pub created_at: String,
    #[cfg_attr(feature = "openapi", schema(example = "2024-01-31T12:00:00"))]
    pub updated_at: String,
}

/// Input for creating a user. The password is hashed by the store.
#[derive(Debug, Clone, Default)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Partial update of a user's profile
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// Check a clear-text password against the stored hash on the blocking pool.
    ///
    /// Returns false when the user has no password set.
    pub async fn is_valid_password(&self, password: &str) -> bool {
        match &self.password_hash {
            Some(hash) => verify_password_blocking(password.to_string(), hash.clone()).await,
            None => false,
        }
    }

    /// Human readable name: full name when available, email otherwise
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (None, None) => self.email.clone(),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (Some(first), Some(last)) => format!("{} {}", first, last),
        }
    }

    pub fn to_json(&self) -> UserJson {
        UserJson {
            id: self.id.to_string(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            created_at: self.created_at.format(TIMESTAMP_FORMAT).to_string(),
            updated_at: self.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}
