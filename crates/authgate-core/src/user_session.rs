// Persisted session record for database-backed session authentication

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maps a session id (cookie value) to the user it was issued for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(user_id: Uuid, session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            session_id: session_id.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the session has outlived `max_age` at `now`.
    ///
    /// A deadline past the representable range never expires.
    pub fn is_expired_at(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        match self.created_at.checked_add_signed(max_age) {
            Some(deadline) => deadline < now,
            None => false,
        }
    }
}
