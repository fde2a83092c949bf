// Session-cookie authentication
// Decision: One SessionAuth type covers session_auth, session_exp_auth and session_db_auth;
//           they differ only in the SessionStore backend and the expiry window
// Decision: Session ids are random UUID v4 strings
// Decision: A non-positive SESSION_DURATION means sessions never expire, for both
//           the in-memory and the database-backed store

use async_trait::async_trait;
use authgate_core::{Database, User, UserSession};
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::base::{Auth, Authenticator};
use super::config::AuthType;

/// Storage backend for issued sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: UserSession) -> authgate_core::Result<()>;
    async fn get(&self, session_id: &str) -> Option<UserSession>;
    async fn remove(&self, session_id: &str) -> authgate_core::Result<bool>;
}

/// Sessions held in process memory; lost on restart
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, UserSession>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: UserSession) -> authgate_core::Result<()> {
        self.sessions
            .write()
            .insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Option<UserSession> {
        self.sessions.read().get(session_id).cloned()
    }

    async fn remove(&self, session_id: &str) -> authgate_core::Result<bool> {
        Ok(self.sessions.write().remove(session_id).is_some())
    }
}

/// Sessions persisted as UserSession records in the database
pub struct DbSessionStore {
    db: Arc<Database>,
}

impl DbSessionStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for DbSessionStore {
    async fn insert(&self, session: UserSession) -> authgate_core::Result<()> {
        self.db.create_user_session(session).await.map(|_| ())
    }

    async fn get(&self, session_id: &str) -> Option<UserSession> {
        self.db.find_user_session(session_id).await
    }

    async fn remove(&self, session_id: &str) -> authgate_core::Result<bool> {
        self.db.delete_user_session(session_id).await
    }
}

pub struct SessionAuth {
    base: Auth,
    auth_type: AuthType,
    store: Arc<dyn SessionStore>,
    max_age: Option<Duration>,
    db: Arc<Database>,
}

impl SessionAuth {
    /// In-memory sessions that never expire (session_auth)
    pub fn new(base: Auth, db: Arc<Database>) -> Self {
        Self {
            base,
            auth_type: AuthType::SessionAuth,
            store: Arc::new(MemorySessionStore::default()),
            max_age: None,
            db,
        }
    }

    /// In-memory sessions expiring after `duration_secs` (session_exp_auth)
    pub fn with_expiry(base: Auth, duration_secs: i64, db: Arc<Database>) -> Self {
        Self {
            base,
            auth_type: AuthType::SessionExpAuth,
            store: Arc::new(MemorySessionStore::default()),
            max_age: max_age_from_secs(duration_secs),
            db,
        }
    }

    /// Database-backed sessions expiring after `duration_secs` (session_db_auth)
    pub fn with_database(base: Auth, duration_secs: i64, db: Arc<Database>) -> Self {
        Self {
            base,
            auth_type: AuthType::SessionDbAuth,
            store: Arc::new(DbSessionStore::new(db.clone())),
            max_age: max_age_from_secs(duration_secs),
            db,
        }
    }

    pub fn cookie_name(&self) -> &str {
        self.base.session_name()
    }

    /// Session lifetime, if sessions expire
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Issue a new session for `user_id` and return its id
    pub async fn create_session(&self, user_id: Uuid) -> authgate_core::Result<String> {
        let session_id = Uuid::new_v4().to_string();
        self.store
            .insert(UserSession::new(user_id, session_id.clone()))
            .await?;
        tracing::debug!(user_id = %user_id, auth_type = %self.auth_type, "Session created");
        Ok(session_id)
    }

    /// User a live session belongs to; expired sessions resolve to nothing
    pub async fn user_id_for_session_id(&self, session_id: &str) -> Option<Uuid> {
        let session = self.store.get(session_id).await?;

        if let Some(max_age) = self.max_age {
            if session.is_expired_at(max_age, Utc::now()) {
                tracing::debug!(user_id = %session.user_id, "Session expired");
                return None;
            }
        }

        Some(session.user_id)
    }

    /// Remove the session named by the request's cookie.
    ///
    /// Returns false when there is no cookie or the session is unknown.
    pub async fn destroy_session(&self, headers: &HeaderMap) -> bool {
        let Some(session_id) = self.base.session_cookie(headers) else {
            return false;
        };

        match self.store.remove(&session_id).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::error!(error = %e, "Failed to remove session");
                false
            }
        }
    }
}

// Durations beyond what chrono can represent never expire
fn max_age_from_secs(secs: i64) -> Option<Duration> {
    if secs <= 0 {
        return None;
    }
    let max_age = Duration::try_seconds(secs);
    if max_age.is_none() {
        tracing::warn!(secs, "SESSION_DURATION out of range, sessions will not expire");
    }
    max_age
}

#[async_trait]
impl Authenticator for SessionAuth {
    fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    fn authorization_header<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        self.base.authorization_header(headers)
    }

    fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        self.base.session_cookie(headers)
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        let session_id = self.base.session_cookie(headers)?;
        let user_id = self.user_id_for_session_id(&session_id).await?;
        self.db.get_user(user_id).await
    }

    fn sessions(&self) -> Option<&SessionAuth> {
        Some(self)
    }
}
