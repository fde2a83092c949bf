// In-memory database with optional JSON file persistence
// Decision: Use parking_lot for thread-safe access; locks are never held across an await
// Decision: Each collection is written to its own `.db_<Kind>.json` file after every mutation
// Decision: A mutation is applied to a copy, persisted, then published; a failed write changes nothing
//
// Without a data directory all data lives in memory and is lost on restart,
// which is what tests and local development want.

use chrono::Utc;
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::password::hash_password_blocking;
use crate::user::{CreateUser, UpdateUser, User};
use crate::user_session::UserSession;

const USERS_FILE: &str = ".db_User.json";
const USER_SESSIONS_FILE: &str = ".db_UserSession.json";

/// One persisted collection
struct Collection<K, V> {
    items: RwLock<HashMap<K, V>>,
    // Held from snapshot to rename so writes reach disk in mutation order
    write_lock: Mutex<()>,
    file: &'static str,
    order: fn(&V, &V) -> Ordering,
}

impl<K, V> Collection<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Serialize,
{
    fn new(file: &'static str, order: fn(&V, &V) -> Ordering, items: HashMap<K, V>) -> Self {
        Self {
            items: RwLock::new(items),
            write_lock: Mutex::new(()),
            file,
            order,
        }
    }

    fn snapshot(&self) -> Vec<V> {
        sorted(&self.items.read(), self.order)
    }

    /// Apply `change` to a copy of the collection, persist the copy, then publish it.
    ///
    /// `change` returns None when it left the collection untouched; nothing is written then.
    async fn mutate<R>(
        &self,
        data_dir: Option<&Path>,
        change: impl FnOnce(&mut HashMap<K, V>) -> Result<Option<R>>,
    ) -> Result<Option<R>> {
        let _guard = self.write_lock.lock().await;

        let mut next = self.items.read().clone();
        let Some(result) = change(&mut next)? else {
            return Ok(None);
        };

        if let Some(dir) = data_dir {
            save_collection(&dir.join(self.file), &sorted(&next, self.order)).await?;
        }

        *self.items.write() = next;
        Ok(Some(result))
    }
}

fn sorted<K, V: Clone>(items: &HashMap<K, V>, order: fn(&V, &V) -> Ordering) -> Vec<V> {
    let mut result: Vec<V> = items.values().cloned().collect();
    result.sort_by(order);
    result
}

fn user_order(a: &User, b: &User) -> Ordering {
    a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
}

fn user_session_order(a: &UserSession, b: &UserSession) -> Ordering {
    a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
}

pub struct Database {
    users: Collection<Uuid, User>,
    // Keyed by session id (the cookie value)
    user_sessions: Collection<String, UserSession>,
    data_dir: Option<PathBuf>,
}

impl Default for Database {
    fn default() -> Self {
        Self::with_collections(Vec::new(), Vec::new(), None)
    }
}

impl Database {
    /// Purely in-memory database
    pub fn new() -> Self {
        Self::default()
    }

    /// Database persisted under `dir`, loading any collections already there
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let users: Vec<User> = load_collection(&dir.join(USERS_FILE)).await?;
        let sessions: Vec<UserSession> = load_collection(&dir.join(USER_SESSIONS_FILE)).await?;

        tracing::info!(
            dir = %dir.display(),
            users = users.len(),
            user_sessions = sessions.len(),
            "Loaded persisted collections"
        );

        Ok(Self::with_collections(users, sessions, Some(dir)))
    }

    fn with_collections(
        users: Vec<User>,
        sessions: Vec<UserSession>,
        data_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            users: Collection::new(
                USERS_FILE,
                user_order,
                users.into_iter().map(|u| (u.id, u)).collect(),
            ),
            user_sessions: Collection::new(
                USER_SESSIONS_FILE,
                user_session_order,
                sessions
                    .into_iter()
                    .map(|s| (s.session_id.clone(), s))
                    .collect(),
            ),
            data_dir,
        }
    }

    fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUser) -> Result<User> {
        if input.email.is_empty() {
            return Err(Error::MissingField("email"));
        }
        if input.password.is_empty() {
            return Err(Error::MissingField("password"));
        }

        let password_hash = hash_password_blocking(input.password).await?;
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: input.email,
            password_hash: Some(password_hash),
            first_name: input.first_name,
            last_name: input.last_name,
            created_at: now,
            updated_at: now,
        };

        self.users
            .mutate(self.data_dir(), |users| {
                if users.values().any(|u| u.email == user.email) {
                    return Err(Error::DuplicateEmail(user.email.clone()));
                }
                users.insert(user.id, user.clone());
                Ok(Some(()))
            })
            .await?;
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.items.read().get(&id).cloned()
    }

    /// All users registered with `email`, oldest first
    pub async fn search_users_by_email(&self, email: &str) -> Vec<User> {
        self.users
            .snapshot()
            .into_iter()
            .filter(|u| u.email == email)
            .collect()
    }

    /// All users, oldest first
    pub async fn list_users(&self) -> Vec<User> {
        self.users.snapshot()
    }

    pub async fn count_users(&self) -> usize {
        self.users.items.read().len()
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> Result<Option<User>> {
        self.users
            .mutate(self.data_dir(), |users| {
                let Some(user) = users.get_mut(&id) else {
                    return Ok(None);
                };
                if let Some(first_name) = input.first_name {
                    user.first_name = Some(first_name);
                }
                if let Some(last_name) = input.last_name {
                    user.last_name = Some(last_name);
                }
                user.updated_at = Utc::now();
                Ok(Some(user.clone()))
            })
            .await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<bool> {
        let removed = self
            .users
            .mutate(self.data_dir(), |users| Ok(users.remove(&id).map(|_| ())))
            .await?;
        Ok(removed.is_some())
    }

    // ============================================
    // User sessions
    // ============================================

    pub async fn create_user_session(&self, session: UserSession) -> Result<UserSession> {
        self.user_sessions
            .mutate(self.data_dir(), |sessions| {
                sessions.insert(session.session_id.clone(), session.clone());
                Ok(Some(()))
            })
            .await?;
        Ok(session)
    }

    pub async fn find_user_session(&self, session_id: &str) -> Option<UserSession> {
        self.user_sessions.items.read().get(session_id).cloned()
    }

    pub async fn delete_user_session(&self, session_id: &str) -> Result<bool> {
        let removed = self
            .user_sessions
            .mutate(self.data_dir(), |sessions| {
                Ok(sessions.remove(session_id).map(|_| ()))
            })
            .await?;
        Ok(removed.is_some())
    }
}

async fn load_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Write to a sibling temp file, then rename over `path`
async fn save_collection<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(items)?;
    let tmp = path.with_extension("json.tmp");

    tokio::fs::write(&tmp, bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    tracing::debug!(path = %path.display(), count = items.len(), "Persisted collection");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            password: "pwd".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = Database::new();
        let user = db.create_user(new_user("bob@hbtn.io")).await.unwrap();

        let fetched = db.get_user(user.id).await.unwrap();
        assert_eq!(fetched.email, "bob@hbtn.io");
        assert!(fetched.is_valid_password("pwd").await);
        assert_eq!(db.count_users().await, 1);
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let db = Database::new();

        let err = db.create_user(new_user("")).await.unwrap_err();
        assert!(matches!(err, Error::MissingField("email")));

        let err = db
            .create_user(CreateUser {
                email: "a@b.c".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingField("password")));

        db.create_user(new_user("a@b.c")).await.unwrap();
        let err = db.create_user(new_user("a@b.c")).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_search_update_delete() {
        let db = Database::new();
        let user = db.create_user(new_user("bob@hbtn.io")).await.unwrap();
        db.create_user(new_user("alice@hbtn.io")).await.unwrap();

        let found = db.search_users_by_email("bob@hbtn.io").await;
        assert_eq!(found.len(), 1);
        assert!(db.search_users_by_email("nobody@hbtn.io").await.is_empty());

        let updated = db
            .update_user(
                user.id,
                UpdateUser {
                    first_name: Some("Bob".into()),
                    last_name: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.first_name.as_deref(), Some("Bob"));
        assert!(updated.updated_at >= user.updated_at);

        assert!(db.delete_user(user.id).await.unwrap());
        assert!(!db.delete_user(user.id).await.unwrap());
        assert!(db
            .update_user(user.id, UpdateUser::default())
            .await
            .unwrap()
            .is_none());
        assert_eq!(db.list_users().await.len(), 1);
    }

    #[tokio::test]
    async fn test_user_sessions() {
        let db = Database::new();
        let user_id = Uuid::now_v7();
        db.create_user_session(UserSession::new(user_id, "sid-1"))
            .await
            .unwrap();

        let found = db.find_user_session("sid-1").await.unwrap();
        assert_eq!(found.user_id, user_id);
        assert!(db.find_user_session("sid-2").await.is_none());

        assert!(db.delete_user_session("sid-1").await.unwrap());
        assert!(!db.delete_user_session("sid-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let user_id = {
            let db = Database::open(dir.path()).await.unwrap();
            let user = db.create_user(new_user("bob@hbtn.io")).await.unwrap();
            db.create_user_session(UserSession::new(user.id, "sid-1"))
                .await
                .unwrap();
            user.id
        };

        assert!(dir.path().join(USERS_FILE).exists());
        assert!(dir.path().join(USER_SESSIONS_FILE).exists());

        let db = Database::open(dir.path()).await.unwrap();
        let user = db.get_user(user_id).await.unwrap();
        assert!(user.is_valid_password("pwd").await);
        assert_eq!(db.find_user_session("sid-1").await.unwrap().user_id, user_id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_keep_file_readable() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::open(dir.path()).await.unwrap());
        let user_id = Uuid::now_v7();

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let db = db.clone();
                tokio::spawn(async move {
                    db.create_user_session(UserSession::new(user_id, format!("sid-{i}")))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let reopened = Database::open(dir.path()).await.unwrap();
        for i in 0..32 {
            let session_id = format!("sid-{i}");
            assert!(
                reopened.find_user_session(&session_id).await.is_some(),
                "{session_id} lost"
            );
        }
        assert!(!dir.path().join(".db_UserSession.json.tmp").exists());
    }

    /// Database whose data directory is a regular file, so every write fails
    fn unwritable(db: &mut Database, dir: &tempfile::TempDir) {
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        db.data_dir = Some(blocker);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::new();
        unwritable(&mut db, &dir);

        let err = db.create_user(new_user("bob@hbtn.io")).await.unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert_eq!(db.count_users().await, 0);
        assert!(db.search_users_by_email("bob@hbtn.io").await.is_empty());

        let err = db
            .create_user_session(UserSession::new(Uuid::now_v7(), "sid-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert!(db.find_user_session("sid-1").await.is_none());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open(dir.path().join("data")).await.unwrap();
        let user = db.create_user(new_user("bob@hbtn.io")).await.unwrap();
        db.create_user_session(UserSession::new(user.id, "sid-1"))
            .await
            .unwrap();

        unwritable(&mut db, &dir);

        assert!(db
            .update_user(
                user.id,
                UpdateUser {
                    first_name: Some("Bob".into()),
                    last_name: None,
                },
            )
            .await
            .is_err());
        assert!(db.delete_user(user.id).await.is_err());
        assert!(db.delete_user_session("sid-1").await.is_err());

        let kept = db.get_user(user.id).await.unwrap();
        assert!(kept.first_name.is_none());
        assert!(db.find_user_session("sid-1").await.is_some());
    }
}
