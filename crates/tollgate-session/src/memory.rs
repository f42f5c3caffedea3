//! An in-memory [`SessionStore`] and [`UserDirectory`].
//!
//! Useful for development, demos, and tests. Passwords are kept in
//! plain text, so never point real users at it.

use std::collections::HashMap;

use chrono::{TimeDelta, Utc};
use tokio::sync::RwLock;

use crate::manager::generate_token;
use crate::{NewUser, Session, SessionError, SessionStore, User, UserDirectory};

struct StoredUser {
    user: User,
    password: String,
}

/// Users and sessions in two maps behind async `RwLock`s.
///
/// Each trait method takes one lock for its whole duration, which is
/// what makes create/get/delete of a single id atomic.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, StoredUser>>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a user with the given password.
    pub async fn add_user(&self, user: User, password: &str) {
        self.users.write().await.insert(
            user.name.clone(),
            StoredUser {
                user,
                password: password.to_string(),
            },
        );
    }

    /// Removes a user. Their sessions stay behind, dangling.
    pub async fn remove_user(&self, name: &str) -> bool {
        self.users.write().await.remove(name).is_some()
    }

    /// Stores a session record as-is, e.g. one that has already expired.
    pub async fn insert_session(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
    }

    /// Number of live (unexpired) sessions.
    pub async fn session_count(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| !s.is_expired_at(now))
            .count()
    }

    /// Live sessions owned by `username`, in no particular order.
    pub async fn sessions_for(&self, username: &str) -> Vec<Session> {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.username == username && !s.is_expired_at(now))
            .cloned()
            .collect()
    }
}

impl SessionStore for MemoryStore {
    async fn create(
        &self,
        username: &str,
        ttl: TimeDelta,
    ) -> Result<Session, SessionError> {
        let expiration = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
            SessionError::BadRequest("invalid or missing ttl".into())
        })?;

        let mut sessions = self.sessions.write().await;
        // 128 random bits make a collision practically impossible, but
        // the check is free while we hold the lock.
        let mut id = generate_token();
        while sessions.contains_key(&id) {
            id = generate_token();
        }

        let session = Session {
            id: id.clone(),
            username: username.to_string(),
            expiration,
        };
        sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn get(&self, id: &str) -> Result<Option<Session>, SessionError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        match sessions.get(id) {
            None => return Ok(None),
            Some(session) if !session.is_expired_at(now) => {
                return Ok(Some(session.clone()));
            }
            Some(_) => {}
        }
        // Passive expiration: evict on read.
        sessions.remove(id);
        Ok(None)
    }

    async fn delete(&self, id: &str) -> Result<bool, SessionError> {
        let now = Utc::now();
        let removed = self.sessions.write().await.remove(id);
        Ok(removed.is_some_and(|session| !session.is_expired_at(now)))
    }
}

impl UserDirectory for MemoryStore {
    async fn get_user(&self, name: &str) -> Result<Option<User>, SessionError> {
        Ok(self.users.read().await.get(name).map(|s| s.user.clone()))
    }

    async fn get_user_by_identity(
        &self,
        identity: &str,
    ) -> Result<Option<User>, SessionError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|s| s.user.email.as_deref() == Some(identity))
            .map(|s| s.user.clone()))
    }

    async fn check_password(
        &self,
        user: &User,
        password: &str,
    ) -> Result<bool, SessionError> {
        Ok(self
            .users
            .read()
            .await
            .get(&user.name)
            .is_some_and(|s| s.password == password))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, SessionError> {
        let mut users = self.users.write().await;
        if users.contains_key(&new_user.name) {
            return Err(SessionError::backend(format!(
                "user {:?} already exists",
                new_user.name
            )));
        }

        let user = User::new(new_user.name.clone()).with_email(new_user.email);
        users.insert(
            new_user.name,
            StoredUser {
                user: user.clone(),
                password: new_user.password,
            },
        );
        tracing::debug!(username = %user.name, "user created");
        Ok(user)
    }

    async fn delete_all_sessions(&self, username: &str) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .retain(|_, session| session.username != username);
        Ok(())
    }
}
