//! The session store: durable, keyed storage for session records.

use std::future::Future;
use std::sync::Arc;

use chrono::TimeDelta;

use crate::{Session, SessionError};

/// Create, get, and delete sessions by id.
///
/// The store owns all the hard parts the manager relies on:
/// - `create` allocates a unique, unguessable id.
/// - create/get/delete of a single id are atomic.
/// - a session past its expiration is reported as absent by `get`,
///   whether or not it has been physically removed yet.
///
/// Deleting every session of a user goes through
/// [`UserDirectory::delete_all_sessions`](crate::UserDirectory::delete_all_sessions)
/// instead, since that index usually lives with the user records.
pub trait SessionStore: Send + Sync + 'static {
    /// Stores a new session for `username`, expiring `ttl` from now.
    fn create(
        &self,
        username: &str,
        ttl: TimeDelta,
    ) -> impl Future<Output = Result<Session, SessionError>> + Send;

    /// Returns the live session with this id, or `None`.
    fn get(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Session>, SessionError>> + Send;

    /// Deletes the session. Returns `false` if there was nothing to
    /// delete.
    fn delete(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<bool, SessionError>> + Send;
}

impl<T: SessionStore> SessionStore for Arc<T> {
    fn create(
        &self,
        username: &str,
        ttl: TimeDelta,
    ) -> impl Future<Output = Result<Session, SessionError>> + Send {
        (**self).create(username, ttl)
    }

    fn get(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Session>, SessionError>> + Send {
        (**self).get(id)
    }

    fn delete(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<bool, SessionError>> + Send {
        (**self).delete(id)
    }
}
