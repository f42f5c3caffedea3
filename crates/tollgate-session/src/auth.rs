//! The user directory: where identities and credentials live.
//!
//! Tollgate doesn't store users or hash passwords. It defines the
//! [`UserDirectory`] trait and calls it whenever it needs to resolve a
//! name, check a credential, or provision a user from a verified email.
//! Implement it over whatever holds your users.

use std::future::Future;
use std::sync::Arc;

use crate::{NewUser, SessionError, User};

/// Lookup, credential check, and on-demand creation of users.
///
/// `Send + Sync + 'static` because one directory is shared by every
/// request, and Tokio may poll those requests on different threads.
///
/// Lookups return `Ok(None)` for "no such user". `Err` is reserved for
/// the directory itself failing; the manager passes those errors
/// through unchanged.
///
/// # Example
///
/// ```rust
/// use tollgate_session::{NewUser, SessionError, User, UserDirectory};
///
/// /// Knows exactly one user. Only useful in examples.
/// struct SingleUser;
///
/// impl UserDirectory for SingleUser {
///     async fn get_user(&self, name: &str) -> Result<Option<User>, SessionError> {
///         Ok((name == "alice").then(|| User::new("alice")))
///     }
///
///     async fn get_user_by_identity(
///         &self,
///         _identity: &str,
///     ) -> Result<Option<User>, SessionError> {
///         Ok(None)
///     }
///
///     async fn check_password(
///         &self,
///         user: &User,
///         password: &str,
///     ) -> Result<bool, SessionError> {
///         Ok(user.name == "alice" && password == "letmein")
///     }
///
///     async fn create_user(&self, _user: NewUser) -> Result<User, SessionError> {
///         Err(SessionError::backend("read-only directory"))
///     }
///
///     async fn delete_all_sessions(&self, _username: &str) -> Result<(), SessionError> {
///         Ok(())
///     }
/// }
/// ```
pub trait UserDirectory: Send + Sync + 'static {
    /// Looks a user up by name.
    fn get_user(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<User>, SessionError>> + Send;

    /// Looks a user up by an externally verified identity (an email
    /// address proven authentic upstream).
    fn get_user_by_identity(
        &self,
        identity: &str,
    ) -> impl Future<Output = Result<Option<User>, SessionError>> + Send;

    /// Returns `true` if `password` is `user`'s credential.
    fn check_password(
        &self,
        user: &User,
        password: &str,
    ) -> impl Future<Output = Result<bool, SessionError>> + Send;

    /// Creates a user record.
    fn create_user(
        &self,
        user: NewUser,
    ) -> impl Future<Output = Result<User, SessionError>> + Send;

    /// Deletes every session owned by `username`.
    fn delete_all_sessions(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;
}

/// Lets one directory be shared, e.g. by a manager and by the code
/// that seeds it.
impl<T: UserDirectory> UserDirectory for Arc<T> {
    fn get_user(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<User>, SessionError>> + Send {
        (**self).get_user(name)
    }

    fn get_user_by_identity(
        &self,
        identity: &str,
    ) -> impl Future<Output = Result<Option<User>, SessionError>> + Send {
        (**self).get_user_by_identity(identity)
    }

    fn check_password(
        &self,
        user: &User,
        password: &str,
    ) -> impl Future<Output = Result<bool, SessionError>> + Send {
        (**self).check_password(user, password)
    }

    fn create_user(
        &self,
        user: NewUser,
    ) -> impl Future<Output = Result<User, SessionError>> + Send {
        (**self).create_user(user)
    }

    fn delete_all_sessions(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<(), SessionError>> + Send {
        (**self).delete_all_sessions(username)
    }
}
