//! The session lifecycle manager: every way a session is issued, read,
//! or revoked goes through here.
//!
//! # Concurrency note
//!
//! `SessionLifecycleManager` holds no mutable state of its own. Session
//! and user records live in the [`SessionStore`] and [`UserDirectory`],
//! and their locking (or transactions) is their business. A manager can
//! be shared behind an `Arc` and called from any number of tasks at
//! once without a mutex.

use chrono::TimeDelta;
use rand::Rng;
use serde_json::Value;
use tollgate_protocol::SessionDescriptor;

use crate::principal::validate_session_principal;
use crate::{
    BulkDeletion, Cookie, IssuedSession, NewUser, Session, SessionConfig,
    SessionError, SessionKeys, SessionStore, User, UserDirectory,
    tenant_path,
};

/// Issues, looks up, and revokes login sessions for one tenant.
///
/// ## Operations
///
/// ```text
///  public                          admin-gated (caller checks the gate)
///  ──────                          ────────────────────────────────────
///  login / authenticate            create_administered_session
///  create_session                  get_session
///  create_session_from_verified_…  delete_administered_session
///  delete_session (logout)         delete_sessions_bulk
/// ```
///
/// The manager never decides whether the caller is an administrator;
/// the request layer does that before calling the admin operations.
pub struct SessionLifecycleManager<S, D> {
    store: S,
    directory: D,
    /// Tenant name; cookies are scoped to `/{tenant}/`.
    tenant: String,
    config: SessionConfig,
}

impl<S, D> SessionLifecycleManager<S, D>
where
    S: SessionStore,
    D: UserDirectory,
{
    pub fn new(
        store: S,
        directory: D,
        tenant: impl Into<String>,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            directory,
            tenant: tenant.into(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// The path scope every cookie from this manager carries.
    pub fn cookie_path(&self) -> String {
        tenant_path(&self.tenant)
    }

    // =====================================================================
    // Login
    // =====================================================================

    /// Checks a name/password pair.
    ///
    /// Returns `Ok(None)` both for an unknown user and for a wrong
    /// password. Callers must not tell the two apart in their responses,
    /// or the endpoint becomes a username oracle.
    pub async fn authenticate(
        &self,
        name: &str,
        password: &str,
    ) -> Result<Option<User>, SessionError> {
        let Some(user) = self.directory.get_user(name).await? else {
            return Ok(None);
        };
        if self.directory.check_password(&user, password).await? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Creates a session for `user` lasting `ttl`, plus its cookie.
    ///
    /// This is the only way from "unauthenticated" to "authenticated".
    ///
    /// # Errors
    /// [`SessionError::Unauthorized`] if `user` is `None`, which is what
    /// a failed [`authenticate`](Self::authenticate) hands over. Nothing
    /// is stored in that case.
    pub async fn create_session(
        &self,
        user: Option<&User>,
        ttl: TimeDelta,
    ) -> Result<IssuedSession, SessionError> {
        let user = user.ok_or_else(invalid_login)?;

        let session = self.store.create(&user.name, ttl).await?;
        let cookie = Cookie::for_session(
            &session,
            &self.config.cookie_name,
            &self.cookie_path(),
        );

        tracing::info!(
            username = %user.name,
            expires = %session.expiration,
            "session created"
        );
        Ok(IssuedSession { session, cookie })
    }

    /// [`authenticate`](Self::authenticate) followed by
    /// [`create_session`](Self::create_session) with the default TTL.
    pub async fn login(
        &self,
        name: &str,
        password: &str,
    ) -> Result<(User, IssuedSession), SessionError> {
        let Some(user) = self.authenticate(name, password).await? else {
            tracing::debug!(%name, "credential login rejected");
            return Err(invalid_login());
        };
        let issued = self
            .create_session(Some(&user), self.config.default_ttl())
            .await?;
        Ok((user, issued))
    }

    /// Logs in with an identity already verified upstream (e.g. an
    /// email address whose ownership was just proven). The proof is
    /// trusted, not re-checked.
    ///
    /// If no user has that identity and `create_user_if_needed` is set,
    /// one is provisioned first, named after the identity and given a
    /// random password.
    ///
    /// # Errors
    /// - [`SessionError::Unauthorized`]: no such user, and provisioning
    ///   not allowed
    /// - [`SessionError::BadRequest`]: provisioning with an empty identity
    /// - any directory error from provisioning, before a session exists
    pub async fn create_session_from_verified_identity(
        &self,
        identity: &str,
        create_user_if_needed: bool,
    ) -> Result<(User, IssuedSession), SessionError> {
        let user = match self.directory.get_user_by_identity(identity).await? {
            Some(user) => user,
            None if !create_user_if_needed => {
                return Err(SessionError::Unauthorized("no such user".into()));
            }
            None => self.provision_user(identity).await?,
        };

        let issued = self
            .create_session(Some(&user), self.config.default_ttl())
            .await?;
        Ok((user, issued))
    }

    async fn provision_user(&self, identity: &str) -> Result<User, SessionError> {
        if identity.is_empty() {
            return Err(SessionError::BadRequest(
                "cannot register new user: identity is missing".into(),
            ));
        }

        let user = self
            .directory
            .create_user(NewUser {
                name: identity.to_string(),
                email: identity.to_string(),
                password: generate_token(),
            })
            .await?;

        tracing::info!(username = %user.name, "user provisioned from verified identity");
        Ok(user)
    }

    // =====================================================================
    // Admin: issue and inspect
    // =====================================================================

    /// Issues a session on behalf of `name` and describes it, without
    /// setting a cookie. The caller delivers it out of band.
    ///
    /// `ttl_secs` of `None` means the configured default.
    ///
    /// # Errors
    /// - [`SessionError::BadRequest`]: empty, `GUEST`, or malformed name
    /// - [`SessionError::NotFound`]: no such user
    /// - [`SessionError::BadRequest`]: TTL zero, negative, or too large
    pub async fn create_administered_session(
        &self,
        name: &str,
        ttl_secs: Option<i64>,
    ) -> Result<SessionDescriptor, SessionError> {
        validate_session_principal(name)?;

        if self.directory.get_user(name).await?.is_none() {
            return Err(SessionError::NotFound("no such user".into()));
        }

        let ttl = match ttl_secs {
            None => self.config.default_ttl(),
            Some(secs) if secs >= 1 => TimeDelta::try_seconds(secs)
                .ok_or_else(invalid_ttl)?,
            Some(_) => return Err(invalid_ttl()),
        };

        let session = self.store.create(name, ttl).await?;

        tracing::info!(
            username = %name,
            expires = %session.expiration,
            "administered session created"
        );
        Ok(SessionDescriptor {
            session_id: session.id,
            expires: session.expiration,
            cookie_name: self.config.cookie_name.clone(),
        })
    }

    /// Fetches a live session by id.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the store has no live session with
    /// this id (expired counts as absent).
    pub async fn get_session(&self, id: &str) -> Result<Session, SessionError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| SessionError::NotFound("no such session".into()))
    }

    /// Resolves the owner of `session`.
    ///
    /// `Ok(None)` if the user was deleted after the session was issued;
    /// a dangling session is not an error.
    pub async fn user_for_session(
        &self,
        session: &Session,
    ) -> Result<Option<User>, SessionError> {
        self.directory.get_user(&session.username).await
    }

    // =====================================================================
    // Deletion
    // =====================================================================

    /// Deletes a session regardless of owner, returning a cookie that
    /// clears it in the browser (the logout response).
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if nothing was deleted.
    pub async fn delete_session(&self, id: &str) -> Result<Cookie, SessionError> {
        if !self.store.delete(id).await? {
            return Err(SessionError::NotFound("no session".into()));
        }
        tracing::info!("session deleted");
        Ok(Cookie::cleared(&self.config.cookie_name, &self.cookie_path()))
    }

    /// Deletes the session only if `username` owns it.
    ///
    /// A missing session and a session owned by someone else both end
    /// the same way: `Ok(())`, nothing deleted. The caller can't learn
    /// whether an id exists under another user. A failed lookup counts
    /// as missing; only a failed delete is reported.
    pub async fn delete_session_if_owned_by(
        &self,
        id: &str,
        username: &str,
    ) -> Result<(), SessionError> {
        let found = match self.store.get(id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!(%username, error = %e, "session lookup failed, skipping delete");
                None
            }
        };

        if found.is_some_and(|session| session.username == username) {
            self.store.delete(id).await?;
            tracing::info!(%username, "session deleted after ownership check");
        }
        Ok(())
    }

    /// Admin single delete. With a username the delete is
    /// ownership-checked; without one (or with an empty one) it is
    /// unconditional and reports [`SessionError::NotFound`].
    pub async fn delete_administered_session(
        &self,
        id: &str,
        username: Option<&str>,
    ) -> Result<(), SessionError> {
        match username.filter(|name| !name.is_empty()) {
            Some(username) => self.delete_session_if_owned_by(id, username).await,
            None => self.delete_session(id).await.map(|_cleared| ()),
        }
    }

    /// Admin bulk delete from a raw `{"keys": [...]}` body.
    ///
    /// The body is fully validated before anything is deleted; see
    /// [`SessionKeys::from_payload`].
    pub async fn delete_sessions_bulk(
        &self,
        username: &str,
        payload: &Value,
    ) -> Result<BulkDeletion, SessionError> {
        let keys = SessionKeys::from_payload(payload)?;
        self.delete_sessions(username, &keys).await
    }

    /// Deletes the targeted sessions of `username`.
    ///
    /// With [`SessionKeys::AllForUser`] a single delete-all is issued.
    /// Otherwise each id goes through
    /// [`delete_session_if_owned_by`](Self::delete_session_if_owned_by)
    /// in order, and per-item failures are collected and then discarded:
    /// the batch always runs to the end and reports success. It is
    /// best-effort, not a transaction.
    ///
    /// # Errors
    /// - [`SessionError::BadRequest`]: empty `username`
    /// - a directory error from the delete-all case
    pub async fn delete_sessions(
        &self,
        username: &str,
        keys: &SessionKeys,
    ) -> Result<BulkDeletion, SessionError> {
        if username.is_empty() {
            return Err(SessionError::BadRequest(
                "invalid or missing user name".into(),
            ));
        }

        match keys {
            SessionKeys::AllForUser => {
                self.directory.delete_all_sessions(username).await?;
                tracing::info!(%username, "all sessions deleted");
                Ok(BulkDeletion::AllForUser)
            }
            SessionKeys::Ids(ids) => {
                let mut results = Vec::with_capacity(ids.len());
                for id in ids {
                    results.push(self.delete_session_if_owned_by(id, username).await);
                }

                // Discarded on purpose: one bad item must not fail the batch.
                let discarded = results
                    .into_iter()
                    .filter_map(Result::err)
                    .inspect(|e| {
                        tracing::debug!(%username, error = %e, "bulk delete item failed");
                    })
                    .count();

                tracing::info!(%username, attempted = ids.len(), discarded, "bulk session delete");
                Ok(BulkDeletion::Individually {
                    attempted: ids.len(),
                    discarded,
                })
            }
        }
    }
}

fn invalid_login() -> SessionError {
    SessionError::Unauthorized("invalid login".into())
}

fn invalid_ttl() -> SessionError {
    SessionError::BadRequest("invalid or missing ttl".into())
}

/// Generates a random 32-character hex string (128 bits of entropy).
///
/// Used for session ids and for the throwaway password of provisioned
/// users.
pub(crate) fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================
