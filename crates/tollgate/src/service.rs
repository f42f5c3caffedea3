//! `SessionService` builder and request entry point.
//!
//! This is what an HTTP layer embeds. It ties the layers together:
//! request → protocol (codec) → session (manager, formatter).

use std::fmt;
use std::sync::Arc;

use tollgate_protocol::{Codec, ErrorBody, JsonCodec};
use tollgate_session::{
    SessionConfig, SessionLifecycleManager, SessionStore, SessionViewFormatter,
    UserDirectory,
};

use crate::TollgateError;
use crate::handler::{RequestContext, Response, SessionRequest, dispatch};

/// Decides whether a request may run an admin action.
pub type AdminGate = Arc<dyn Fn(&RequestContext) -> bool + Send + Sync>;

/// Shared service state, handed to every request.
///
/// Nothing in here is mutable: the store and directory do their own
/// locking, so requests never wait on each other at this layer.
pub(crate) struct ServiceState<S, D, C> {
    pub(crate) manager: SessionLifecycleManager<S, D>,
    pub(crate) formatter: SessionViewFormatter,
    pub(crate) codec: C,
    pub(crate) admin_gate: AdminGate,
}

/// Builder for a [`SessionService`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tollgate::prelude::*;
///
/// let store = Arc::new(MemoryStore::new());
/// let service = TollgateBuilder::new()
///     .tenant("db")
///     .build(Arc::clone(&store), store)
///     .unwrap();
/// assert_eq!(service.tenant(), "db");
/// ```
pub struct TollgateBuilder {
    tenant: String,
    session_config: SessionConfig,
    admin_gate: AdminGate,
}

impl TollgateBuilder {
    /// Creates a builder with default settings.
    ///
    /// The default admin gate admits exactly the requests that arrived
    /// on the administrative interface.
    pub fn new() -> Self {
        Self {
            tenant: String::new(),
            session_config: SessionConfig::default(),
            admin_gate: Arc::new(|ctx: &RequestContext| ctx.admin_interface),
        }
    }

    /// Sets the tenant (database) name. Cookies are scoped to
    /// `/{tenant}/`.
    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = tenant.into();
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Replaces the admin gate.
    pub fn admin_gate<F>(mut self, gate: F) -> Self
    where
        F: Fn(&RequestContext) -> bool + Send + Sync + 'static,
    {
        self.admin_gate = Arc::new(gate);
        self
    }

    /// Builds the service over the given store and directory, using
    /// `JsonCodec` for bodies.
    ///
    /// # Errors
    /// `TollgateError::Config` if no tenant was set or the tenant name
    /// contains a `/`.
    pub fn build<S, D>(
        self,
        store: S,
        directory: D,
    ) -> Result<SessionService<S, D, JsonCodec>, TollgateError>
    where
        S: SessionStore,
        D: UserDirectory,
    {
        self.build_with_codec(store, directory, JsonCodec)
    }

    /// Like [`build`](Self::build), with a custom codec.
    pub fn build_with_codec<S, D, C>(
        self,
        store: S,
        directory: D,
        codec: C,
    ) -> Result<SessionService<S, D, C>, TollgateError>
    where
        S: SessionStore,
        D: UserDirectory,
        C: Codec,
    {
        if self.tenant.is_empty() {
            return Err(TollgateError::Config("tenant name is required".into()));
        }
        if self.tenant.contains('/') {
            return Err(TollgateError::Config(format!(
                "tenant name {:?} must not contain '/'",
                self.tenant
            )));
        }

        let formatter =
            SessionViewFormatter::new(self.session_config.persona_enabled);
        tracing::info!(
            tenant = %self.tenant,
            default_ttl_secs = self.session_config.default_ttl_secs,
            "session service ready"
        );

        let state = Arc::new(ServiceState {
            manager: SessionLifecycleManager::new(
                store,
                directory,
                self.tenant,
                self.session_config,
            ),
            formatter,
            codec,
            admin_gate: self.admin_gate,
        });
        Ok(SessionService { state })
    }
}

impl Default for TollgateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TollgateBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TollgateBuilder")
            .field("tenant", &self.tenant)
            .field("session_config", &self.session_config)
            .finish_non_exhaustive()
    }
}

/// The session endpoints of one tenant.
///
/// Cloning is cheap (one `Arc`), so each connection or request task can
/// hold its own handle.
pub struct SessionService<S, D, C = JsonCodec> {
    state: Arc<ServiceState<S, D, C>>,
}

impl<S, D, C> Clone for SessionService<S, D, C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<S, D, C> SessionService<S, D, C>
where
    S: SessionStore,
    D: UserDirectory,
    C: Codec,
{
    pub fn tenant(&self) -> &str {
        self.state.manager.tenant()
    }

    /// The underlying manager, for callers that need an operation
    /// directly (e.g. an HTTP layer resolving a session cookie).
    pub fn manager(&self) -> &SessionLifecycleManager<S, D> {
        &self.state.manager
    }

    /// Handles one request. Never fails: errors become error responses.
    pub async fn handle(
        &self,
        ctx: &RequestContext,
        request: SessionRequest,
    ) -> Response {
        let action = request.action();
        match dispatch(&self.state, ctx, request).await {
            Ok(response) => response,
            Err(e) => {
                let status = e.status_code();
                if status >= 500 {
                    tracing::error!(action, error = %e, "request failed");
                } else {
                    tracing::debug!(action, status, error = %e, "request rejected");
                }
                self.error_response(&e)
            }
        }
    }

    fn error_response(&self, error: &TollgateError) -> Response {
        let body = ErrorBody {
            error: error.kind().to_string(),
            reason: error.reason(),
        };
        let status = error.status_code();
        Response::encoded(&self.state.codec, status, &body).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to encode error body");
            Response {
                status,
                body: Vec::new(),
                set_cookie: None,
            }
        })
    }
}
