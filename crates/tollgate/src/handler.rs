//! Per-request handling: admin gate, body decoding, and one function per
//! session action.
//!
//! Every request goes through [`dispatch`]:
//!   1. Admin actions are checked against the admin gate (403 on refusal)
//!   2. The body, if any, is decoded through the service's codec
//!   3. The manager does the work
//!   4. The result is encoded into a [`Response`]
//!
//! Errors from any step come back as `TollgateError`; the service turns
//! them into an `ErrorBody` response.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tollgate_protocol::{
    AdminSessionRequest, Codec, LoginRequest, ProtocolError,
};
use tollgate_session::{
    Cookie, SessionError, SessionStore, User, UserDirectory,
};

use crate::TollgateError;
use crate::service::ServiceState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// One session action, already routed by the HTTP layer.
///
/// Bodies are raw bytes; decoding them is part of handling the request,
/// so a malformed body turns into a 400 like any other bad input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRequest {
    /// "Who am I?" for the current caller.
    GetSession,

    /// Credential login. Body: `{"name", "password"}`.
    Login { body: Vec<u8> },

    /// Log out the caller's current session.
    Logout,

    /// Login with an identity the caller has already verified upstream
    /// (e.g. an email assertion).
    VerifiedLogin {
        identity: String,
        create_user_if_needed: bool,
    },

    /// Admin: issue a session for a named user. Body: `{"name", "ttl"?}`.
    AdminCreate { body: Vec<u8> },

    /// Admin: inspect a session.
    AdminGet { session_id: String },

    /// Admin: delete one session, optionally only if `username` owns it.
    AdminDelete {
        session_id: String,
        username: Option<String>,
    },

    /// Admin: delete several of a user's sessions. Body: `{"keys": [...]}`.
    AdminBulkDelete { username: String, body: Vec<u8> },
}

impl SessionRequest {
    /// Whether the admin gate must approve this request.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::AdminCreate { .. }
                | Self::AdminGet { .. }
                | Self::AdminDelete { .. }
                | Self::AdminBulkDelete { .. }
        )
    }

    /// Short action name for logs.
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSession => "get_session",
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::VerifiedLogin { .. } => "verified_login",
            Self::AdminCreate { .. } => "admin_create",
            Self::AdminGet { .. } => "admin_get",
            Self::AdminDelete { .. } => "admin_delete",
            Self::AdminBulkDelete { .. } => "admin_bulk_delete",
        }
    }
}

/// What the HTTP layer knows about the caller.
///
/// `user` is whoever the HTTP layer already authenticated (by cookie or
/// basic auth), and `session_id` is the session cookie value if one was
/// sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user: Option<User>,
    pub session_id: Option<String>,
    /// The request arrived on the administrative interface.
    pub admin_interface: bool,
}

impl RequestContext {
    /// An unauthenticated caller on the public interface.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A caller on the administrative interface.
    pub fn admin() -> Self {
        Self {
            admin_interface: true,
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }
}

/// A transport-agnostic response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Encoded body; empty for actions that only report success.
    pub body: Vec<u8>,
    pub set_cookie: Option<Cookie>,
}

impl Response {
    pub(crate) fn encoded<C: Codec, T: Serialize>(
        codec: &C,
        status: u16,
        value: &T,
    ) -> Result<Self, TollgateError> {
        Ok(Self {
            status,
            body: codec.encode(value)?,
            set_cookie: None,
        })
    }

    pub(crate) fn empty() -> Self {
        Self {
            status: 200,
            body: Vec::new(),
            set_cookie: None,
        }
    }

    fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.set_cookie = Some(cookie);
        self
    }

    /// The `Set-Cookie` header value, if this response carries a cookie.
    pub fn set_cookie_header(&self) -> Option<String> {
        self.set_cookie.as_ref().map(Cookie::to_header_value)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub(crate) async fn dispatch<S, D, C>(
    state: &ServiceState<S, D, C>,
    ctx: &RequestContext,
    request: SessionRequest,
) -> Result<Response, TollgateError>
where
    S: SessionStore,
    D: UserDirectory,
    C: Codec,
{
    if request.requires_admin() && !(state.admin_gate)(ctx) {
        return Err(TollgateError::Forbidden(
            "administrator access required".into(),
        ));
    }

    match request {
        SessionRequest::GetSession => get_session(state, ctx),
        SessionRequest::Login { body } => login(state, &body).await,
        SessionRequest::Logout => logout(state, ctx).await,
        SessionRequest::VerifiedLogin {
            identity,
            create_user_if_needed,
        } => verified_login(state, &identity, create_user_if_needed).await,
        SessionRequest::AdminCreate { body } => admin_create(state, &body).await,
        SessionRequest::AdminGet { session_id } => {
            admin_get(state, &session_id).await
        }
        SessionRequest::AdminDelete {
            session_id,
            username,
        } => {
            state
                .manager
                .delete_administered_session(&session_id, username.as_deref())
                .await?;
            Ok(Response::empty())
        }
        SessionRequest::AdminBulkDelete { username, body } => {
            admin_bulk_delete(state, &username, &body).await
        }
    }
}

/// Decodes a request body. Every action that takes a body requires one.
fn decode_body<C: Codec, T: DeserializeOwned>(
    codec: &C,
    body: &[u8],
) -> Result<T, TollgateError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ProtocolError::InvalidMessage("request body is empty".into()).into());
    }
    Ok(codec.decode(body)?)
}

// ---------------------------------------------------------------------------
// Public actions
// ---------------------------------------------------------------------------

fn get_session<S, D, C: Codec>(
    state: &ServiceState<S, D, C>,
    ctx: &RequestContext,
) -> Result<Response, TollgateError> {
    let view = state.formatter.format(ctx.user.as_ref());
    Response::encoded(&state.codec, 200, &view)
}

async fn login<S, D, C>(
    state: &ServiceState<S, D, C>,
    body: &[u8],
) -> Result<Response, TollgateError>
where
    S: SessionStore,
    D: UserDirectory,
    C: Codec,
{
    let req: LoginRequest = decode_body(&state.codec, body)?;
    let (user, issued) = state.manager.login(&req.name, &req.password).await?;

    let view = state.formatter.format(Some(&user));
    Ok(Response::encoded(&state.codec, 200, &view)?.with_cookie(issued.cookie))
}

async fn logout<S, D, C>(
    state: &ServiceState<S, D, C>,
    ctx: &RequestContext,
) -> Result<Response, TollgateError>
where
    S: SessionStore,
    D: UserDirectory,
    C: Codec,
{
    let Some(id) = ctx.session_id.as_deref() else {
        return Err(SessionError::NotFound("no session".into()).into());
    };
    let cleared = state.manager.delete_session(id).await?;
    Ok(Response::empty().with_cookie(cleared))
}

async fn verified_login<S, D, C>(
    state: &ServiceState<S, D, C>,
    identity: &str,
    create_user_if_needed: bool,
) -> Result<Response, TollgateError>
where
    S: SessionStore,
    D: UserDirectory,
    C: Codec,
{
    let (user, issued) = state
        .manager
        .create_session_from_verified_identity(identity, create_user_if_needed)
        .await?;

    let view = state.formatter.format(Some(&user));
    Ok(Response::encoded(&state.codec, 200, &view)?.with_cookie(issued.cookie))
}

// ---------------------------------------------------------------------------
// Admin actions
// ---------------------------------------------------------------------------

async fn admin_create<S, D, C>(
    state: &ServiceState<S, D, C>,
    body: &[u8],
) -> Result<Response, TollgateError>
where
    S: SessionStore,
    D: UserDirectory,
    C: Codec,
{
    let req: AdminSessionRequest = decode_body(&state.codec, body)?;
    let descriptor = state
        .manager
        .create_administered_session(&req.name, req.ttl)
        .await?;
    Response::encoded(&state.codec, 200, &descriptor)
}

async fn admin_get<S, D, C>(
    state: &ServiceState<S, D, C>,
    session_id: &str,
) -> Result<Response, TollgateError>
where
    S: SessionStore,
    D: UserDirectory,
    C: Codec,
{
    let session = state.manager.get_session(session_id).await?;
    // The owner may have been deleted since; that renders as anonymous.
    let owner = state.manager.user_for_session(&session).await?;
    let view = state.formatter.format(owner.as_ref());
    Response::encoded(&state.codec, 200, &view)
}

async fn admin_bulk_delete<S, D, C>(
    state: &ServiceState<S, D, C>,
    username: &str,
    body: &[u8],
) -> Result<Response, TollgateError>
where
    S: SessionStore,
    D: UserDirectory,
    C: Codec,
{
    let payload: Value = decode_body(&state.codec, body)?;
    let outcome = state
        .manager
        .delete_sessions_bulk(username, &payload)
        .await?;
    tracing::debug!(%username, ?outcome, "bulk delete finished");
    Ok(Response::empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_admin_only_for_admin_actions() {
        assert!(!SessionRequest::GetSession.requires_admin());
        assert!(!SessionRequest::Logout.requires_admin());
        assert!(!SessionRequest::Login { body: vec![] }.requires_admin());
        assert!(
            SessionRequest::AdminGet {
                session_id: "x".into()
            }
            .requires_admin()
        );
        assert!(
            SessionRequest::AdminBulkDelete {
                username: "alice".into(),
                body: vec![]
            }
            .requires_admin()
        );
    }

    #[test]
    fn test_request_context_builders() {
        let ctx = RequestContext::anonymous()
            .with_user(User::new("alice"))
            .with_session_id("abc");
        assert_eq!(ctx.user.as_ref().map(|u| u.name.as_str()), Some("alice"));
        assert_eq!(ctx.session_id.as_deref(), Some("abc"));
        assert!(!ctx.admin_interface);
        assert!(RequestContext::admin().admin_interface);
    }

    #[test]
    fn test_decode_body_blank_is_invalid_message() {
        use tollgate_protocol::JsonCodec;

        for body in [&b""[..], &b"  \n"[..]] {
            let result = decode_body::<_, LoginRequest>(&JsonCodec, body);
            assert!(matches!(
                result,
                Err(TollgateError::Protocol(ProtocolError::InvalidMessage(_)))
            ));
        }
    }

    #[test]
    fn test_empty_response_has_no_cookie_header() {
        let response = Response::empty();
        assert_eq!(response.status, 200);
        assert!(response.body.is_empty());
        assert_eq!(response.set_cookie_header(), None);
    }
}
