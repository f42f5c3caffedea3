//! Wire types for Tollgate's session endpoints.
//!
//! Every type here is something a client either sends (request bodies)
//! or receives (response bodies). The JSON field names follow the
//! CouchDB-style `_session` API that clients of the service already
//! speak, which is why a few of them are renamed (`userCtx`).

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

/// A user's authorized channels: channel name → the change-stream
/// sequence at which the user gained access.
///
/// A `BTreeMap` keeps the JSON output ordered by channel name, so two
/// renderings of the same set are byte-identical.
pub type ChannelSet = BTreeMap<String, u64>;

// ---------------------------------------------------------------------------
// AuthHandler
// ---------------------------------------------------------------------------

/// An authentication mechanism advertised in session responses.
///
/// `#[serde(rename_all = "lowercase")]` makes these appear as
/// `"default"`, `"cookie"`, `"persona"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthHandler {
    /// Name/password login (HTTP basic or `POST /_session`).
    Default,

    /// Session cookie issued by a previous login.
    Cookie,

    /// Verified-email login. Only advertised when the tenant enables it.
    Persona,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of a credential login (`POST /_session`).
///
/// Missing fields decode as empty strings; an empty name simply fails
/// authentication like any other unknown user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

/// Body of an administrative session issue (`POST /_session` on the
/// admin interface).
///
/// `ttl` is in seconds. `None` means "use the configured default";
/// zero and negative values are rejected by the session layer, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSessionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// The identity half of a [`SessionView`].
///
/// `channels` is a `Cow` so the formatter can hand out a borrowed,
/// read-only view of the user's live channel set without copying it.
/// Deserializing always produces the owned variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext<'a> {
    /// `null` for anonymous callers.
    pub name: Option<String>,
    pub channels: Cow<'a, ChannelSet>,
}

/// Response to "who am I?" and to every successful login.
///
/// ```json
/// {
///   "ok": true,
///   "userCtx": { "name": "alice", "channels": { "public": 1 } },
///   "authentication_handlers": ["default", "cookie"]
/// }
/// ```
///
/// `ok` means the call succeeded, NOT that the caller is logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView<'a> {
    pub ok: bool,
    #[serde(rename = "userCtx")]
    pub user_ctx: UserContext<'a>,
    pub authentication_handlers: Vec<AuthHandler>,
}

/// Returned by the admin "issue session" action.
///
/// The caller delivers the session out of band (e.g. sets the cookie
/// in its own domain), so no cookie is attached to that response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    pub session_id: String,
    pub expires: DateTime<Utc>,
    pub cookie_name: String,
}

/// Error body, CouchDB style: `{"error": "Not Found", "reason": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
