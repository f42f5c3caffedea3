//! Session types: the records this crate issues and the artifacts
//! derived from them.
//!
//! - [`Session`]: one authenticated login, as the store keeps it
//! - [`Cookie`]: how a session id travels to the browser
//! - [`User`]: the directory's view of an identity
//! - [`SessionConfig`]: per-tenant session settings

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tollgate_protocol::ChannelSet;

/// The reserved name of the anonymous user. Sessions can't be issued
/// for it.
pub const GUEST_USERNAME: &str = "GUEST";

/// Cookie name used unless the config overrides it.
pub const DEFAULT_COOKIE_NAME: &str = "TollgateSession";

/// 24 hours.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
///
/// Passed to the manager at construction; nothing here is process-wide
/// state, so tests can build managers with whatever TTL they need.
///
/// `#[serde(default)]` lets a config file set only the fields it cares
/// about; the rest come from [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of sessions created by logins, and of administered
    /// sessions whose request doesn't say otherwise.
    pub default_ttl_secs: u64,

    /// Name of the session cookie.
    pub cookie_name: String,

    /// Whether verified-email ("persona") login is enabled for this
    /// tenant. Only affects which mechanisms session views advertise.
    pub persona_enabled: bool,
}

impl SessionConfig {
    /// The default TTL as a `TimeDelta`, saturating at the largest
    /// representable duration.
    pub fn default_ttl(&self) -> TimeDelta {
        i64::try_from(self.default_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            persona_enabled: false,
        }
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A user record as returned by the
/// [`UserDirectory`](crate::UserDirectory).
///
/// The credential is not part of this struct: checking it is the
/// directory's job, so the session layer never holds a password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique and immutable. Empty for the anonymous user.
    pub name: String,

    /// Verified email address, if any.
    pub email: Option<String>,

    /// Channels this user may read, with the sequence at which access
    /// was granted.
    pub channels: ChannelSet,
}

impl User {
    /// A user with no email and no channels.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            channels: ChannelSet::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>, since: u64) -> Self {
        self.channels.insert(channel.into(), since);
        self
    }

    /// `true` for the anonymous user (empty name).
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}

/// What the manager hands the directory when it provisions a user from
/// a verified identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Random; the user is expected to log in through their verified
    /// identity, never with this.
    pub password: String,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One authenticated login.
///
/// Sessions are immutable: there is no renew or update. They end by
/// being deleted, or by passing `expiration`, after which the store
/// must report them as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque, unguessable id. Doubles as the cookie value.
    pub id: String,

    /// Name of the user who owns this session. Never empty.
    pub username: String,

    /// Absolute time after which the session is invalid.
    pub expiration: DateTime<Utc>,
}

impl Session {
    /// Returns `true` if the session is no longer valid at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }
}

// ---------------------------------------------------------------------------
// Cookie
// ---------------------------------------------------------------------------

/// A session cookie, ready to be written as a `Set-Cookie` header.
///
/// Derived from a [`Session`] at issuance and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    /// The session id, or empty for a cleared cookie.
    pub value: String,
    /// The tenant's path scope, e.g. `/db/`.
    pub path: String,
    pub expires: DateTime<Utc>,
    pub http_only: bool,
}

impl Cookie {
    /// Binds `session` to a cookie scoped to `path`. Pure, no I/O.
    pub fn for_session(session: &Session, name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            value: session.id.clone(),
            path: path.to_string(),
            expires: session.expiration,
            http_only: true,
        }
    }

    /// A cookie that makes the browser drop the session cookie:
    /// empty value, expired at the Unix epoch.
    pub fn cleared(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            value: String::new(),
            path: path.to_string(),
            expires: DateTime::UNIX_EPOCH,
            http_only: true,
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.value.is_empty()
    }

    /// Renders the `Set-Cookie` header value.
    ///
    /// `Expires` uses the RFC 1123 format browsers expect, e.g.
    /// `Thu, 01 Jan 1970 00:00:00 GMT`.
    pub fn to_header_value(&self) -> String {
        let mut header = format!(
            "{}={}; Path={}; Expires={}",
            self.name,
            self.value,
            self.path,
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT"),
        );
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        header
    }
}

/// The cookie path scope for a tenant: `"/" + tenant + "/"`.
pub fn tenant_path(tenant: &str) -> String {
    format!("/{tenant}/")
}

/// A freshly created session together with the cookie that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub session: Session,
    pub cookie: Cookie,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
