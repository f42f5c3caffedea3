//! Error types for the session layer.

/// A boxed, thread-safe error from a collaborator (store or directory).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during session management.
///
/// The first three variants are the stable error kinds callers branch
/// on. Their messages are shown to clients, so they never contain a
/// session id or any other storage key.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed credential check, or a login for a user that doesn't
    /// exist. Wrong password and unknown user are deliberately the
    /// same error.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed administrative input: bad principal name, non-positive
    /// TTL, empty identity on auto-provisioning, malformed key list.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The targeted session (or user) doesn't exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A store or directory failure, passed through untouched.
    #[error(transparent)]
    Backend(BoxError),
}

impl SessionError {
    /// Wraps a collaborator failure.
    ///
    /// Accepts anything that converts into a [`BoxError`], including
    /// plain `String`s and `&str`s.
    pub fn backend(err: impl Into<BoxError>) -> Self {
        Self::Backend(err.into())
    }

    /// The HTTP status this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Backend(_) => 500,
        }
    }

    /// Stable, human-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "Unauthorized",
            Self::BadRequest(_) => "Bad Request",
            Self::NotFound(_) => "Not Found",
            Self::Backend(_) => "Internal Server Error",
        }
    }

    /// The message without the kind prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::Unauthorized(msg)
            | Self::BadRequest(msg)
            | Self::NotFound(msg) => msg.clone(),
            Self::Backend(err) => err.to_string(),
        }
    }
}
