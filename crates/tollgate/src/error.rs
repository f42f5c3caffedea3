//! Unified error type for the Tollgate service.

use tollgate_protocol::ProtocolError;
use tollgate_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attributes let `?` lift protocol and session errors
/// into this type, so request handlers deal with one error and one
/// status mapping.
#[derive(Debug, thiserror::Error)]
pub enum TollgateError {
    /// The request body couldn't be decoded, or a response couldn't be
    /// encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session operation failed (unauthorized, bad input, not found,
    /// or a store failure).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The admin gate rejected the request.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The service was built with unusable settings.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl TollgateError {
    /// The HTTP status this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            // Failing to encode our own response is our fault.
            Self::Protocol(ProtocolError::Encode(_)) => 500,
            Self::Protocol(_) => 400,
            Self::Session(e) => e.status_code(),
            Self::Forbidden(_) => 403,
            Self::Config(_) => 500,
        }
    }

    /// Stable, human-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self.status_code() {
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            _ => "Internal Server Error",
        }
    }

    /// The message without the kind prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::Session(e) => e.reason(),
            Self::Forbidden(msg) | Self::Config(msg) => msg.clone(),
            Self::Protocol(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let tollgate_err: TollgateError = err.into();
        assert!(matches!(tollgate_err, TollgateError::Protocol(_)));
        assert_eq!(tollgate_err.status_code(), 400);
    }

    #[test]
    fn test_from_session_error_keeps_status() {
        let err = SessionError::Unauthorized("invalid login".into());
        let tollgate_err: TollgateError = err.into();
        assert!(matches!(tollgate_err, TollgateError::Session(_)));
        assert_eq!(tollgate_err.status_code(), 401);
        assert_eq!(tollgate_err.kind(), "Unauthorized");
        assert_eq!(tollgate_err.reason(), "invalid login");
    }

    #[test]
    fn test_decode_error_is_bad_request() {
        let decode = serde_json::from_str::<serde_json::Value>("{")
            .map_err(ProtocolError::Decode)
            .unwrap_err();
        let tollgate_err = TollgateError::from(decode);
        assert_eq!(tollgate_err.status_code(), 400);
    }

    #[test]
    fn test_forbidden_is_403() {
        let err = TollgateError::Forbidden("admin only".into());
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.kind(), "Forbidden");
        assert_eq!(err.to_string(), "forbidden: admin only");
    }

    #[test]
    fn test_backend_failure_is_500() {
        let err = TollgateError::from(SessionError::backend("bucket down"));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.kind(), "Internal Server Error");
    }
}
