//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means the bytes were the problem: they
//! couldn't be produced, couldn't be parsed, or parsed into something
//! that breaks the wire rules. Session semantics live one layer up.

/// Errors that can occur while encoding or decoding wire types.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, or a field with the wrong type
    /// (e.g. `"ttl": "soon"`).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The body parsed but isn't acceptable at the protocol level,
    /// e.g. an empty body where one is required.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
