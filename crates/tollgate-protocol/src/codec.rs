//! Codec trait and implementations for request and response bodies.
//!
//! The session layer never touches bytes. The request layer decodes
//! bodies into this crate's wire types through a [`Codec`], and encodes
//! responses the same way, so swapping JSON for another format only
//! means another `Codec` impl.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because one codec is shared by every request
/// the service handles, possibly from several Tokio worker threads.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use tollgate_protocol::{Codec, JsonCodec, LoginRequest};
///
/// let codec = JsonCodec;
///
/// let req: LoginRequest =
///     codec.decode(br#"{"name":"alice","password":"pw"}"#).unwrap();
/// assert_eq!(req.name, "alice");
///
/// let bytes = codec.encode(&req).unwrap();
/// let again: LoginRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(req, again);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
