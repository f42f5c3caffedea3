//! Wire protocol for Tollgate.
//!
//! This crate defines what goes over HTTP, and nothing else:
//!
//! - **Types** ([`SessionView`], [`SessionDescriptor`], [`LoginRequest`],
//!   ...): request and response bodies.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how bodies become
//!   bytes and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing that.
//!
//! ```text
//! Request layer (bytes) → Protocol (typed bodies) → Session layer
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AdminSessionRequest, AuthHandler, ChannelSet, ErrorBody, LoginRequest,
    SessionDescriptor, SessionView, UserContext,
};
