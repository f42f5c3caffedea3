//! # Tollgate
//!
//! Server-tracked login sessions for multi-tenant HTTP services.
//!
//! Tollgate issues, inspects, and revokes session cookies for one tenant
//! (database) at a time. An HTTP layer routes each request to a
//! [`SessionRequest`], describes the caller in a [`RequestContext`], and
//! writes back the [`Response`] it gets from [`SessionService::handle`].
//! Storage comes in through the [`SessionStore`] and [`UserDirectory`]
//! traits; [`MemoryStore`] implements both for development and tests.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tollgate::prelude::*;
//!
//! # async fn run() -> Result<(), TollgateError> {
//! let store = Arc::new(MemoryStore::new());
//! store.add_user(User::new("alice"), "letmein").await;
//!
//! let service = TollgateBuilder::new()
//!     .tenant("db")
//!     .build(Arc::clone(&store), Arc::clone(&store))?;
//!
//! let response = service
//!     .handle(
//!         &RequestContext::anonymous(),
//!         SessionRequest::Login {
//!             body: br#"{"name":"alice","password":"letmein"}"#.to_vec(),
//!         },
//!     )
//!     .await;
//! assert_eq!(response.status, 200);
//! assert!(response.set_cookie.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! [`SessionStore`]: tollgate_session::SessionStore
//! [`UserDirectory`]: tollgate_session::UserDirectory
//! [`MemoryStore`]: tollgate_session::MemoryStore

mod error;
mod handler;
mod service;

pub use error::TollgateError;
pub use handler::{RequestContext, Response, SessionRequest};
pub use service::{AdminGate, SessionService, TollgateBuilder};

/// Everything needed to embed a session service.
pub mod prelude {
    pub use crate::{
        RequestContext, Response, SessionRequest, SessionService,
        TollgateBuilder, TollgateError,
    };
    pub use tollgate_protocol::{
        AdminSessionRequest, AuthHandler, ErrorBody, LoginRequest,
        SessionDescriptor, SessionView,
    };
    pub use tollgate_session::{
        Cookie, MemoryStore, SessionConfig, SessionError, SessionStore, User,
        UserDirectory,
    };
}
