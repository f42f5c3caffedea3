//! Login session lifecycle for Tollgate.
//!
//! This crate issues, looks up, and revokes short-lived, server-tracked
//! login sessions, and ties them to user records:
//!
//! 1. **Authentication**: name/password via the [`UserDirectory`], or a
//!    verified identity with optional on-demand provisioning
//! 2. **Issuance**: a [`Session`] in the [`SessionStore`] plus its
//!    [`Cookie`], or an out-of-band [`SessionDescriptor`] for admins
//! 3. **Revocation**: logout, plus ownership-checked and bulk deletes
//! 4. **Views**: [`SessionViewFormatter`] renders "who am I?"
//!
//! Storage, password hashing, and the admin gate are someone else's job;
//! they come in through the two collaborator traits and the caller.
//!
//! ```text
//! Request layer (above)  ← decodes bodies, gates admin actions
//!     ↕
//! Session layer (this crate)  ← SessionLifecycleManager
//!     ↕
//! SessionStore / UserDirectory (below)  ← your storage
//! ```
//!
//! [`SessionDescriptor`]: tollgate_protocol::SessionDescriptor

mod auth;
mod error;
mod keys;
mod manager;
mod memory;
mod principal;
mod session;
mod store;
mod view;

pub use auth::UserDirectory;
pub use error::{BoxError, SessionError};
pub use keys::{BulkDeletion, SessionKeys, WILDCARD_KEY};
pub use manager::SessionLifecycleManager;
pub use memory::MemoryStore;
pub use principal::is_valid_principal_name;
pub use session::{
    Cookie, DEFAULT_COOKIE_NAME, DEFAULT_SESSION_TTL_SECS, GUEST_USERNAME,
    IssuedSession, NewUser, Session, SessionConfig, User, tenant_path,
};
pub use store::SessionStore;
pub use view::SessionViewFormatter;
