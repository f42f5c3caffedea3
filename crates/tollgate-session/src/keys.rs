//! Parsing the key list of a bulk session delete.
//!
//! The request body is loosely typed JSON (`{"keys": [...]}`), so it is
//! validated in one pass into a [`SessionKeys`] before anything is
//! deleted. A single bad element rejects the whole request.

use serde_json::Value;

use crate::SessionError;

/// The key that means "every session of this user".
pub const WILDCARD_KEY: &str = "*";

/// Which sessions a bulk delete targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionKeys {
    /// The wildcard appeared somewhere in the list. Any other ids in
    /// the same list are ignored.
    AllForUser,

    /// Explicit ids, in request order.
    Ids(Vec<String>),
}

impl SessionKeys {
    /// Builds the target set from already-typed ids, applying the
    /// wildcard rule.
    pub fn from_ids(ids: Vec<String>) -> Self {
        if ids.iter().any(|id| id == WILDCARD_KEY) {
            Self::AllForUser
        } else {
            Self::Ids(ids)
        }
    }

    /// Parses a bulk-delete body.
    ///
    /// # Errors
    /// [`SessionError::BadRequest`] if `keys` is missing, isn't an
    /// array, or contains anything other than strings.
    pub fn from_payload(payload: &Value) -> Result<Self, SessionError> {
        let bad_keys = || SessionError::BadRequest("bad or missing keys".into());

        let keys = payload
            .get("keys")
            .and_then(Value::as_array)
            .ok_or_else(bad_keys)?;

        // `collect` into `Option<Vec<_>>` stops at the first `None`, so
        // the whole list is checked before we decide anything.
        let ids = keys
            .iter()
            .map(|key| key.as_str().map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(bad_keys)?;

        Ok(Self::from_ids(ids))
    }
}

/// What a bulk delete did.
///
/// Per-item failures are discarded by policy: a bulk delete always
/// reports success once its input is valid. `discarded` counts them
/// so the leniency is visible to callers and tests rather than silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkDeletion {
    /// One delete-all-by-username was issued.
    AllForUser,

    /// Each id was deleted with an ownership check.
    Individually {
        attempted: usize,
        discarded: usize,
    },
}
