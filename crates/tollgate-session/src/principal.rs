//! Principal-name rules for administratively issued sessions.

use std::sync::LazyLock;

use regex::Regex;

use crate::{GUEST_USERNAME, SessionError};

/// Letters, digits, underscore, and `- + . @`. ASCII only, so emails
/// work as names but nothing that needs escaping in a URL path does.
static VALID_PRINCIPAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+.@0-9A-Za-z_]*$").expect("principal name pattern compiles")
});

/// Returns `true` if `name` only uses characters allowed in a
/// principal name. The empty string passes; callers that need a name
/// check for that separately.
pub fn is_valid_principal_name(name: &str) -> bool {
    VALID_PRINCIPAL_NAME.is_match(name)
}

/// Rejects names a session can't be issued for: empty, the reserved
/// guest identity, or syntactically invalid.
pub(crate) fn validate_session_principal(name: &str) -> Result<(), SessionError> {
    if name.is_empty() || name == GUEST_USERNAME || !is_valid_principal_name(name) {
        return Err(SessionError::BadRequest(
            "invalid or missing user name".into(),
        ));
    }
    Ok(())
}
