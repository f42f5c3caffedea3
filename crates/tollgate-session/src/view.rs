//! Projects a user into the `_session` response body.

use std::borrow::Cow;

use tollgate_protocol::{AuthHandler, ChannelSet, SessionView, UserContext};

use crate::User;

/// Stands in for the channel set of an absent user.
static NO_CHANNELS: ChannelSet = ChannelSet::new();

/// Builds [`SessionView`]s.
///
/// Which optional mechanisms to advertise is tenant configuration,
/// handed in at construction; the formatter doesn't look anything up.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionViewFormatter {
    persona_enabled: bool,
}

impl SessionViewFormatter {
    pub fn new(persona_enabled: bool) -> Self {
        Self { persona_enabled }
    }

    /// Formats the view for `user`, or the anonymous view for `None`.
    ///
    /// The channel set is borrowed from `user`, not copied: the view is
    /// a read-only snapshot of the user as it is right now.
    pub fn format<'a>(&self, user: Option<&'a User>) -> SessionView<'a> {
        let (name, channels) = match user {
            Some(user) => (
                (!user.is_anonymous()).then(|| user.name.clone()),
                &user.channels,
            ),
            None => (None, &NO_CHANNELS),
        };

        SessionView {
            ok: true,
            user_ctx: UserContext {
                name,
                channels: Cow::Borrowed(channels),
            },
            authentication_handlers: self.authentication_handlers(),
        }
    }

    fn authentication_handlers(&self) -> Vec<AuthHandler> {
        let mut handlers = vec![AuthHandler::Default, AuthHandler::Cookie];
        if self.persona_enabled {
            handlers.push(AuthHandler::Persona);
        }
        handlers
    }
}
