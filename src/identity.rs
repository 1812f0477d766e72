//! Player identity.

use satama_core::UserId;

/// Resolves the player of a new session.
pub trait Identity {
    /// The signed-in player, or `None` for a guest.
    fn current_user(&self) -> Option<UserId>;
}

/// Identity fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity(Option<UserId>);

impl StaticIdentity {
    /// A signed-in player.
    pub fn user(id: impl Into<UserId>) -> Self {
        Self(Some(id.into()))
    }

    /// An anonymous player whose results are not saved.
    pub fn guest() -> Self {
        Self(None)
    }
}

impl From<Option<UserId>> for StaticIdentity {
    fn from(user: Option<UserId>) -> Self {
        Self(user)
    }
}

impl Identity for StaticIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.0.clone()
    }
}
