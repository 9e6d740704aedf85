//! Reply-target latch for outbound messages

use std::fmt;

/// Wildcard target used before first contact
pub const ANY_ORIGIN: &str = "*";

/// Origin that outbound events are addressed to.
///
/// Starts as [`TrustedOrigin::Any`] and locks to the first external sender.
/// Once locked it never changes again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TrustedOrigin {
    #[default]
    Any,
    Locked(String),
}

impl TrustedOrigin {
    /// Lock to `origin` if still unlocked. Returns true on the transition.
    pub fn lock(&mut self, origin: &str) -> bool {
        match self {
            TrustedOrigin::Any => {
                *self = TrustedOrigin::Locked(origin.to_string());
                true
            }
            TrustedOrigin::Locked(_) => false,
        }
    }

    /// Target origin string for the channel
    pub fn target(&self) -> &str {
        match self {
            TrustedOrigin::Any => ANY_ORIGIN,
            TrustedOrigin::Locked(origin) => origin,
        }
    }
}

impl fmt::Display for TrustedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target())
    }
}
