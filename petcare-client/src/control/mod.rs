//! Lock and position changes.
//!
//! Both follow request/confirm: the client asks the service for a new state
//! and only reports success once the service has confirmed it.

use std::fmt;

mod lock;
mod position;

pub use lock::set_mode;
pub use position::set_position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The service confirmed the new state.
    Confirmed { name: String, state: String },
    /// The request went out but the new state could not be confirmed.
    /// It may still have been applied.
    Ambiguous {
        name: String,
        state: String,
        reason: String,
    },
}

impl ControlOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ControlOutcome::Confirmed { .. })
    }
}

impl fmt::Display for ControlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlOutcome::Confirmed { name, state } => write!(f, "{} set to '{}'", name, state),
            ControlOutcome::Ambiguous {
                name,
                state,
                reason,
            } => write!(
                f,
                "setting {} to '{}' probably worked but something else is fishy: {}",
                name, state, reason
            ),
        }
    }
}
