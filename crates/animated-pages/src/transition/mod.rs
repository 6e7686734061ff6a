//! Transitions
//!
//! A [`Transition`] wraps one asynchronous start operation and guarantees
//! that its stop callback runs exactly once, whether the operation settles
//! on its own, is canceled while running or is skipped before it ever
//! started. The [`TransitionQueue`] runs at most one transition at a time and
//! keeps at most one waiting behind it.

mod completion;
mod queue;
#[allow(clippy::module_inception)]
mod transition;

pub use completion::Completion;
pub use queue::TransitionQueue;
pub use transition::{StartFn, StopFn, Transition, TransitionCallbacks};

use serde::{Deserialize, Serialize};

/// Where a stopped transition leaves the view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Revert to the state before the transition
    Start,
    /// Commit to the target state
    #[default]
    End,
}

impl Disposition {
    /// Map a `revert` flag onto a disposition
    #[inline]
    pub fn from_revert(revert: bool) -> Self {
        if revert {
            Self::Start
        } else {
            Self::End
        }
    }

    #[inline]
    pub fn is_revert(self) -> bool {
        self == Self::Start
    }
}

/// How a transition ended, handed to its stop callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stop {
    /// Stopped before it was started
    Skipped,
    /// Started, then either settled or got canceled
    Completed {
        canceled: bool,
        disposition: Disposition,
    },
}

impl Stop {
    #[inline]
    pub fn started(self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// `None` for skipped transitions
    #[inline]
    pub fn canceled(self) -> Option<bool> {
        match self {
            Self::Skipped => None,
            Self::Completed { canceled, .. } => Some(canceled),
        }
    }

    /// `None` for skipped transitions
    #[inline]
    pub fn disposition(self) -> Option<Disposition> {
        match self {
            Self::Skipped => None,
            Self::Completed { disposition, .. } => Some(disposition),
        }
    }
}

/// Transition lifecycle, only ever moves forward
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionState {
    #[default]
    Ready,
    Running,
    Stopped,
}
