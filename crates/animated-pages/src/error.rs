//! Error types for page switching

use thiserror::Error;

/// Errors that can surface from the page container and switcher
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PagesError {
    /// Malformed selection request (missing template name, wrong id type, ...)
    #[error("invalid page definition: {0}")]
    InvalidPageDefinition(String),

    /// No template has been registered under this name
    #[error("unknown template `{0}`")]
    UnknownTemplate(String),

    /// Transition protocol violation
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl PagesError {
    /// Create an invalid page definition error.
    pub fn invalid_definition(msg: impl Into<String>) -> Self {
        Self::InvalidPageDefinition(msg.into())
    }
}

/// Transition state machine violations
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// `start()` was called on a transition that already left `Ready`
    #[error("transition can only be started once")]
    AlreadyStarted,

    /// `stop()` was called on a transition that is already stopped
    #[error("transition is already stopped")]
    AlreadyStopped,

    /// The transition was dropped before it ever stopped
    #[error("transition was dropped before it completed")]
    Abandoned,
}

/// Result alias for page operations
pub type PagesResult<T> = Result<T, PagesError>;
