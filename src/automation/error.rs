use thiserror::Error;
use uuid::Uuid;

use crate::meeting::TransitionError;
use crate::zoom::ValidationError;

/// Failures reported back to whoever asked the orchestrator for something.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("meeting {0} not found")]
    NotFound(Uuid),

    #[error("meeting '{0}' has no Zoom link or meeting id")]
    NotSchedulable(String),

    #[error("meeting '{0}' is outside its join window")]
    OutsideJoinWindow(String),

    #[error("could not open Zoom for '{0}'")]
    JoinFailed(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("no calendar source configured")]
    CalendarUnavailable,

    #[error("calendar sync failed: {0}")]
    Calendar(String),

    #[error("automation loop is not running")]
    Closed,
}

impl AutomationError {
    /// Whether the caller asked for something that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the request was rejected because of its input or the
    /// meeting's current state, as opposed to an external failure.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            Self::NotSchedulable(_)
                | Self::OutsideJoinWindow(_)
                | Self::Transition(_)
                | Self::Invalid(_)
        )
    }
}
