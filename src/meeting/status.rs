//! Meeting status state machine.
//!
//! notStarted → inProgress → processing → {ready | failed}
//!
//! The only way back to `notStarted` is an explicit reschedule.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of a single meeting occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeetingStatus {
    #[default]
    NotStarted,
    InProgress,
    Processing,
    Ready,
    Failed,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "notStarted",
            Self::InProgress => "inProgress",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Processing => "Processing",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
        }
    }

    /// `ready` and `failed` see no further automatic transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    /// Forward edges of the state machine. Reschedule is not a forward edge.
    pub fn can_advance_to(&self, next: MeetingStatus) -> bool {
        use MeetingStatus::*;
        matches!(
            (*self, next),
            (NotStarted, InProgress)
                | (InProgress, Processing)
                | (Processing, Ready)
                | (Processing, Failed)
        )
    }

    /// A meeting whose recording is live or being processed cannot be moved.
    pub fn accepts_reschedule(&self) -> bool {
        !matches!(self, Self::InProgress | Self::Processing)
    }

    pub fn check_advance(&self, next: MeetingStatus) -> Result<(), TransitionError> {
        if self.can_advance_to(next) {
            Ok(())
        } else {
            Err(TransitionError {
                from: *self,
                to: next,
            })
        }
    }
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move meeting from {from} to {to}")]
pub struct TransitionError {
    pub from: MeetingStatus,
    pub to: MeetingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use MeetingStatus::*;

    const ALL: [MeetingStatus; 5] = [NotStarted, InProgress, Processing, Ready, Failed];

    #[test]
    fn test_status_as_str() {
        assert_eq!(NotStarted.as_str(), "notStarted");
        assert_eq!(InProgress.as_str(), "inProgress");
        assert_eq!(Processing.as_str(), "processing");
        assert_eq!(Ready.as_str(), "ready");
        assert_eq!(Failed.as_str(), "failed");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&InProgress).unwrap();
        assert_eq!(json, "\"inProgress\"");

        let parsed: MeetingStatus = serde_json::from_str("\"notStarted\"").unwrap();
        assert_eq!(parsed, NotStarted);
    }

    #[test]
    fn test_forward_edges_only() {
        let allowed = [
            (NotStarted, InProgress),
            (InProgress, Processing),
            (Processing, Ready),
            (Processing, Failed),
        ];

        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_advance_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_cannot_skip_in_progress() {
        assert!(NotStarted.check_advance(Processing).is_err());
        assert!(NotStarted.check_advance(Ready).is_err());
        assert!(NotStarted.check_advance(Failed).is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(Ready.is_terminal());
        assert!(Failed.is_terminal());
        for status in [NotStarted, InProgress, Processing] {
            assert!(!status.is_terminal());
        }
        for to in ALL {
            assert!(!Ready.can_advance_to(to));
            assert!(!Failed.can_advance_to(to));
        }
    }

    #[test]
    fn test_reschedule_policy() {
        assert!(NotStarted.accepts_reschedule());
        assert!(Ready.accepts_reschedule());
        assert!(Failed.accepts_reschedule());
        assert!(!InProgress.accepts_reschedule());
        assert!(!Processing.accepts_reschedule());
    }

    #[test]
    fn test_transition_error_message() {
        let err = Ready.check_advance(InProgress).unwrap_err();
        assert_eq!(err.to_string(), "cannot move meeting from ready to inProgress");
    }
}
