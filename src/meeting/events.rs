//! Change notifications for UI observers.

use serde::Serialize;
use uuid::Uuid;

use super::record::MeetingRecord;
use super::status::MeetingStatus;

/// Emitted after every mutation so a UI layer can re-render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum MeetingEvent {
    #[serde(rename_all = "camelCase")]
    RecordsChanged { count: usize },
    #[serde(rename_all = "camelCase")]
    StatusChanged {
        meeting_id: Uuid,
        from: MeetingStatus,
        to: MeetingStatus,
    },
    /// A meeting starts soon. Transparent meetings should prompt the user to
    /// post the disclosure.
    Reminder { meeting: Box<MeetingRecord> },
    /// The deep-link could not be opened; the user can retry by hand.
    #[serde(rename_all = "camelCase")]
    JoinFailed { meeting_id: Uuid, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let id = Uuid::nil();
        let event = MeetingEvent::StatusChanged {
            meeting_id: id,
            from: MeetingStatus::NotStarted,
            to: MeetingStatus::InProgress,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "statusChanged");
        assert_eq!(json["payload"]["meetingId"], id.to_string());
        assert_eq!(json["payload"]["to"], "inProgress");
    }
}
