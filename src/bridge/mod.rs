//! Messages posted by the web dashboard.
//!
//! Payloads are parsed into a tagged union and validated here, before any of
//! them can reach the orchestrator.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::SettingsUpdate;
use crate::meeting::MeetingMode;

pub const MAX_JOIN_OFFSET_MINUTES: i64 = 60;
pub const MIN_SYNC_DAYS: i64 = 1;
pub const MAX_SYNC_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum DashboardMessage {
    Ready,
    UpdateSettings(SettingsPayload),
    JoinMeeting(MeetingRef),
    ShowMeetingDetail(MeetingRef),
    DeleteMeeting(MeetingRef),
    SyncCalendar,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    #[serde(default)]
    pub join_offset_minutes: Option<i64>,
    #[serde(default)]
    pub default_mode: Option<MeetingMode>,
    #[serde(default)]
    pub calendar_sync_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRef {
    pub meeting_id: String,
}

/// A dashboard message that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeRequest {
    Ready,
    UpdateSettings(SettingsUpdate),
    Join(Uuid),
    ShowDetail(Uuid),
    Delete(Uuid),
    SyncCalendar,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("malformed dashboard message: {0}")]
    Malformed(String),

    #[error("invalid meeting id '{0}'")]
    InvalidMeetingId(String),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("settings update carries no changes")]
    EmptySettings,
}

impl DashboardMessage {
    pub fn parse(value: serde_json::Value) -> Result<Self, BridgeError> {
        serde_json::from_value(value).map_err(|e| BridgeError::Malformed(e.to_string()))
    }

    pub fn validate(self) -> Result<BridgeRequest, BridgeError> {
        Ok(match self {
            Self::Ready => BridgeRequest::Ready,
            Self::SyncCalendar => BridgeRequest::SyncCalendar,
            Self::JoinMeeting(target) => BridgeRequest::Join(target.parse_id()?),
            Self::ShowMeetingDetail(target) => BridgeRequest::ShowDetail(target.parse_id()?),
            Self::DeleteMeeting(target) => BridgeRequest::Delete(target.parse_id()?),
            Self::UpdateSettings(payload) => BridgeRequest::UpdateSettings(payload.validate()?),
        })
    }
}

impl MeetingRef {
    fn parse_id(&self) -> Result<Uuid, BridgeError> {
        Uuid::parse_str(self.meeting_id.trim())
            .map_err(|_| BridgeError::InvalidMeetingId(self.meeting_id.clone()))
    }
}

impl SettingsPayload {
    fn validate(self) -> Result<SettingsUpdate, BridgeError> {
        let update = SettingsUpdate {
            join_offset_minutes: self
                .join_offset_minutes
                .map(|v| in_range("joinOffsetMinutes", v, 0, MAX_JOIN_OFFSET_MINUTES))
                .transpose()?,
            default_mode: self.default_mode,
            calendar_sync_days: self
                .calendar_sync_days
                .map(|v| in_range("calendarSyncDays", v, MIN_SYNC_DAYS, MAX_SYNC_DAYS))
                .transpose()?,
        };

        if update.is_empty() {
            return Err(BridgeError::EmptySettings);
        }
        Ok(update)
    }
}

fn in_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<u32, BridgeError> {
    if !(min..=max).contains(&value) {
        return Err(BridgeError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    u32::try_from(value).map_err(|_| BridgeError::OutOfRange {
        field,
        value,
        min,
        max,
    })
}
