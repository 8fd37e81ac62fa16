//! The meeting entity and the notes attached to it once processed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{MeetingStatus, TransitionError};
use crate::zoom::ZoomReference;

/// Where a meeting came from. Drives calendar re-sync dedup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeetingSource {
    AppleCalendar,
    GoogleCalendar,
    Manual,
}

impl MeetingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppleCalendar => "appleCalendar",
            Self::GoogleCalendar => "googleCalendar",
            Self::Manual => "manual",
        }
    }

    pub fn is_calendar(&self) -> bool {
        !matches!(self, Self::Manual)
    }
}

/// Participant-notification policy for AI note-taking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeetingMode {
    #[default]
    Transparent,
    Incognito,
}

impl MeetingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transparent => "transparent",
            Self::Incognito => "incognito",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Transparent => "AI note-taking with participant notification.",
            Self::Incognito => "Private AI note-taking. Does not notify participants.",
        }
    }

    /// Text to post in the meeting chat when participants should be told.
    pub fn disclosure(&self) -> Option<&'static str> {
        match self {
            Self::Transparent => Some(
                "This meeting is being recorded with AI-powered note-taking for internal use. \
                 Automated transcription and summary will be generated.",
            ),
            Self::Incognito => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub id: Uuid,
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
}

impl ActionItem {
    pub fn new(task: impl Into<String>, assignee: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task: task.into(),
            assignee,
            due_date: None,
            completed: false,
        }
    }
}

/// AI notes generated from a meeting transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingNotes {
    pub summary: String,
    #[serde(default)]
    pub key_takeaways: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_transcript: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub model: String,
}

/// One meeting occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRecord {
    pub id: Uuid,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub duration_seconds: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<ZoomReference>,
    pub source: MeetingSource,
    #[serde(default)]
    pub mode: MeetingMode,
    #[serde(default)]
    pub status: MeetingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<MeetingNotes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MeetingRecord {
    pub fn new(
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        duration_seconds: i64,
        zoom: Option<ZoomReference>,
        source: MeetingSource,
        mode: MeetingMode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            start_time,
            duration_seconds,
            zoom,
            source,
            mode,
            status: MeetingStatus::NotStarted,
            calendar_external_id: None,
            notes: None,
            recording_path: None,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_calendar_id(mut self, external_id: impl Into<String>) -> Self {
        self.calendar_external_id = Some(external_id.into());
        self
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::seconds(self.duration_seconds)
    }

    /// When auto-join should fire for the given offset.
    pub fn join_time(&self, offset_minutes: u32) -> DateTime<Utc> {
        self.start_time - Duration::minutes(i64::from(offset_minutes))
    }

    /// A URL or a non-empty meeting id is required before anything is scheduled.
    pub fn has_zoom_info(&self) -> bool {
        self.zoom.as_ref().is_some_and(ZoomReference::is_joinable)
    }

    pub fn join_url(&self) -> Option<String> {
        self.zoom.as_ref().and_then(ZoomReference::join_url)
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.end_time() > now
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time()
    }

    /// Between `start - offset` and the scheduled end, inclusive.
    pub fn in_join_window(&self, now: DateTime<Utc>, offset_minutes: u32) -> bool {
        now >= self.join_time(offset_minutes) && now <= self.end_time()
    }

    /// Move forward along the state machine, returning the previous status.
    pub fn advance(
        &mut self,
        next: MeetingStatus,
        now: DateTime<Utc>,
    ) -> Result<MeetingStatus, TransitionError> {
        self.status.check_advance(next)?;
        let previous = self.status;
        self.status = next;
        self.updated_at = now;
        Ok(previous)
    }

    /// Record a failure and move to `failed`. Allowed from any non-terminal
    /// state after the join has happened; the error is kept for display.
    pub fn fail(
        &mut self,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<MeetingStatus, TransitionError> {
        let previous = self.status;
        if previous == MeetingStatus::InProgress {
            self.advance(MeetingStatus::Processing, now)?;
        }
        self.advance(MeetingStatus::Failed, now)?;
        self.last_error = Some(message.into());
        Ok(previous)
    }

    /// Explicit reschedule: new time, status back to `notStarted`, prior
    /// outcome cleared.
    pub fn reschedule(
        &mut self,
        start_time: DateTime<Utc>,
        duration_seconds: i64,
        now: DateTime<Utc>,
    ) -> Result<MeetingStatus, TransitionError> {
        if !self.status.accepts_reschedule() {
            return Err(TransitionError {
                from: self.status,
                to: MeetingStatus::NotStarted,
            });
        }
        let previous = self.status;
        self.start_time = start_time;
        self.duration_seconds = duration_seconds;
        self.status = MeetingStatus::NotStarted;
        self.notes = None;
        self.recording_path = None;
        self.last_error = None;
        self.updated_at = now;
        Ok(previous)
    }
}
