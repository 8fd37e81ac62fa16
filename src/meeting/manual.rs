//! Manual meeting entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{MeetingMode, MeetingRecord, MeetingSource};
use crate::zoom::{manual_reference, ValidationError};

/// Form input for a meeting the user adds by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualMeetingInput {
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub zoom_url: Option<String>,
    #[serde(default)]
    pub meeting_id: Option<String>,
    #[serde(default)]
    pub passcode: Option<String>,
    #[serde(default)]
    pub mode: Option<MeetingMode>,
}

impl ManualMeetingInput {
    /// Validate and turn the form into a record. `default_mode` applies when
    /// the form did not pick one.
    pub fn into_record(
        self,
        default_mode: MeetingMode,
        now: DateTime<Utc>,
    ) -> Result<MeetingRecord, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.duration_minutes <= 0 {
            return Err(ValidationError::InvalidDuration);
        }

        let reference = manual_reference(
            self.zoom_url.as_deref(),
            self.meeting_id.as_deref(),
            self.passcode.as_deref(),
        )?;

        Ok(MeetingRecord::new(
            title,
            self.start_time,
            self.duration_minutes * 60,
            Some(reference),
            MeetingSource::Manual,
            self.mode.unwrap_or(default_mode),
            now,
        ))
    }
}
