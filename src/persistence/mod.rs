//! Meeting list persistence.
//!
//! The whole list is written after every mutation, so the format is a plain
//! JSON array with RFC 3339 timestamps that the dashboard can read as-is.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::meeting::MeetingRecord;

pub trait MeetingPersistence: Send + Sync {
    fn load_all(&self) -> Result<Vec<MeetingRecord>>;
    fn save_all(&self, meetings: &[MeetingRecord]) -> Result<()>;
}

/// `meetings.json` on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default data location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::global::meetings_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MeetingPersistence for JsonFileStore {
    fn load_all(&self) -> Result<Vec<MeetingRecord>> {
        if !self.path.exists() {
            debug!("No meetings file at {:?}, starting empty", self.path);
            return Ok(Vec::new());
        }

        let content =
            std::fs::read_to_string(&self.path).context("Failed to read meetings file")?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let meetings: Vec<MeetingRecord> = match serde_json::from_str(&content) {
            Ok(meetings) => meetings,
            Err(e) => {
                // Keep the unreadable file for inspection and start over.
                let aside = self.path.with_extension("json.corrupt");
                warn!(
                    "Meetings file {:?} is unreadable ({}), moving it to {:?}",
                    self.path, e, aside
                );
                std::fs::rename(&self.path, &aside)
                    .context("Failed to move corrupt meetings file aside")?;
                return Ok(Vec::new());
            }
        };

        info!("Loaded {} meetings from {:?}", meetings.len(), self.path);
        Ok(meetings)
    }

    fn save_all(&self, meetings: &[MeetingRecord]) -> Result<()> {
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir).context("Failed to create meetings directory")?;

        let content =
            serde_json::to_string_pretty(meetings).context("Failed to serialize meetings")?;

        // Write beside the target and rename so a crash never leaves half a file.
        let mut tmp =
            tempfile::NamedTempFile::new_in(&dir).context("Failed to create temp meetings file")?;
        tmp.write_all(content.as_bytes())
            .context("Failed to write meetings file")?;
        tmp.persist(&self.path)
            .context("Failed to replace meetings file")?;

        debug!("Saved {} meetings to {:?}", meetings.len(), self.path);
        Ok(())
    }
}

/// Keeps the list in memory only. Used when running without a data
/// directory and in tests.
#[derive(Default)]
pub struct MemoryStore {
    meetings: Mutex<Vec<MeetingRecord>>,
}

impl MemoryStore {
    pub fn with_meetings(meetings: Vec<MeetingRecord>) -> Self {
        Self {
            meetings: Mutex::new(meetings),
        }
    }
}

impl MeetingPersistence for MemoryStore {
    fn load_all(&self) -> Result<Vec<MeetingRecord>> {
        let guard = self
            .meetings
            .lock()
            .map_err(|_| anyhow::anyhow!("meeting store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save_all(&self, meetings: &[MeetingRecord]) -> Result<()> {
        let mut guard = self
            .meetings
            .lock()
            .map_err(|_| anyhow::anyhow!("meeting store lock poisoned"))?;
        *guard = meetings.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::{
        ActionItem, MeetingMode, MeetingNotes, MeetingSource, MeetingStatus,
    };
    use crate::zoom::ZoomReference;
    use chrono::{TimeZone, Utc};

    fn sample_meetings() -> Vec<MeetingRecord> {
        let now = Utc.with_ymd_and_hms(2025, 11, 21, 9, 0, 0).unwrap();

        let bare = MeetingRecord::new(
            "Bare",
            now,
            3600,
            None,
            MeetingSource::Manual,
            MeetingMode::Transparent,
            now,
        );

        let mut full = MeetingRecord::new(
            "Full",
            Utc.with_ymd_and_hms(2025, 11, 21, 10, 30, 15).unwrap()
                + chrono::Duration::milliseconds(250),
            1800,
            Some(ZoomReference::MeetingId {
                meeting_id: "1234567890".to_string(),
                passcode: Some("pw".to_string()),
            }),
            MeetingSource::GoogleCalendar,
            MeetingMode::Incognito,
            now,
        )
        .with_calendar_id("evt-42");
        full.status = MeetingStatus::Ready;
        full.recording_path = Some("/tmp/rec.m4a".to_string());
        full.notes = Some(MeetingNotes {
            summary: "Shipped it".to_string(),
            key_takeaways: vec!["one".to_string()],
            action_items: vec![ActionItem::new("Write docs", Some("Sam".to_string()))],
            full_transcript: Some("hello".to_string()),
            generated_at: now,
            model: "gpt-4".to_string(),
        });

        vec![bare, full]
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("meetings.json"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("meetings.json"));
        let meetings = sample_meetings();

        store.save_all(&meetings).unwrap();
        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, meetings);

        // Saving what was loaded changes nothing.
        store.save_all(&loaded).unwrap();
        assert_eq!(store.load_all().unwrap(), meetings);
    }

    #[test]
    fn test_dates_are_iso8601() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("meetings.json"));
        store.save_all(&sample_meetings()).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"startTime\": \"2025-11-21T09:00:00Z\""));
    }

    #[test]
    fn test_corrupt_file_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meetings.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load_all().unwrap().is_empty());
        assert!(!path.exists());

        let aside = dir.path().join("meetings.json.corrupt");
        assert_eq!(std::fs::read_to_string(aside).unwrap(), "{not json");

        let meetings = sample_meetings();
        store.save_all(&meetings).unwrap();
        assert_eq!(store.load_all().unwrap(), meetings);
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::default();
        let meetings = sample_meetings();
        store.save_all(&meetings).unwrap();
        assert_eq!(store.load_all().unwrap(), meetings);
    }
}
