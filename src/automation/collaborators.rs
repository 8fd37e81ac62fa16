//! Boundaries to the things that actually touch the outside world.
//!
//! The orchestrator only ever talks to these traits; shell-command backed
//! implementations live in `integrations`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::meeting::{ActionItem, MeetingNotes};

#[async_trait]
pub trait DeepLinkOpener: Send + Sync {
    /// Hand `url` to the Zoom client. Returns false if it could not be opened.
    async fn open(&self, url: &str) -> bool;
}

#[async_trait]
pub trait RecordingController: Send + Sync {
    async fn start(&self, meeting_id: Uuid) -> bool;
    /// Stop the active recording; `None` if nothing usable was captured.
    async fn stop(&self) -> Option<PathBuf>;
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, artifact: &Path) -> Result<String>;
}

#[async_trait]
pub trait NotesGenerator: Send + Sync {
    async fn generate_notes(&self, transcript: &str) -> Result<GeneratedNotes>;
}

/// Notes as returned by a generator, before they are attached to a meeting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedNotes {
    pub summary: String,
    #[serde(default)]
    pub key_takeaways: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<GeneratedActionItem>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedActionItem {
    pub task: String,
    #[serde(default)]
    pub assignee: Option<String>,
}

impl GeneratedNotes {
    pub fn into_notes(self, transcript: String, generated_at: DateTime<Utc>) -> MeetingNotes {
        MeetingNotes {
            summary: self.summary,
            key_takeaways: self.key_takeaways,
            action_items: self
                .action_items
                .into_iter()
                .map(|item| ActionItem::new(item.task, item.assignee))
                .collect(),
            full_transcript: Some(transcript),
            generated_at,
            model: self.model.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// Everything the orchestrator needs from the outside world.
pub struct Collaborators {
    pub opener: Box<dyn DeepLinkOpener>,
    pub recorder: Box<dyn RecordingController>,
    pub transcriber: Arc<dyn Transcriber>,
    pub notes: Arc<dyn NotesGenerator>,
}
