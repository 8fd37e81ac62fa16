//! Fake collaborators shared by the integration tests.

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use flowmeet::automation::{
    Collaborators, DeepLinkOpener, GeneratedNotes, NotesGenerator, RecordingController,
    Transcriber,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 21, 9, 0, 0).unwrap()
}

#[derive(Clone, Default)]
pub struct FakeOpener {
    pub fail: Arc<AtomicBool>,
    pub opened: Arc<Mutex<Vec<String>>>,
}

impl FakeOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeepLinkOpener for FakeOpener {
    async fn open(&self, url: &str) -> bool {
        self.opened.lock().unwrap().push(url.to_string());
        !self.fail.load(Ordering::SeqCst)
    }
}

/// Single-slot recorder: a second `start` while one is active fails.
#[derive(Clone)]
pub struct FakeRecorder {
    pub started: Arc<Mutex<Vec<Uuid>>>,
    pub stops: Arc<Mutex<usize>>,
    pub active: Arc<Mutex<Option<Uuid>>>,
    pub artifact: Arc<Mutex<Option<PathBuf>>>,
    /// Name the artifact after the meeting being recorded.
    pub per_meeting: bool,
}

impl Default for FakeRecorder {
    fn default() -> Self {
        Self {
            started: Arc::default(),
            stops: Arc::default(),
            active: Arc::default(),
            artifact: Arc::new(Mutex::new(Some(PathBuf::from("/tmp/flowmeet-test.m4a")))),
            per_meeting: false,
        }
    }
}

impl FakeRecorder {
    pub fn without_artifact() -> Self {
        let recorder = Self::default();
        *recorder.artifact.lock().unwrap() = None;
        recorder
    }

    pub fn per_meeting() -> Self {
        Self {
            per_meeting: true,
            ..Self::default()
        }
    }

    pub fn started(&self) -> Vec<Uuid> {
        self.started.lock().unwrap().clone()
    }

    pub fn stops(&self) -> usize {
        *self.stops.lock().unwrap()
    }
}

#[async_trait]
impl RecordingController for FakeRecorder {
    async fn start(&self, meeting_id: Uuid) -> bool {
        let mut active = self.active.lock().unwrap();
        if active.is_some() {
            return false;
        }
        *active = Some(meeting_id);
        self.started.lock().unwrap().push(meeting_id);
        true
    }

    async fn stop(&self) -> Option<PathBuf> {
        *self.stops.lock().unwrap() += 1;
        let owner = self.active.lock().unwrap().take()?;
        let artifact = self.artifact.lock().unwrap().clone()?;
        if self.per_meeting {
            Some(PathBuf::from(format!("/rec/{}.m4a", owner)))
        } else {
            Some(artifact)
        }
    }
}

/// Transcriber that answers, fails, or hangs.
#[derive(Clone)]
pub enum FakeTranscriber {
    Text(&'static str),
    /// Transcript is the artifact path, so notes show which recording they came from.
    EchoPath,
    Fail(&'static str),
    Hang,
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, artifact: &Path) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text.to_string()),
            Self::EchoPath => Ok(artifact.display().to_string()),
            Self::Fail(message) => bail!("{}", message),
            Self::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Ok(String::new())
            }
        }
    }
}

pub struct FakeNotes;

#[async_trait]
impl NotesGenerator for FakeNotes {
    async fn generate_notes(&self, transcript: &str) -> Result<GeneratedNotes> {
        Ok(GeneratedNotes {
            summary: format!("Summary of: {}", transcript),
            key_takeaways: vec!["Ship it".to_string()],
            action_items: vec![],
            model: Some("fake".to_string()),
        })
    }
}

pub struct Fakes {
    pub opener: FakeOpener,
    pub recorder: FakeRecorder,
}

pub fn collaborators(
    recorder: FakeRecorder,
    transcriber: FakeTranscriber,
) -> (Collaborators, Fakes) {
    let opener = FakeOpener::default();
    let collaborators = Collaborators {
        opener: Box::new(opener.clone()),
        recorder: Box::new(recorder.clone()),
        transcriber: Arc::new(transcriber),
        notes: Arc::new(FakeNotes),
    };
    (collaborators, Fakes { opener, recorder })
}
