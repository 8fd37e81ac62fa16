use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Child;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::command_env;
use crate::automation::RecordingController;

/// How long a recorder gets to finalize its file after SIGINT.
const STOP_GRACE: Duration = Duration::from_secs(10);

struct ActiveRecording {
    meeting_id: Uuid,
    child: Child,
    output_path: PathBuf,
}

/// Records by running a long-lived shell command (ffmpeg, sox, ...).
///
/// The command gets FLOWMEET_OUTPUT_PATH and FLOWMEET_MEETING_ID and is
/// expected to write audio to the output path until interrupted.
pub struct ShellRecorder {
    command: String,
    recordings_dir: PathBuf,
    active: Mutex<Option<ActiveRecording>>,
}

impl ShellRecorder {
    pub fn new(command: String, recordings_dir: PathBuf) -> Self {
        Self {
            command,
            recordings_dir,
            active: Mutex::new(None),
        }
    }

    fn output_path(&self, meeting_id: Uuid) -> PathBuf {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
        self.recordings_dir
            .join(format!("{}-{}.m4a", meeting_id, stamp))
    }
}

#[async_trait]
impl RecordingController for ShellRecorder {
    async fn start(&self, meeting_id: Uuid) -> bool {
        if self.command.trim().is_empty() {
            warn!("No record_command configured, not recording {}", meeting_id);
            return false;
        }

        let mut active = self.active.lock().await;
        if let Some(current) = active.as_ref() {
            warn!(
                "Already recording meeting {}, not starting {}",
                current.meeting_id, meeting_id
            );
            return false;
        }

        if let Err(e) = std::fs::create_dir_all(&self.recordings_dir) {
            warn!("Failed to create {:?}: {}", self.recordings_dir, e);
            return false;
        }

        let output_path = self.output_path(meeting_id);
        let spawned = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env(command_env::OUTPUT_PATH, &output_path)
            .env(command_env::MEETING_ID, meeting_id.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => {
                info!("Recorder started for {} -> {:?}", meeting_id, output_path);
                *active = Some(ActiveRecording {
                    meeting_id,
                    child,
                    output_path,
                });
                true
            }
            Err(e) => {
                warn!("Failed to start recorder: {}", e);
                false
            }
        }
    }

    async fn stop(&self) -> Option<PathBuf> {
        let ActiveRecording {
            meeting_id,
            mut child,
            output_path,
        } = self.active.lock().await.take()?;

        interrupt(&mut child).await;

        match tokio::time::timeout(STOP_GRACE, child.wait()).await {
            Ok(Ok(status)) => debug!("Recorder for {} exited with {}", meeting_id, status),
            Ok(Err(e)) => warn!("Failed to wait for recorder: {}", e),
            Err(_) => {
                warn!(
                    "Recorder for {} ignored interrupt for {}s, killing it",
                    meeting_id,
                    STOP_GRACE.as_secs()
                );
                let _ = child.kill().await;
            }
        }

        match tokio::fs::metadata(&output_path).await {
            Ok(meta) if meta.len() > 0 => {
                info!(
                    "Recording for {} saved: {:?} ({} bytes)",
                    meeting_id,
                    output_path,
                    meta.len()
                );
                Some(output_path)
            }
            _ => {
                warn!("Recorder for {} produced no audio", meeting_id);
                None
            }
        }
    }
}

/// Ask the recorder to finish its file. Recorders finalize on SIGINT the
/// same way they do on Ctrl-C.
async fn interrupt(child: &mut Child) {
    let Some(pid) = child.id() else {
        return;
    };

    let sent = tokio::process::Command::new("kill")
        .arg("-INT")
        .arg(pid.to_string())
        .status()
        .await;

    if !matches!(sent, Ok(status) if status.success()) {
        let _ = child.start_kill();
    }
}
