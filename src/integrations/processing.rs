use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use super::{command_env, run_shell};
use crate::automation::{GeneratedNotes, NotesGenerator, Transcriber};

/// Runs `transcribe_command` with FLOWMEET_AUDIO_PATH; stdout is the transcript.
pub struct ShellTranscriber {
    command: String,
    timeout: Duration,
}

impl ShellTranscriber {
    pub fn new(command: String, timeout_seconds: u64) -> Self {
        Self {
            command,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}

#[async_trait]
impl Transcriber for ShellTranscriber {
    async fn transcribe(&self, artifact: &Path) -> Result<String> {
        if self.command.trim().is_empty() {
            bail!("No transcribe_command configured");
        }

        info!("Transcribing {:?}", artifact);
        let output = run_shell(
            &self.command,
            &[(
                command_env::AUDIO_PATH,
                artifact.to_string_lossy().to_string(),
            )],
            None,
            self.timeout,
        )
        .await?;

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Pipes the transcript into `notes_command` and parses the JSON it prints.
pub struct ShellNotesGenerator {
    command: String,
    timeout: Duration,
}

impl ShellNotesGenerator {
    pub fn new(command: String, timeout_seconds: u64) -> Self {
        Self {
            command,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}

#[async_trait]
impl NotesGenerator for ShellNotesGenerator {
    async fn generate_notes(&self, transcript: &str) -> Result<GeneratedNotes> {
        if self.command.trim().is_empty() {
            bail!("No notes_command configured");
        }

        let output = run_shell(&self.command, &[], Some(transcript), self.timeout).await?;
        let notes: GeneratedNotes = serde_json::from_slice(&output.stdout)
            .context("notes_command did not print valid notes JSON")?;

        info!(
            "Generated notes: {} takeaways, {} action items",
            notes.key_takeaways.len(),
            notes.action_items.len()
        );
        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transcriber_reads_stdout() {
        let transcriber =
            ShellTranscriber::new("echo \"heard $FLOWMEET_AUDIO_PATH\"".to_string(), 10);
        let text = transcriber
            .transcribe(Path::new("/tmp/meeting.m4a"))
            .await
            .unwrap();
        assert_eq!(text, "heard /tmp/meeting.m4a");
    }

    #[tokio::test]
    async fn test_unconfigured_commands_fail() {
        assert!(ShellTranscriber::new(String::new(), 10)
            .transcribe(Path::new("/tmp/a.m4a"))
            .await
            .is_err());
        assert!(ShellNotesGenerator::new("  ".to_string(), 10)
            .generate_notes("text")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_notes_generator_parses_json() {
        let generator = ShellNotesGenerator::new(
            r#"read line; printf '{"summary":"%s","keyTakeaways":["a"],"model":"local"}' "$line""#
                .to_string(),
            10,
        );
        let notes = generator.generate_notes("We shipped it\n").await.unwrap();
        assert_eq!(notes.summary, "We shipped it");
        assert_eq!(notes.key_takeaways, vec!["a".to_string()]);
        assert_eq!(notes.model.as_deref(), Some("local"));
    }

    #[tokio::test]
    async fn test_notes_generator_rejects_plain_text() {
        let generator = ShellNotesGenerator::new("echo just words".to_string(), 10);
        assert!(generator.generate_notes("text").await.is_err());
    }
}
