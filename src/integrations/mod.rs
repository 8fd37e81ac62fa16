//! Shell-command implementations of the automation collaborators.
//!
//! Every command runs through `sh -c` with meeting data in environment
//! variables, is killed when it outlives its timeout, and never takes the
//! service down with it.

pub mod opener;
pub mod processing;
pub mod recorder;

use anyhow::{bail, Context, Result};
use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::automation::Collaborators;
use crate::config::IntegrationsConfig;

pub use opener::CommandOpener;
pub use processing::{ShellNotesGenerator, ShellTranscriber};
pub use recorder::ShellRecorder;

/// Environment variable names passed to integration commands.
pub mod command_env {
    pub const MEETING_ID: &str = "FLOWMEET_MEETING_ID";
    pub const OUTPUT_PATH: &str = "FLOWMEET_OUTPUT_PATH";
    pub const AUDIO_PATH: &str = "FLOWMEET_AUDIO_PATH";
}

/// Build the collaborators described by `[integrations]`.
pub fn shell_collaborators(config: &IntegrationsConfig) -> Result<Collaborators> {
    let timeout = config.command_timeout_seconds;
    Ok(Collaborators {
        opener: Box::new(CommandOpener::new(&config.open_command)),
        recorder: Box::new(ShellRecorder::new(
            config.record_command.clone(),
            crate::global::recordings_dir()?,
        )),
        transcriber: Arc::new(ShellTranscriber::new(
            config.transcribe_command.clone(),
            timeout,
        )),
        notes: Arc::new(ShellNotesGenerator::new(config.notes_command.clone(), timeout)),
    })
}

/// Run `command` through `sh -c`, optionally feeding `stdin`, and collect its
/// output. Fails on spawn errors, timeouts and non-zero exits.
async fn run_shell(
    command: &str,
    envs: &[(&str, String)],
    stdin: Option<&str>,
    timeout: Duration,
) -> Result<Output> {
    let mut child = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to run '{}'", command))?;

    if let (Some(text), Some(mut pipe)) = (stdin, child.stdin.take()) {
        // A command that ignores stdin may close it early; that is not an error.
        let _ = pipe.write_all(text.as_bytes()).await;
    }

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.with_context(|| format!("Failed to wait for '{}'", command))?,
        Err(_) => bail!("'{}' timed out after {}s", command, timeout.as_secs()),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "'{}' exited with status {}: {}",
            command,
            output.status,
            stderr.trim()
        );
    }

    Ok(output)
}
