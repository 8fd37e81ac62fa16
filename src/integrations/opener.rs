use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, warn};

use crate::automation::DeepLinkOpener;

const OPEN_TIMEOUT: Duration = Duration::from_secs(15);

/// Opens deep-links with a launcher such as `open` or `xdg-open`.
///
/// The command may carry extra arguments (`open -g`); the URL is appended as
/// the last argument without going through a shell.
pub struct CommandOpener {
    program: String,
    args: Vec<String>,
}

impl CommandOpener {
    pub fn new(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
        }
    }
}

#[async_trait]
impl DeepLinkOpener for CommandOpener {
    async fn open(&self, url: &str) -> bool {
        if self.program.is_empty() {
            warn!("No open_command configured, cannot open {}", url);
            return false;
        }

        debug!("Opening {} with {}", url, self.program);
        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .status();

        match tokio::time::timeout(OPEN_TIMEOUT, status).await {
            Ok(Ok(status)) if status.success() => true,
            Ok(Ok(status)) => {
                warn!("{} exited with status {} for {}", self.program, status, url);
                false
            }
            Ok(Err(e)) => {
                warn!("Failed to run {}: {}", self.program, e);
                false
            }
            Err(_) => {
                warn!("{} did not return within {}s", self.program, OPEN_TIMEOUT.as_secs());
                false
            }
        }
    }
}
