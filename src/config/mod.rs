use crate::global;
use crate::meeting::MeetingMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduling: SchedulingConfig,
    pub calendar: CalendarConfig,
    pub meetings: MeetingsConfig,
    pub integrations: IntegrationsConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Minutes before start at which auto-join fires
    pub join_offset_minutes: u32,
    /// Wait after opening Zoom before recording starts, so the client can connect
    pub recording_grace_seconds: u64,
    /// Upper bound for transcription + notes; exceeding it fails the meeting
    pub processing_timeout_seconds: u64,
    /// Minutes before start for the upcoming-meeting reminder (0 disables)
    pub reminder_minutes: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            join_offset_minutes: 1,
            recording_grace_seconds: 8,
            processing_timeout_seconds: 3600,
            reminder_minutes: 5,
        }
    }
}

impl SchedulingConfig {
    pub fn recording_grace(&self) -> Duration {
        Duration::from_secs(self.recording_grace_seconds)
    }

    pub fn processing_timeout(&self) -> Duration {
        Duration::from_secs(self.processing_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub enabled: bool,
    /// How many days ahead to import
    pub sync_days: u32,
    /// Background re-sync interval (0 disables periodic sync)
    pub sync_interval_minutes: u64,
    /// JSON export of calendar events to import from
    pub events_file: Option<PathBuf>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sync_days: 7,
            sync_interval_minutes: 15,
            events_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingsConfig {
    pub default_mode: MeetingMode,
}

/// Shell commands backing the external collaborators.
///
/// `record_command` receives FLOWMEET_OUTPUT_PATH and FLOWMEET_MEETING_ID and
/// is stopped when the meeting ends. `transcribe_command` receives
/// FLOWMEET_AUDIO_PATH and prints the transcript. `notes_command` reads the
/// transcript on stdin and prints notes JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    pub open_command: String,
    pub record_command: String,
    pub transcribe_command: String,
    pub notes_command: String,
    pub command_timeout_seconds: u64,
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        let open_command = if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };

        Self {
            open_command: open_command.to_string(),
            record_command: String::new(),
            transcribe_command: String::new(),
            notes_command: String::new(),
            command_timeout_seconds: 1800,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 3838 }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}

/// Partial settings change coming from the dashboard. Unset fields are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub join_offset_minutes: Option<u32>,
    pub default_mode: Option<MeetingMode>,
    pub calendar_sync_days: Option<u32>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to `config`, returning whether anything changed.
    pub fn apply_to(&self, config: &mut Config) -> bool {
        let before = (
            config.scheduling.join_offset_minutes,
            config.meetings.default_mode,
            config.calendar.sync_days,
        );

        if let Some(offset) = self.join_offset_minutes {
            config.scheduling.join_offset_minutes = offset;
        }
        if let Some(mode) = self.default_mode {
            config.meetings.default_mode = mode;
        }
        if let Some(days) = self.calendar_sync_days {
            config.calendar.sync_days = days;
        }

        before
            != (
                config.scheduling.join_offset_minutes,
                config.meetings.default_mode,
                config.calendar.sync_days,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scheduling.join_offset_minutes, 1);
        assert_eq!(config.scheduling.recording_grace(), Duration::from_secs(8));
        assert_eq!(config.scheduling.reminder_minutes, 5);
        assert_eq!(config.calendar.sync_days, 7);
        assert_eq!(config.meetings.default_mode, MeetingMode::Transparent);
        assert_eq!(config.api.port, 3838);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [scheduling]
            join_offset_minutes = 3

            [meetings]
            default_mode = "incognito"
            "#,
        )
        .unwrap();

        assert_eq!(config.scheduling.join_offset_minutes, 3);
        assert_eq!(config.scheduling.processing_timeout_seconds, 3600);
        assert_eq!(config.meetings.default_mode, MeetingMode::Incognito);
        assert!(config.calendar.enabled);
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.api.port, 3838);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.scheduling.join_offset_minutes, 1);
    }

    #[test]
    fn test_settings_update() {
        let mut config = Config::default();
        assert!(!SettingsUpdate::default().apply_to(&mut config));
        assert!(SettingsUpdate::default().is_empty());

        let update = SettingsUpdate {
            join_offset_minutes: Some(5),
            default_mode: None,
            calendar_sync_days: Some(14),
        };
        assert!(update.apply_to(&mut config));
        assert_eq!(config.scheduling.join_offset_minutes, 5);
        assert_eq!(config.calendar.sync_days, 14);
        assert_eq!(config.meetings.default_mode, MeetingMode::Transparent);

        // Same values again is not a change.
        assert!(!update.apply_to(&mut config));
    }

    #[test]
    fn test_round_trip_toml() {
        let mut config = Config::default();
        config.calendar.events_file = Some(PathBuf::from("/tmp/events.json"));
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.calendar.events_file, config.calendar.events_file);
        assert_eq!(parsed.integrations.open_command, config.integrations.open_command);
    }
}
