use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use crate::meeting::MeetingMode;

#[derive(Parser, Debug)]
#[command(name = "flowmeet")]
#[command(about = "Auto-join Zoom meetings from your calendar and take notes", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Run the scheduling service (default)
    Run,
    /// Find a Zoom link in some text and print its deep-link
    Parse(ParseCliArgs),
    /// Manage meetings on the running service
    Meeting(MeetingCliArgs),
    /// Import calendar events now
    Sync,
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct ParseCliArgs {
    /// Text to scan, e.g. a calendar invite body
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(ClapArgs, Debug)]
pub struct MeetingCliArgs {
    #[command(subcommand)]
    pub command: MeetingCommand,
}

#[derive(Subcommand, Debug)]
pub enum MeetingCommand {
    /// List meetings
    List,
    /// Add a meeting by hand
    Add(AddMeetingArgs),
    /// Delete a meeting and cancel its timers
    Delete { id: String },
    /// Join a meeting now (inside its join window)
    Join { id: String },
    /// Move a meeting to a new time
    Reschedule {
        id: String,
        /// New start time (RFC 3339, e.g. 2025-11-21T15:00:00Z)
        #[arg(long)]
        start: DateTime<Utc>,
        /// New duration in minutes (keeps the current one if omitted)
        #[arg(long)]
        duration: Option<i64>,
    },
}

#[derive(ClapArgs, Debug)]
pub struct AddMeetingArgs {
    #[arg(long)]
    pub title: String,
    /// Start time (RFC 3339, e.g. 2025-11-21T15:00:00Z)
    #[arg(long)]
    pub start: DateTime<Utc>,
    /// Duration in minutes
    #[arg(long, default_value = "30")]
    pub duration: i64,
    /// Zoom join URL
    #[arg(long, conflicts_with = "meeting_id")]
    pub url: Option<String>,
    /// Zoom meeting id (9-11 digits)
    #[arg(long = "id")]
    pub meeting_id: Option<String>,
    #[arg(long, requires = "meeting_id")]
    pub passcode: Option<String>,
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModeArg {
    Transparent,
    Incognito,
}

impl From<ModeArg> for MeetingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Transparent => MeetingMode::Transparent,
            ModeArg::Incognito => MeetingMode::Incognito,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_runs_service() {
        let cli = Cli::try_parse_from(["flowmeet", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_meeting_add() {
        let cli = Cli::try_parse_from([
            "flowmeet",
            "meeting",
            "add",
            "--title",
            "Planning",
            "--start",
            "2025-11-21T15:00:00Z",
            "--id",
            "1234567890",
            "--passcode",
            "abc",
            "--mode",
            "incognito",
        ])
        .unwrap();

        let Some(CliCommand::Meeting(MeetingCliArgs {
            command: MeetingCommand::Add(args),
        })) = cli.command
        else {
            panic!("expected meeting add");
        };
        assert_eq!(args.duration, 30);
        assert_eq!(args.meeting_id.as_deref(), Some("1234567890"));
        assert!(matches!(args.mode, Some(ModeArg::Incognito)));
    }

    #[test]
    fn test_url_and_id_conflict() {
        let result = Cli::try_parse_from([
            "flowmeet",
            "meeting",
            "add",
            "--title",
            "x",
            "--start",
            "2025-11-21T15:00:00Z",
            "--url",
            "https://zoom.us/j/1234567890",
            "--id",
            "1234567890",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_start_time_rejected() {
        let result = Cli::try_parse_from([
            "flowmeet",
            "meeting",
            "reschedule",
            "abc",
            "--start",
            "tomorrow",
        ]);
        assert!(result.is_err());
    }
}
