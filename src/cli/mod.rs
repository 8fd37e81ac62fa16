pub mod args;
pub mod meeting;
pub mod parse;

pub use args::{Cli, CliCommand};
pub use meeting::{handle_meeting_command, handle_sync_command};
pub use parse::handle_parse_command;
