use anyhow::Result;
use clap::Parser;
use flowmeet::{
    app,
    cli::{handle_meeting_command, handle_parse_command, handle_sync_command, Cli, CliCommand},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(CliCommand::Version) => {
            println!("FlowMeet {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(CliCommand::Parse(args)) => {
            handle_parse_command(args)?;
            return Ok(());
        }
        Some(CliCommand::Meeting(args)) => {
            handle_meeting_command(args).await?;
            return Ok(());
        }
        Some(CliCommand::Sync) => {
            handle_sync_command().await?;
            return Ok(());
        }
        Some(CliCommand::Run) | None => {}
    }

    app::run_service().await
}
