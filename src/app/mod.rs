use crate::api::ApiServer;
use crate::automation::{AutomationError, AutomationHandle, AutomationOrchestrator};
use crate::calendar::JsonCalendarSource;
use crate::config::Config;
use crate::integrations::shell_collaborators;
use crate::persistence::JsonFileStore;
use crate::scheduler::{SharedClock, SystemClock};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub async fn run_service() -> Result<()> {
    info!("Starting FlowMeet service");

    let config = Config::load()?;
    let clock: SharedClock = Arc::new(SystemClock);

    let store = JsonFileStore::open_default()?;
    info!("Meetings stored at {:?}", store.path());

    let collaborators = shell_collaborators(&config.integrations)?;
    let mut orchestrator = AutomationOrchestrator::new(
        Box::new(store),
        collaborators,
        Arc::clone(&clock),
        config.clone(),
    )?
    .with_config_path(Config::config_path()?);

    let calendar_ready = match (&config.calendar.events_file, config.calendar.enabled) {
        (Some(path), true) => {
            info!("Importing calendar events from {:?}", path);
            orchestrator =
                orchestrator.with_calendar(Box::new(JsonCalendarSource::new(path, clock)));
            true
        }
        (None, true) => {
            info!("No calendar events_file configured, calendar sync disabled");
            false
        }
        (_, false) => false,
    };

    let handle = orchestrator.handle();
    let api_server = ApiServer::new(handle.clone(), &config);
    tokio::spawn(async move {
        if let Err(e) = api_server.start().await {
            error!("API server failed: {}", e);
        }
    });

    if calendar_ready {
        spawn_calendar_sync(handle.clone(), config.calendar.sync_interval_minutes);
    }

    let shutdown = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received");
            shutdown.shutdown();
        }
    });

    info!("FlowMeet is ready!");
    info!(
        "Dashboard API: http://127.0.0.1:{}/meetings",
        config.api.port
    );

    orchestrator.run().await
}

/// Sync once at startup, then every `interval_minutes` (0 means startup only).
fn spawn_calendar_sync(handle: AutomationHandle, interval_minutes: u64) {
    tokio::spawn(async move {
        let period = Duration::from_secs(interval_minutes.max(1) * 60);
        let mut ticker = tokio::time::interval(period);

        loop {
            ticker.tick().await;
            match handle.sync_calendar().await {
                Ok(summary) => info!(
                    "Calendar sync: {} added, {} updated, {} removed",
                    summary.added, summary.updated, summary.removed
                ),
                Err(AutomationError::Closed) => break,
                Err(e) => warn!("Calendar sync failed: {}", e),
            }
            if interval_minutes == 0 {
                break;
            }
        }
    });
}
