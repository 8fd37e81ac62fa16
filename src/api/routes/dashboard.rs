//! Endpoints backing the web dashboard.
//!
//! - POST /bridge          dashboard messages (`{"type": ..., "payload": ...}`)
//! - POST /calendar/sync   import calendar events now
//! - GET  /stats           summary figures
//! - GET  /settings        current settings

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::api::error::ApiResult;
use crate::automation::AutomationHandle;
use crate::bridge::{BridgeRequest, DashboardMessage};
use crate::calendar::SyncSummary;
use crate::config::Config;
use crate::meeting::DashboardStats;

pub fn router(handle: AutomationHandle) -> Router {
    Router::new()
        .route("/bridge", post(bridge_message))
        .route("/calendar/sync", post(sync_calendar))
        .route("/stats", get(stats))
        .route("/settings", get(settings))
        .with_state(handle)
}

/// Validates a dashboard message and runs it. Malformed messages are
/// rejected with 400 before anything reaches the orchestrator.
async fn bridge_message(
    State(handle): State<AutomationHandle>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let request = DashboardMessage::parse(body)?.validate()?;
    debug!("Dashboard message: {:?}", request);

    let response = match request {
        BridgeRequest::Ready => {
            info!("Dashboard connected");
            json!({
                "settings": dashboard_settings(&handle.settings().await?),
                "meetings": handle.list().await?,
                "stats": handle.stats().await?,
            })
        }
        BridgeRequest::UpdateSettings(update) => {
            let config = handle.update_settings(update).await?;
            json!({ "settings": dashboard_settings(&config) })
        }
        BridgeRequest::Join(id) => json!({ "meeting": handle.join_now(id).await? }),
        BridgeRequest::ShowDetail(id) => json!({ "meeting": handle.get(id).await? }),
        BridgeRequest::Delete(id) => json!({ "deleted": handle.delete(id).await? }),
        BridgeRequest::SyncCalendar => json!({ "sync": handle.sync_calendar().await? }),
    };

    Ok(Json(response))
}

async fn sync_calendar(State(handle): State<AutomationHandle>) -> ApiResult<Json<SyncSummary>> {
    Ok(Json(handle.sync_calendar().await?))
}

async fn stats(State(handle): State<AutomationHandle>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(handle.stats().await?))
}

async fn settings(State(handle): State<AutomationHandle>) -> ApiResult<Json<Value>> {
    Ok(Json(dashboard_settings(&handle.settings().await?)))
}

/// Settings in the shape the dashboard reads.
fn dashboard_settings(config: &Config) -> Value {
    json!({
        "autoJoinEnabled": config.scheduling.join_offset_minutes > 0,
        "joinOffsetMinutes": config.scheduling.join_offset_minutes,
        "defaultMode": config.meetings.default_mode,
        "calendarSyncDays": config.calendar.sync_days,
        "calendarEnabled": config.calendar.enabled,
        "reminderMinutes": config.scheduling.reminder_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::MeetingMode;

    #[test]
    fn test_dashboard_settings_shape() {
        let mut config = Config::default();
        config.meetings.default_mode = MeetingMode::Incognito;
        let value = dashboard_settings(&config);
        assert_eq!(value["joinOffsetMinutes"], 1);
        assert_eq!(value["autoJoinEnabled"], true);
        assert_eq!(value["defaultMode"], "incognito");
        assert_eq!(value["calendarSyncDays"], 7);
    }
}
