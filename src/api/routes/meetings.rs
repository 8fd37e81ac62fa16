//! Meeting endpoints.
//!
//! - GET    /meetings                   list all meetings
//! - POST   /meetings                   add a meeting by hand
//! - GET    /meetings/:id               one meeting
//! - DELETE /meetings/:id               delete, cancelling its timers
//! - POST   /meetings/:id/reschedule    move to a new time
//! - POST   /meetings/:id/join          join now, inside the join window

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{parse_meeting_id, ApiResult};
use crate::automation::AutomationHandle;
use crate::meeting::{ManualMeetingInput, MeetingRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
}

pub fn router(handle: AutomationHandle) -> Router {
    Router::new()
        .route("/meetings", get(list_meetings).post(add_meeting))
        .route("/meetings/:id", get(get_meeting).delete(delete_meeting))
        .route("/meetings/:id/reschedule", post(reschedule_meeting))
        .route("/meetings/:id/join", post(join_meeting))
        .with_state(handle)
}

async fn list_meetings(
    State(handle): State<AutomationHandle>,
) -> ApiResult<Json<Vec<MeetingRecord>>> {
    Ok(Json(handle.list().await?))
}

async fn add_meeting(
    State(handle): State<AutomationHandle>,
    Json(input): Json<ManualMeetingInput>,
) -> ApiResult<(StatusCode, Json<MeetingRecord>)> {
    info!("Manual meeting received via API: {}", input.title);
    let record = handle.add_manual(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_meeting(
    State(handle): State<AutomationHandle>,
    Path(id): Path<String>,
) -> ApiResult<Json<MeetingRecord>> {
    let id = parse_meeting_id(&id)?;
    Ok(Json(handle.get(id).await?))
}

async fn delete_meeting(
    State(handle): State<AutomationHandle>,
    Path(id): Path<String>,
) -> ApiResult<Json<MeetingRecord>> {
    let id = parse_meeting_id(&id)?;
    Ok(Json(handle.delete(id).await?))
}

async fn reschedule_meeting(
    State(handle): State<AutomationHandle>,
    Path(id): Path<String>,
    Json(request): Json<RescheduleRequest>,
) -> ApiResult<Json<MeetingRecord>> {
    let id = parse_meeting_id(&id)?;
    let record = handle
        .reschedule(id, request.start_time, request.duration_minutes)
        .await?;
    Ok(Json(record))
}

async fn join_meeting(
    State(handle): State<AutomationHandle>,
    Path(id): Path<String>,
) -> ApiResult<Json<MeetingRecord>> {
    let id = parse_meeting_id(&id)?;
    info!("Join now requested via API for {}", id);
    Ok(Json(handle.join_now(id).await?))
}
