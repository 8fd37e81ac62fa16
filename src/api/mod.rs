//! Local REST API for FlowMeet.
//!
//! Provides HTTP endpoints for:
//! - Meeting management (list, add, delete, reschedule, join now)
//! - Calendar sync
//! - Dashboard bridge messages and statistics

pub mod error;
pub mod routes;

use crate::automation::AutomationHandle;
use crate::config::Config;
use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tracing::info;

pub struct ApiServer {
    port: u16,
    handle: AutomationHandle,
}

impl ApiServer {
    pub fn new(handle: AutomationHandle, config: &Config) -> Self {
        Self {
            port: config.api.port,
            handle,
        }
    }

    pub fn router(handle: AutomationHandle) -> Router {
        Router::new()
            .route("/", get(status))
            .merge(routes::meetings::router(handle.clone()))
            .merge(routes::dashboard::router(handle))
            .layer(ServiceBuilder::new())
    }

    pub async fn start(self) -> Result<()> {
        let app = Self::router(self.handle);

        let listener = tokio::net::TcpListener::bind(&format!("127.0.0.1:{}", self.port)).await?;

        info!("API server listening on http://127.0.0.1:{}", self.port);
        info!("Endpoints:");
        info!("  GET    /                       - Service info");
        info!("  GET    /meetings               - List meetings");
        info!("  POST   /meetings               - Add a meeting");
        info!("  GET    /meetings/:id           - Get a meeting");
        info!("  DELETE /meetings/:id           - Delete a meeting");
        info!("  POST   /meetings/:id/reschedule - Reschedule a meeting");
        info!("  POST   /meetings/:id/join      - Join a meeting now");
        info!("  POST   /calendar/sync          - Sync calendar");
        info!("  GET    /stats                  - Dashboard statistics");
        info!("  GET    /settings               - Current settings");
        info!("  POST   /bridge                 - Dashboard messages");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn status() -> Json<Value> {
    Json(json!({
        "service": "flowmeet",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}
