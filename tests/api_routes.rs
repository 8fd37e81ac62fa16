//! HTTP surface against a live orchestrator on an ephemeral port.

mod common;

use chrono::{Duration as ChronoDuration, Utc};
use common::{collaborators, FakeRecorder, FakeTranscriber};
use flowmeet::api::ApiServer;
use flowmeet::automation::{AutomationHandle, AutomationOrchestrator};
use flowmeet::config::Config;
use flowmeet::meeting::MeetingRecord;
use flowmeet::persistence::MemoryStore;
use flowmeet::scheduler::SystemClock;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

struct TestServer {
    base: String,
    client: reqwest::Client,
    handle: AutomationHandle,
}

impl TestServer {
    async fn start() -> Self {
        let (collaborators, _) = collaborators(FakeRecorder::default(), FakeTranscriber::Text("hi"));
        let orchestrator = AutomationOrchestrator::new(
            Box::new(MemoryStore::default()),
            collaborators,
            Arc::new(SystemClock),
            Config::default(),
        )
        .unwrap();
        let handle = orchestrator.handle();
        tokio::spawn(orchestrator.run());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = ApiServer::router(handle.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn add(&self, title: &str) -> MeetingRecord {
        let response = self
            .client
            .post(self.url("/meetings"))
            .json(&json!({
                "title": title,
                "startTime": Utc::now() + ChronoDuration::days(1),
                "durationMinutes": 45,
                "zoomUrl": "https://zoom.us/j/1234567890?pwd=abc",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.unwrap()
    }

    async fn bridge(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/bridge"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_service_info() {
    let server = TestServer::start().await;
    let body: Value = reqwest::get(server.url("/")).await.unwrap().json().await.unwrap();
    assert_eq!(body["service"], "flowmeet");
    assert_eq!(body["status"], "running");
}

#[tokio::test]
async fn test_meeting_crud() {
    let server = TestServer::start().await;

    let created = server.add("Design review").await;
    assert_eq!(created.duration_seconds, 45 * 60);

    let listed: Vec<MeetingRecord> = reqwest::get(server.url("/meetings"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    let path = format!("/meetings/{}", created.id);
    let fetched: Value = reqwest::get(server.url(&path)).await.unwrap().json().await.unwrap();
    assert_eq!(fetched["title"], "Design review");
    assert_eq!(fetched["status"], "notStarted");

    let deleted = server.client.delete(server.url(&path)).send().await.unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let missing = reqwest::get(server.url(&path)).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_invalid_inputs_are_bad_requests() {
    let server = TestServer::start().await;

    let bad_id = reqwest::get(server.url("/meetings/not-a-uuid")).await.unwrap();
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);

    let bad_link = server
        .client
        .post(server.url("/meetings"))
        .json(&json!({
            "title": "Not zoom",
            "startTime": Utc::now() + ChronoDuration::days(1),
            "durationMinutes": 30,
            "zoomUrl": "https://example.com/meet",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_link.status(), StatusCode::BAD_REQUEST);
    assert!(server.handle.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_join_outside_window_conflicts() {
    let server = TestServer::start().await;
    let created = server.add("Tomorrow").await;

    let response = server
        .client
        .post(server.url(&format!("/meetings/{}/join", created.id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reschedule_endpoint() {
    let server = TestServer::start().await;
    let created = server.add("Sync").await;

    let new_start = Utc::now() + ChronoDuration::days(2);
    let response = server
        .client
        .post(server.url(&format!("/meetings/{}/reschedule", created.id)))
        .json(&json!({ "startTime": new_start, "durationMinutes": 15 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let moved: MeetingRecord = response.json().await.unwrap();
    assert_eq!(moved.duration_seconds, 15 * 60);
    assert_eq!(moved.start_time.timestamp(), new_start.timestamp());
}

#[tokio::test]
async fn test_bridge_ready_snapshot() {
    let server = TestServer::start().await;
    server.add("Weekly").await;

    let response = server.bridge(json!({ "type": "ready" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["settings"]["joinOffsetMinutes"], 1);
    assert_eq!(body["meetings"].as_array().unwrap().len(), 1);
    assert_eq!(body["stats"]["totalMeetings"], 1);
}

#[tokio::test]
async fn test_bridge_settings_and_validation() {
    let server = TestServer::start().await;

    let response = server
        .bridge(json!({
            "type": "updateSettings",
            "payload": { "joinOffsetMinutes": 3, "defaultMode": "incognito" }
        }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["settings"]["joinOffsetMinutes"], 3);
    assert_eq!(body["settings"]["defaultMode"], "incognito");

    let out_of_range = server
        .bridge(json!({
            "type": "updateSettings",
            "payload": { "joinOffsetMinutes": 500 }
        }))
        .await;
    assert_eq!(out_of_range.status(), StatusCode::BAD_REQUEST);

    let unknown = server.bridge(json!({ "type": "launchRockets" })).await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

    let bad_ref = server
        .bridge(json!({ "type": "deleteMeeting", "payload": { "meetingId": "nope" } }))
        .await;
    assert_eq!(bad_ref.status(), StatusCode::BAD_REQUEST);

    let settings = server.handle.settings().await.unwrap();
    assert_eq!(settings.scheduling.join_offset_minutes, 3);
}

#[tokio::test]
async fn test_bridge_delete_meeting() {
    let server = TestServer::start().await;
    let created = server.add("Drop me").await;

    let response = server
        .bridge(json!({
            "type": "deleteMeeting",
            "payload": { "meetingId": created.id.to_string() }
        }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(server.handle.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_calendar_sync_without_source() {
    let server = TestServer::start().await;
    let response = server
        .client
        .post(server.url("/calendar/sync"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
