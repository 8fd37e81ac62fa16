//! CLI handlers that talk to the running service over its HTTP API.

use anyhow::{bail, Context, Result};
use reqwest::{Method, RequestBuilder};
use serde_json::{json, Value};

use crate::calendar::SyncSummary;
use crate::cli::args::{AddMeetingArgs, MeetingCliArgs, MeetingCommand};
use crate::config::{ApiConfig, Config};
use crate::meeting::{ManualMeetingInput, MeetingMode, MeetingRecord};

struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    fn from_config() -> Self {
        let port = Config::load()
            .map(|c| c.api.port)
            .unwrap_or_else(|_| ApiConfig::default().port);
        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://127.0.0.1:{}", port),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Value> {
        let response = request
            .send()
            .await
            .context("Failed to connect to FlowMeet service. Is it running?")?;

        let status = response.status();
        let json: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            bail!(
                "Failed to {}: {}",
                action,
                json.get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("Unknown error")
            );
        }

        Ok(json)
    }
}

pub async fn handle_meeting_command(args: MeetingCliArgs) -> Result<()> {
    let api = ApiClient::from_config();
    match args.command {
        MeetingCommand::List => list_meetings(&api).await,
        MeetingCommand::Add(add) => add_meeting(&api, add).await,
        MeetingCommand::Delete { id } => {
            let json = api
                .send(api.request(Method::DELETE, &format!("/meetings/{}", id)), "delete meeting")
                .await?;
            let record: MeetingRecord = serde_json::from_value(json)?;
            println!("Deleted '{}'", record.title);
            Ok(())
        }
        MeetingCommand::Join { id } => {
            let json = api
                .send(api.request(Method::POST, &format!("/meetings/{}/join", id)), "join meeting")
                .await?;
            let record: MeetingRecord = serde_json::from_value(json)?;
            println!("Joining '{}'", record.title);
            Ok(())
        }
        MeetingCommand::Reschedule {
            id,
            start,
            duration,
        } => {
            let body = json!({ "startTime": start, "durationMinutes": duration });
            let json = api
                .send(
                    api.request(Method::POST, &format!("/meetings/{}/reschedule", id))
                        .json(&body),
                    "reschedule meeting",
                )
                .await?;
            let record: MeetingRecord = serde_json::from_value(json)?;
            println!("'{}' now starts at {}", record.title, record.start_time);
            Ok(())
        }
    }
}

pub async fn handle_sync_command() -> Result<()> {
    let api = ApiClient::from_config();
    let json = api
        .send(api.request(Method::POST, "/calendar/sync"), "sync calendar")
        .await?;
    let summary: SyncSummary = serde_json::from_value(json)?;
    println!(
        "Calendar synced: {} added, {} updated, {} removed, {} without a Zoom link",
        summary.added, summary.updated, summary.removed, summary.skipped
    );
    Ok(())
}

async fn list_meetings(api: &ApiClient) -> Result<()> {
    let json = api
        .send(api.request(Method::GET, "/meetings"), "list meetings")
        .await?;
    let meetings: Vec<MeetingRecord> = serde_json::from_value(json)?;

    if meetings.is_empty() {
        println!("No meetings scheduled.");
        return Ok(());
    }

    println!("{:<36}  {:<17}  {:<11}  TITLE", "ID", "START", "STATUS");
    for meeting in meetings {
        println!(
            "{:<36}  {:<17}  {:<11}  {}",
            meeting.id,
            meeting.start_time.format("%Y-%m-%d %H:%M"),
            meeting.status.as_str(),
            meeting.title
        );
        if let Some(error) = &meeting.last_error {
            println!("{:<36}  error: {}", "", error);
        }
    }

    Ok(())
}

async fn add_meeting(api: &ApiClient, args: AddMeetingArgs) -> Result<()> {
    let input = ManualMeetingInput {
        title: args.title,
        start_time: args.start,
        duration_minutes: args.duration,
        zoom_url: args.url,
        meeting_id: args.meeting_id,
        passcode: args.passcode,
        mode: args.mode.map(MeetingMode::from),
    };

    let json = api
        .send(api.request(Method::POST, "/meetings").json(&input), "add meeting")
        .await?;
    let record: MeetingRecord = serde_json::from_value(json)?;

    println!("Added '{}' ({})", record.title, record.id);
    println!("Starts {} in {} mode", record.start_time, record.mode.as_str());
    Ok(())
}
