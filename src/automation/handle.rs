//! Messages into the orchestrator loop and the cloneable handle that sends them.

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, oneshot};
use uuid::Uuid;

use super::error::AutomationError;
use crate::calendar::SyncSummary;
use crate::config::{Config, SettingsUpdate};
use crate::meeting::{DashboardStats, ManualMeetingInput, MeetingEvent, MeetingNotes, MeetingRecord};

pub(crate) type Reply<T> = oneshot::Sender<Result<T, AutomationError>>;

pub(crate) enum AutomationCommand {
    JoinDue(Uuid),
    EndDue(Uuid),
    ReminderDue(Uuid),
    StartRecording(Uuid),
    ProcessingFinished {
        meeting_id: Uuid,
        outcome: Result<MeetingNotes, String>,
    },

    List(oneshot::Sender<Vec<MeetingRecord>>),
    Get(Uuid, oneshot::Sender<Option<MeetingRecord>>),
    Stats(oneshot::Sender<DashboardStats>),
    Settings(oneshot::Sender<Config>),
    AddManual(Box<ManualMeetingInput>, Reply<MeetingRecord>),
    Delete(Uuid, Reply<MeetingRecord>),
    Reschedule {
        meeting_id: Uuid,
        start_time: DateTime<Utc>,
        duration_minutes: Option<i64>,
        reply: Reply<MeetingRecord>,
    },
    JoinNow(Uuid, Reply<MeetingRecord>),
    SyncCalendar(Reply<SyncSummary>),
    UpdateSettings(SettingsUpdate, Reply<Config>),
    Shutdown,
}

/// Cloneable front door to a running orchestrator.
#[derive(Clone)]
pub struct AutomationHandle {
    tx: mpsc::UnboundedSender<AutomationCommand>,
    events: broadcast::Sender<MeetingEvent>,
}

impl AutomationHandle {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<AutomationCommand>,
        events: broadcast::Sender<MeetingEvent>,
    ) -> Self {
        Self { tx, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MeetingEvent> {
        self.events.subscribe()
    }

    pub async fn list(&self) -> Result<Vec<MeetingRecord>, AutomationError> {
        self.ask(AutomationCommand::List).await
    }

    pub async fn get(&self, meeting_id: Uuid) -> Result<MeetingRecord, AutomationError> {
        self.ask(|reply| AutomationCommand::Get(meeting_id, reply))
            .await?
            .ok_or(AutomationError::NotFound(meeting_id))
    }

    pub async fn stats(&self) -> Result<DashboardStats, AutomationError> {
        self.ask(AutomationCommand::Stats).await
    }

    pub async fn settings(&self) -> Result<Config, AutomationError> {
        self.ask(AutomationCommand::Settings).await
    }

    pub async fn add_manual(
        &self,
        input: ManualMeetingInput,
    ) -> Result<MeetingRecord, AutomationError> {
        self.request(|reply| AutomationCommand::AddManual(Box::new(input), reply))
            .await
    }

    pub async fn delete(&self, meeting_id: Uuid) -> Result<MeetingRecord, AutomationError> {
        self.request(|reply| AutomationCommand::Delete(meeting_id, reply))
            .await
    }

    /// Move a meeting to a new time. Keeps the current duration when
    /// `duration_minutes` is `None`.
    pub async fn reschedule(
        &self,
        meeting_id: Uuid,
        start_time: DateTime<Utc>,
        duration_minutes: Option<i64>,
    ) -> Result<MeetingRecord, AutomationError> {
        self.request(|reply| AutomationCommand::Reschedule {
            meeting_id,
            start_time,
            duration_minutes,
            reply,
        })
        .await
    }

    pub async fn join_now(&self, meeting_id: Uuid) -> Result<MeetingRecord, AutomationError> {
        self.request(|reply| AutomationCommand::JoinNow(meeting_id, reply))
            .await
    }

    pub async fn sync_calendar(&self) -> Result<SyncSummary, AutomationError> {
        self.request(AutomationCommand::SyncCalendar).await
    }

    pub async fn update_settings(
        &self,
        update: SettingsUpdate,
    ) -> Result<Config, AutomationError> {
        self.request(|reply| AutomationCommand::UpdateSettings(update, reply))
            .await
    }

    /// Stop the loop and cancel every pending timer.
    pub fn shutdown(&self) {
        let _ = self.tx.send(AutomationCommand::Shutdown);
    }

    async fn ask<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> AutomationCommand,
    ) -> Result<T, AutomationError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(build(reply))
            .map_err(|_| AutomationError::Closed)?;
        response.await.map_err(|_| AutomationError::Closed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> AutomationCommand,
    ) -> Result<T, AutomationError> {
        self.ask(build).await?
    }
}
