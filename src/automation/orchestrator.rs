//! Meeting automation loop.
//!
//! One task owns the meeting collection and drains a single channel. Timer
//! fires, finished background work and user requests all arrive as
//! [`AutomationCommand`]s, so every status change happens on this loop:
//!
//! join fire → open Zoom → inProgress → (grace) → start recording
//! end fire  → processing → stop recording → transcribe → notes → ready
//!
//! Any collaborator failure after the join lands the meeting in `failed` with
//! the message kept on the record.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::collaborators::Collaborators;
use super::error::AutomationError;
use super::handle::{AutomationCommand, AutomationHandle};
use crate::calendar::{merge_calendar_events, CalendarSource, SyncSummary};
use crate::config::{Config, SettingsUpdate};
use crate::meeting::{
    DashboardStats, ManualMeetingInput, MeetingEvent, MeetingNotes, MeetingRecord,
    MeetingStatus, MeetingStore, TransitionError,
};
use crate::persistence::MeetingPersistence;
use crate::scheduler::{JoinScheduler, ScheduleOutcome, SharedClock, TimerKind};
use crate::zoom::ValidationError;

const EVENT_CAPACITY: usize = 64;

/// What asked for a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinTrigger {
    Timer,
    User,
}

pub struct AutomationOrchestrator {
    store: MeetingStore,
    scheduler: JoinScheduler,
    clock: SharedClock,
    collaborators: Collaborators,
    calendar: Option<Box<dyn CalendarSource>>,
    config: Config,
    config_path: Option<PathBuf>,
    /// The meeting holding the single recorder, if any.
    recording_owner: Option<Uuid>,
    tx: mpsc::UnboundedSender<AutomationCommand>,
    rx: mpsc::UnboundedReceiver<AutomationCommand>,
    events: broadcast::Sender<MeetingEvent>,
}

impl AutomationOrchestrator {
    pub fn new(
        persistence: Box<dyn MeetingPersistence>,
        collaborators: Collaborators,
        clock: SharedClock,
        config: Config,
    ) -> Result<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let store = MeetingStore::load(persistence, events.clone())
            .context("Failed to load meetings")?;
        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            store,
            scheduler: JoinScheduler::new(Arc::clone(&clock)),
            clock,
            collaborators,
            calendar: None,
            config,
            config_path: None,
            recording_owner: None,
            tx,
            rx,
            events,
        })
    }

    pub fn with_calendar(mut self, source: Box<dyn CalendarSource>) -> Self {
        self.calendar = Some(source);
        self
    }

    /// Persist settings changes to this file.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn handle(&self) -> AutomationHandle {
        AutomationHandle::new(self.tx.clone(), self.events.clone())
    }

    /// Recover state left by a previous run, then serve until shutdown.
    pub async fn run(mut self) -> Result<()> {
        self.recover().await;

        while let Some(command) = self.rx.recv().await {
            if matches!(command, AutomationCommand::Shutdown) {
                info!("Automation loop shutting down");
                break;
            }
            self.dispatch(command).await;
        }

        self.scheduler.cancel_all().await;
        Ok(())
    }

    /// Re-arm timers and settle meetings interrupted by a restart.
    async fn recover(&mut self) {
        let now = self.clock.now();
        let snapshot: Vec<MeetingRecord> = self.store.all().to_vec();
        info!("Recovering {} meetings", snapshot.len());

        for record in snapshot {
            match record.status {
                MeetingStatus::NotStarted => self.arm(&record).await,
                MeetingStatus::InProgress if record.has_ended(now) => {
                    info!(
                        "'{}' ended while we were not running, finishing it now",
                        record.title
                    );
                    self.handle_end(record.id).await;
                }
                MeetingStatus::InProgress => self.arm_end(&record).await,
                MeetingStatus::Processing => {
                    self.fail(record.id, "processing interrupted by restart");
                }
                MeetingStatus::Ready | MeetingStatus::Failed => {}
            }
        }
    }

    async fn dispatch(&mut self, command: AutomationCommand) {
        match command {
            AutomationCommand::JoinDue(id) => {
                if let Err(e) = self.handle_join(id, JoinTrigger::Timer).await {
                    debug!("Join for {} did not happen: {}", id, e);
                }
            }
            AutomationCommand::EndDue(id) => self.handle_end(id).await,
            AutomationCommand::ReminderDue(id) => self.handle_reminder(id),
            AutomationCommand::StartRecording(id) => self.start_recording(id).await,
            AutomationCommand::ProcessingFinished {
                meeting_id,
                outcome,
            } => self.finish_processing(meeting_id, outcome),

            AutomationCommand::List(reply) => {
                let _ = reply.send(self.store.all().to_vec());
            }
            AutomationCommand::Get(id, reply) => {
                let _ = reply.send(self.store.get(id).cloned());
            }
            AutomationCommand::Stats(reply) => {
                let _ = reply.send(DashboardStats::compute(self.store.all(), self.clock.now()));
            }
            AutomationCommand::Settings(reply) => {
                let _ = reply.send(self.config.clone());
            }
            AutomationCommand::AddManual(input, reply) => {
                let _ = reply.send(self.add_manual(*input).await);
            }
            AutomationCommand::Delete(id, reply) => {
                let _ = reply.send(self.delete(id).await);
            }
            AutomationCommand::Reschedule {
                meeting_id,
                start_time,
                duration_minutes,
                reply,
            } => {
                let result = self
                    .reschedule(meeting_id, start_time, duration_minutes)
                    .await;
                let _ = reply.send(result);
            }
            AutomationCommand::JoinNow(id, reply) => {
                let _ = reply.send(self.handle_join(id, JoinTrigger::User).await);
            }
            AutomationCommand::SyncCalendar(reply) => {
                let _ = reply.send(self.sync_calendar().await);
            }
            AutomationCommand::UpdateSettings(update, reply) => {
                let _ = reply.send(Ok(self.update_settings(update).await));
            }
            AutomationCommand::Shutdown => {}
        }
    }

    /// Arm the join and reminder timers for a meeting that has not started.
    async fn arm(&self, record: &MeetingRecord) {
        if !record.has_zoom_info() {
            debug!("'{}' has no Zoom info, not scheduling", record.title);
            return;
        }

        // A skipped slot must not leave a timer armed for the old time.
        let tx = self.tx.clone();
        let join = self
            .scheduler
            .schedule_join(record, self.config.scheduling.join_offset_minutes, move |m| {
                let _ = tx.send(AutomationCommand::JoinDue(m.id));
            })
            .await;
        if !join.is_armed() {
            self.scheduler.cancel_timer(record.id, TimerKind::Join).await;
        }

        let reminder_minutes = self.config.scheduling.reminder_minutes;
        let reminder_armed = if reminder_minutes > 0 {
            let tx = self.tx.clone();
            self.scheduler
                .schedule_reminder(record, reminder_minutes, move |m| {
                    let _ = tx.send(AutomationCommand::ReminderDue(m.id));
                })
                .await
                .is_armed()
        } else {
            false
        };
        if !reminder_armed {
            self.scheduler
                .cancel_timer(record.id, TimerKind::Reminder)
                .await;
        }
    }

    /// Arm the end timer. An end time already passed is handled right away.
    async fn arm_end(&self, record: &MeetingRecord) {
        let tx = self.tx.clone();
        let outcome = self
            .scheduler
            .schedule_end(record, move |m| {
                let _ = tx.send(AutomationCommand::EndDue(m.id));
            })
            .await;

        if let ScheduleOutcome::Skipped { .. } = outcome {
            let _ = self.tx.send(AutomationCommand::EndDue(record.id));
        }
    }

    async fn handle_join(
        &mut self,
        id: Uuid,
        trigger: JoinTrigger,
    ) -> Result<MeetingRecord, AutomationError> {
        let now = self.clock.now();
        let offset = self.config.scheduling.join_offset_minutes;
        let record = self
            .store
            .get(id)
            .cloned()
            .ok_or(AutomationError::NotFound(id))?;

        // Duplicate fires and late requests land here.
        record.status.check_advance(MeetingStatus::InProgress)?;

        if trigger == JoinTrigger::User && !record.in_join_window(now, offset) {
            return Err(AutomationError::OutsideJoinWindow(record.title));
        }

        let url = record
            .join_url()
            .ok_or_else(|| AutomationError::NotSchedulable(record.title.clone()))?;

        info!("Joining '{}' ({})", record.title, id);
        if !self.collaborators.opener.open(&url).await {
            let message = format!("Could not open Zoom for '{}'", record.title);
            error!("{}", message);
            self.store.update(id, |m| {
                m.last_error = Some(message.clone());
                m.updated_at = now;
            });
            self.store.emit(MeetingEvent::JoinFailed {
                meeting_id: id,
                message,
            });
            return Err(AutomationError::JoinFailed(record.title));
        }

        let joined = self
            .store
            .update(id, |m| {
                m.advance(MeetingStatus::InProgress, now)?;
                m.last_error = None;
                Ok::<_, AutomationError>(m.clone())
            })
            .ok_or(AutomationError::NotFound(id))??;

        self.scheduler.cancel_timer(id, TimerKind::Join).await;
        self.scheduler.cancel_timer(id, TimerKind::Reminder).await;
        self.arm_end(&joined).await;

        let grace = self.config.scheduling.recording_grace();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let _ = tx.send(AutomationCommand::StartRecording(id));
        });

        Ok(joined)
    }

    async fn start_recording(&mut self, id: Uuid) {
        let Some(record) = self.store.get(id) else {
            return;
        };
        if record.status != MeetingStatus::InProgress {
            debug!(
                "Not starting recording for '{}': meeting is {}",
                record.title, record.status
            );
            return;
        }

        let title = record.title.clone();
        if let Some(owner) = self.recording_owner {
            warn!(
                "Not recording '{}': recorder is busy with meeting {}",
                title, owner
            );
            let now = self.clock.now();
            self.store.update(id, |m| {
                m.last_error = Some("Recorder busy with another meeting".to_string());
                m.updated_at = now;
            });
            return;
        }

        if self.collaborators.recorder.start(id).await {
            info!("Recording '{}'", title);
            self.recording_owner = Some(id);
        } else {
            // The meeting itself goes on and fails at its end with no recording.
            warn!("Recording failed to start for '{}'", title);
            let now = self.clock.now();
            self.store.update(id, |m| {
                m.last_error = Some("Recording failed to start".to_string());
                m.updated_at = now;
            });
        }
    }

    async fn handle_end(&mut self, id: Uuid) {
        let now = self.clock.now();
        let Some(record) = self.store.get(id) else {
            debug!("End fired for deleted meeting {}", id);
            return;
        };
        if record.status != MeetingStatus::InProgress {
            debug!(
                "End fired for '{}' while {}, ignoring",
                record.title, record.status
            );
            return;
        }

        let title = record.title.clone();
        if let Some(Err(e)) = self
            .store
            .update(id, |m| m.advance(MeetingStatus::Processing, now))
        {
            error!("Could not start processing '{}': {}", title, e);
            return;
        }
        self.scheduler.cancel_timer(id, TimerKind::End).await;

        let Some(artifact) = self.stop_recording_for(id).await else {
            self.fail(id, "No recording was captured");
            return;
        };

        info!("Processing '{}' from {:?}", title, artifact);
        let path = artifact.to_string_lossy().to_string();
        self.store.update(id, |m| m.recording_path = Some(path));
        self.spawn_processing(id, artifact);
    }

    /// Transcribe and summarize off the loop; the result comes back as a
    /// command so the record is only ever touched here.
    fn spawn_processing(&self, meeting_id: Uuid, artifact: PathBuf) {
        let transcriber = Arc::clone(&self.collaborators.transcriber);
        let generator = Arc::clone(&self.collaborators.notes);
        let clock = Arc::clone(&self.clock);
        let timeout = self.config.scheduling.processing_timeout();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let work = async {
                let transcript = transcriber
                    .transcribe(&artifact)
                    .await
                    .context("Transcription failed")?;
                if transcript.trim().is_empty() {
                    bail!("Transcription returned no text");
                }
                let generated = generator
                    .generate_notes(&transcript)
                    .await
                    .context("Notes generation failed")?;
                Ok::<_, anyhow::Error>(generated.into_notes(transcript, clock.now()))
            };

            let outcome = match tokio::time::timeout(timeout, work).await {
                Ok(Ok(notes)) => Ok(notes),
                Ok(Err(e)) => Err(format!("{:#}", e)),
                Err(_) => Err(format!(
                    "Processing timed out after {}s",
                    timeout.as_secs()
                )),
            };

            let _ = tx.send(AutomationCommand::ProcessingFinished {
                meeting_id,
                outcome,
            });
        });
    }

    fn finish_processing(&mut self, id: Uuid, outcome: Result<MeetingNotes, String>) {
        let now = self.clock.now();
        let Some(record) = self.store.get(id) else {
            debug!("Dropping processing result for deleted meeting {}", id);
            return;
        };
        if record.status != MeetingStatus::Processing {
            debug!(
                "Dropping processing result for '{}': meeting is {}",
                record.title, record.status
            );
            return;
        }

        match outcome {
            Ok(notes) => {
                let title = record.title.clone();
                let result = self.store.update(id, |m| {
                    m.notes = Some(notes);
                    m.advance(MeetingStatus::Ready, now)
                });
                match result {
                    Some(Ok(_)) => info!("Notes ready for '{}'", title),
                    Some(Err(e)) => error!("Could not finish '{}': {}", title, e),
                    None => {}
                }
            }
            Err(message) => self.fail(id, message),
        }
    }

    /// Stop the recorder only if `id` is the meeting it is recording.
    async fn stop_recording_for(&mut self, id: Uuid) -> Option<PathBuf> {
        if self.recording_owner != Some(id) {
            debug!("Meeting {} does not hold the recorder", id);
            return None;
        }
        self.recording_owner = None;
        self.collaborators.recorder.stop().await
    }

    fn handle_reminder(&self, id: Uuid) {
        let Some(record) = self.store.get(id) else {
            return;
        };
        if record.status != MeetingStatus::NotStarted {
            return;
        }

        info!(
            "'{}' starts at {} ({} mode)",
            record.title,
            record.start_time,
            record.mode.as_str()
        );
        self.store.emit(MeetingEvent::Reminder {
            meeting: Box::new(record.clone()),
        });
    }

    fn fail(&mut self, id: Uuid, message: impl Into<String>) {
        let message = message.into();
        let now = self.clock.now();
        match self.store.update(id, |m| m.fail(message.clone(), now)) {
            Some(Ok(_)) => error!("Meeting {} failed: {}", id, message),
            Some(Err(e)) => error!("Could not mark meeting {} failed: {}", id, e),
            None => debug!("Meeting {} is gone, not marking failed", id),
        }
    }

    async fn add_manual(
        &mut self,
        input: ManualMeetingInput,
    ) -> Result<MeetingRecord, AutomationError> {
        let record = input.into_record(self.config.meetings.default_mode, self.clock.now())?;
        info!("Added '{}' at {}", record.title, record.start_time);
        self.store.insert(record.clone());
        self.arm(&record).await;
        Ok(record)
    }

    async fn delete(&mut self, id: Uuid) -> Result<MeetingRecord, AutomationError> {
        let status = self
            .store
            .get(id)
            .map(|m| m.status)
            .ok_or(AutomationError::NotFound(id))?;

        self.scheduler.cancel(id).await;
        if status == MeetingStatus::InProgress {
            if let Some(path) = self.stop_recording_for(id).await {
                info!("Kept partial recording of deleted meeting at {:?}", path);
            }
        }

        let removed = self
            .store
            .remove(id)
            .ok_or(AutomationError::NotFound(id))?;
        info!("Deleted '{}'", removed.title);
        Ok(removed)
    }

    async fn reschedule(
        &mut self,
        id: Uuid,
        start_time: DateTime<Utc>,
        duration_minutes: Option<i64>,
    ) -> Result<MeetingRecord, AutomationError> {
        let now = self.clock.now();
        let current = self
            .store
            .get(id)
            .ok_or(AutomationError::NotFound(id))?;

        let duration_seconds = match duration_minutes {
            Some(minutes) if minutes <= 0 => return Err(ValidationError::InvalidDuration.into()),
            Some(minutes) => minutes * 60,
            None => current.duration_seconds,
        };
        if !current.status.accepts_reschedule() {
            return Err(AutomationError::Transition(TransitionError {
                from: current.status,
                to: MeetingStatus::NotStarted,
            }));
        }

        self.scheduler.cancel(id).await;
        let record = self
            .store
            .update(id, |m| {
                m.reschedule(start_time, duration_seconds, now)?;
                Ok::<_, AutomationError>(m.clone())
            })
            .ok_or(AutomationError::NotFound(id))??;

        info!("Rescheduled '{}' to {}", record.title, record.start_time);
        self.arm(&record).await;
        Ok(record)
    }

    async fn sync_calendar(&mut self) -> Result<SyncSummary, AutomationError> {
        let source = self
            .calendar
            .as_ref()
            .ok_or(AutomationError::CalendarUnavailable)?;

        let events = source
            .fetch_candidate_events(self.config.calendar.sync_days)
            .await
            .map_err(|e| AutomationError::Calendar(format!("{:#}", e)))?;

        let now = self.clock.now();
        let plan = merge_calendar_events(
            self.store.all(),
            events,
            self.config.meetings.default_mode,
            now,
        );
        let summary = SyncSummary::from(&plan);

        for id in plan.removed {
            self.scheduler.cancel(id).await;
            if let Some(removed) = self.store.remove(id) {
                info!("'{}' is no longer on the calendar, removed", removed.title);
            }
        }

        for refreshed in plan.updated {
            let id = refreshed.id;
            let replacement = refreshed.clone();
            self.store.update(id, move |m| *m = replacement);
            self.arm(&refreshed).await;
        }

        for record in plan.added {
            self.store.insert(record.clone());
            self.arm(&record).await;
        }

        Ok(summary)
    }

    async fn update_settings(&mut self, update: SettingsUpdate) -> Config {
        let previous_offset = self.config.scheduling.join_offset_minutes;
        if !update.apply_to(&mut self.config) {
            return self.config.clone();
        }
        info!("Settings updated: {:?}", update);

        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save_to(path) {
                warn!("Failed to save settings: {:#}", e);
            }
        }

        if self.config.scheduling.join_offset_minutes != previous_offset {
            let pending: Vec<MeetingRecord> = self
                .store
                .all()
                .iter()
                .filter(|m| m.status == MeetingStatus::NotStarted)
                .cloned()
                .collect();
            for record in pending {
                self.arm(&record).await;
            }
        }

        self.config.clone()
    }
}
