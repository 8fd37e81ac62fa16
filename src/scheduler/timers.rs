//! One-shot timers keyed by meeting id.
//!
//! Each meeting holds at most one pending timer per [`TimerKind`]. Arming a
//! timer for a slot that is already occupied aborts the old task and bumps
//! the slot generation under the same lock, so a stale task that wakes up
//! late finds a newer generation and exits without firing.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::clock::SharedClock;
use crate::meeting::MeetingRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerKind {
    Join,
    End,
    Reminder,
}

impl TimerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::End => "end",
            Self::Reminder => "reminder",
        }
    }
}

/// What a schedule call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Armed { fire_at: DateTime<Utc> },
    /// The fire time was not in the future; nothing was armed.
    Skipped { due: DateTime<Utc> },
}

impl ScheduleOutcome {
    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed { .. })
    }
}

/// A timer that has not fired yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTimer {
    pub kind: TimerKind,
    pub fire_at: DateTime<Utc>,
}

struct Slot {
    generation: u64,
    fire_at: DateTime<Utc>,
    handle: JoinHandle<()>,
}

type Slots = HashMap<(Uuid, TimerKind), Slot>;

/// Single authority for what fires when, per meeting.
pub struct JoinScheduler {
    clock: SharedClock,
    slots: Arc<Mutex<Slots>>,
    generation: AtomicU64,
}

impl JoinScheduler {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            slots: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// Arm the auto-join timer at `start - offset`.
    ///
    /// A join time that is not strictly in the future is skipped: it never
    /// fires retroactively.
    pub async fn schedule_join<F>(
        &self,
        meeting: &MeetingRecord,
        offset_minutes: u32,
        on_fire: F,
    ) -> ScheduleOutcome
    where
        F: FnOnce(MeetingRecord) + Send + 'static,
    {
        let fire_at = meeting.join_time(offset_minutes);
        self.arm(TimerKind::Join, meeting, fire_at, on_fire).await
    }

    /// Arm the end-of-meeting timer at `start + duration`.
    pub async fn schedule_end<F>(&self, meeting: &MeetingRecord, on_fire: F) -> ScheduleOutcome
    where
        F: FnOnce(MeetingRecord) + Send + 'static,
    {
        self.arm(TimerKind::End, meeting, meeting.end_time(), on_fire)
            .await
    }

    /// Arm the upcoming-meeting reminder at `start - minutes_before`.
    pub async fn schedule_reminder<F>(
        &self,
        meeting: &MeetingRecord,
        minutes_before: u32,
        on_fire: F,
    ) -> ScheduleOutcome
    where
        F: FnOnce(MeetingRecord) + Send + 'static,
    {
        let fire_at = meeting.start_time - ChronoDuration::minutes(i64::from(minutes_before));
        self.arm(TimerKind::Reminder, meeting, fire_at, on_fire)
            .await
    }

    /// Drop every pending timer for a meeting. A no-op if none exist.
    pub async fn cancel(&self, meeting_id: Uuid) {
        let mut slots = self.slots.lock().await;
        let keys: Vec<_> = slots
            .keys()
            .filter(|(id, _)| *id == meeting_id)
            .copied()
            .collect();

        for key in keys {
            if let Some(slot) = slots.remove(&key) {
                slot.handle.abort();
                debug!("Cancelled {} timer for meeting {}", key.1.as_str(), meeting_id);
            }
        }
    }

    /// Drop one kind of timer for a meeting, returning whether one was pending.
    pub async fn cancel_timer(&self, meeting_id: Uuid, kind: TimerKind) -> bool {
        match self.slots.lock().await.remove(&(meeting_id, kind)) {
            Some(slot) => {
                slot.handle.abort();
                debug!("Cancelled {} timer for meeting {}", kind.as_str(), meeting_id);
                true
            }
            None => false,
        }
    }

    /// Drop every pending timer. Used on teardown.
    pub async fn cancel_all(&self) {
        let mut slots = self.slots.lock().await;
        let count = slots.len();
        for (_, slot) in slots.drain() {
            slot.handle.abort();
        }
        if count > 0 {
            info!("Cancelled {} pending timers", count);
        }
    }

    /// Pending timers for one meeting, soonest first.
    pub async fn pending(&self, meeting_id: Uuid) -> Vec<PendingTimer> {
        let slots = self.slots.lock().await;
        let mut timers: Vec<PendingTimer> = slots
            .iter()
            .filter(|((id, _), _)| *id == meeting_id)
            .map(|((_, kind), slot)| PendingTimer {
                kind: *kind,
                fire_at: slot.fire_at,
            })
            .collect();
        timers.sort_by_key(|t| t.fire_at);
        timers
    }

    pub async fn is_armed(&self, meeting_id: Uuid, kind: TimerKind) -> bool {
        self.slots.lock().await.contains_key(&(meeting_id, kind))
    }

    pub async fn pending_count(&self) -> usize {
        self.slots.lock().await.len()
    }

    async fn arm<F>(
        &self,
        kind: TimerKind,
        meeting: &MeetingRecord,
        fire_at: DateTime<Utc>,
        on_fire: F,
    ) -> ScheduleOutcome
    where
        F: FnOnce(MeetingRecord) + Send + 'static,
    {
        let now = self.clock.now();
        let delay = match (fire_at - now).to_std() {
            Ok(delay) if fire_at > now => delay,
            _ => {
                info!(
                    "Not scheduling {} for '{}' ({}): {} is not in the future (now {})",
                    kind.as_str(),
                    meeting.title,
                    meeting.id,
                    fire_at,
                    now
                );
                return ScheduleOutcome::Skipped { due: fire_at };
            }
        };

        let key = (meeting.id, kind);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        // Hold the lock across abort + spawn + insert so the new task cannot
        // claim its slot before it is recorded, and the old one cannot claim
        // it after it is replaced.
        let mut slots = self.slots.lock().await;
        if let Some(previous) = slots.remove(&key) {
            previous.handle.abort();
            debug!(
                "Replaced {} timer for meeting {} (was {})",
                kind.as_str(),
                meeting.id,
                previous.fire_at
            );
        }

        let task_slots = Arc::clone(&self.slots);
        let task_meeting = meeting.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let claimed = {
                let mut slots = task_slots.lock().await;
                match slots.get(&key) {
                    Some(slot) if slot.generation == generation => {
                        slots.remove(&key);
                        true
                    }
                    _ => false,
                }
            };

            if claimed {
                info!(
                    "{} timer fired for '{}' ({})",
                    kind.as_str(),
                    task_meeting.title,
                    task_meeting.id
                );
                on_fire(task_meeting);
            }
        });

        slots.insert(
            key,
            Slot {
                generation,
                fire_at,
                handle,
            },
        );

        let minutes = delay.as_secs() / 60;
        let seconds = delay.as_secs() % 60;
        info!(
            "Scheduled {} for '{}' in {}m {}s (at {})",
            kind.as_str(),
            meeting.title,
            minutes,
            seconds,
            fire_at
        );

        ScheduleOutcome::Armed { fire_at }
    }
}

impl Drop for JoinScheduler {
    fn drop(&mut self) {
        if let Ok(mut slots) = self.slots.try_lock() {
            for (_, slot) in slots.drain() {
                slot.handle.abort();
            }
        }
    }
}
