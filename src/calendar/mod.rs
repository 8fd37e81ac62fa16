//! Calendar import.
//!
//! A [`CalendarSource`] hands back raw events for the next few days; the
//! merge step turns the ones carrying a Zoom link into meeting records and
//! works out what changed since the previous pass.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

use crate::meeting::{MeetingMode, MeetingRecord, MeetingSource, MeetingStatus};
use crate::scheduler::SharedClock;
use crate::zoom::{reference_from_text, ZoomReference};

/// One event as exported by a calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub external_id: String,
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default = "default_source")]
    pub source: MeetingSource,
}

fn default_source() -> MeetingSource {
    MeetingSource::AppleCalendar
}

impl CalendarEvent {
    /// Title, notes, location and URL joined for link extraction.
    pub fn searchable_text(&self) -> String {
        [
            Some(self.title.as_str()),
            self.notes.as_deref(),
            self.location.as_deref(),
            self.url.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn zoom_reference(&self) -> Option<ZoomReference> {
        reference_from_text(&self.searchable_text())
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds().max(0)
    }
}

#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Events overlapping the next `window_days` days.
    async fn fetch_candidate_events(&self, window_days: u32) -> Result<Vec<CalendarEvent>>;
}

/// Reads a JSON array of [`CalendarEvent`] exported by another tool.
pub struct JsonCalendarSource {
    path: PathBuf,
    clock: SharedClock,
}

impl JsonCalendarSource {
    pub fn new(path: impl Into<PathBuf>, clock: SharedClock) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }
}

#[async_trait]
impl CalendarSource for JsonCalendarSource {
    async fn fetch_candidate_events(&self, window_days: u32) -> Result<Vec<CalendarEvent>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read calendar export {:?}", self.path))?;

        let events: Vec<CalendarEvent> =
            serde_json::from_str(&content).context("Failed to parse calendar export")?;

        let now = self.clock.now();
        let horizon = now + Duration::days(i64::from(window_days));
        let total = events.len();
        let in_window: Vec<CalendarEvent> = events
            .into_iter()
            .filter(|e| e.end > now && e.start < horizon)
            .collect();

        debug!(
            "Calendar export {:?}: {} of {} events in the next {} days",
            self.path,
            in_window.len(),
            total,
            window_days
        );
        Ok(in_window)
    }
}

/// Result of merging one sync pass into the existing records.
#[derive(Debug, Default)]
pub struct SyncPlan {
    /// New records to insert and schedule.
    pub added: Vec<MeetingRecord>,
    /// Refreshed copies of existing records; same ids, to be rescheduled.
    pub updated: Vec<MeetingRecord>,
    /// Synced records whose event disappeared.
    pub removed: Vec<Uuid>,
    /// Events dropped for not carrying a Zoom reference.
    pub skipped: usize,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Summary of an applied sync, returned to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub skipped: usize,
}

impl From<&SyncPlan> for SyncSummary {
    fn from(plan: &SyncPlan) -> Self {
        Self {
            added: plan.added.len(),
            updated: plan.updated.len(),
            removed: plan.removed.len(),
            skipped: plan.skipped,
        }
    }
}

/// Work out what a sync pass changes.
///
/// Events are deduped by external id, within the batch and against existing
/// records. Only synced records still `notStarted` are refreshed or removed;
/// anything already joined is left alone. Manual records never take part.
pub fn merge_calendar_events(
    existing: &[MeetingRecord],
    events: Vec<CalendarEvent>,
    default_mode: MeetingMode,
    now: DateTime<Utc>,
) -> SyncPlan {
    let mut plan = SyncPlan::default();
    let mut seen: HashSet<String> = HashSet::new();
    // Events still carrying a Zoom link. A synced record whose event lost its
    // link is removed like one whose event vanished.
    let mut linked: HashSet<String> = HashSet::new();

    for event in events {
        if !seen.insert(event.external_id.clone()) {
            debug!("Duplicate calendar event {} in batch", event.external_id);
            continue;
        }

        let Some(zoom) = event.zoom_reference() else {
            plan.skipped += 1;
            continue;
        };
        linked.insert(event.external_id.clone());

        let current = existing.iter().find(|m| {
            m.source.is_calendar()
                && m.calendar_external_id.as_deref() == Some(event.external_id.as_str())
        });

        match current {
            None => {
                let record = MeetingRecord::new(
                    event.title.clone(),
                    event.start,
                    event.duration_seconds(),
                    Some(zoom),
                    event.source,
                    default_mode,
                    now,
                )
                .with_calendar_id(event.external_id.clone());
                plan.added.push(record);
            }
            Some(record) if record.status == MeetingStatus::NotStarted => {
                let changed = record.title != event.title
                    || record.start_time != event.start
                    || record.duration_seconds != event.duration_seconds()
                    || record.zoom.as_ref() != Some(&zoom);
                if changed {
                    let mut refreshed = record.clone();
                    refreshed.title = event.title.clone();
                    refreshed.start_time = event.start;
                    refreshed.duration_seconds = event.duration_seconds();
                    refreshed.zoom = Some(zoom);
                    refreshed.updated_at = now;
                    plan.updated.push(refreshed);
                }
            }
            Some(_) => {}
        }
    }

    plan.removed = existing
        .iter()
        .filter(|m| {
            m.source.is_calendar()
                && m.status == MeetingStatus::NotStarted
                && m.is_upcoming(now)
                && m
                    .calendar_external_id
                    .as_ref()
                    .is_some_and(|id| !linked.contains(id))
        })
        .map(|m| m.id)
        .collect();

    if !plan.is_empty() {
        info!(
            "Calendar sync: {} new, {} updated, {} removed, {} without Zoom link",
            plan.added.len(),
            plan.updated.len(),
            plan.removed.len(),
            plan.skipped
        );
    }

    plan
}
