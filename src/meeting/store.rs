//! The meeting collection owned by the orchestrator.
//!
//! Every mutation goes through this type, which persists the full list and
//! notifies observers afterwards. Save failures are logged, never fatal.

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use super::events::MeetingEvent;
use super::record::MeetingRecord;
use crate::persistence::MeetingPersistence;

pub struct MeetingStore {
    meetings: Vec<MeetingRecord>,
    persistence: Box<dyn MeetingPersistence>,
    events: broadcast::Sender<MeetingEvent>,
}

impl MeetingStore {
    pub fn load(
        persistence: Box<dyn MeetingPersistence>,
        events: broadcast::Sender<MeetingEvent>,
    ) -> Result<Self> {
        let mut meetings = persistence.load_all()?;
        sort_meetings(&mut meetings);
        Ok(Self {
            meetings,
            persistence,
            events,
        })
    }

    pub fn all(&self) -> &[MeetingRecord] {
        &self.meetings
    }

    pub fn len(&self) -> usize {
        self.meetings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meetings.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&MeetingRecord> {
        self.meetings.iter().find(|m| m.id == id)
    }

    pub fn find_by_calendar_id(&self, external_id: &str) -> Option<&MeetingRecord> {
        self.meetings
            .iter()
            .find(|m| m.calendar_external_id.as_deref() == Some(external_id))
    }

    pub fn insert(&mut self, record: MeetingRecord) {
        debug!("Adding meeting '{}' ({})", record.title, record.id);
        self.meetings.push(record);
        sort_meetings(&mut self.meetings);
        self.commit();
    }

    pub fn remove(&mut self, id: Uuid) -> Option<MeetingRecord> {
        let index = self.meetings.iter().position(|m| m.id == id)?;
        let removed = self.meetings.remove(index);
        self.commit();
        Some(removed)
    }

    /// Mutate one record in place. Status changes made by `f` are announced
    /// as [`MeetingEvent::StatusChanged`]. Returns `None` for unknown ids.
    pub fn update<T>(&mut self, id: Uuid, f: impl FnOnce(&mut MeetingRecord) -> T) -> Option<T> {
        let record = self.meetings.iter_mut().find(|m| m.id == id)?;
        let before = record.status;
        let before_start = record.start_time;

        let result = f(record);

        let after = record.status;
        if record.start_time != before_start {
            sort_meetings(&mut self.meetings);
        }
        if before != after {
            self.emit(MeetingEvent::StatusChanged {
                meeting_id: id,
                from: before,
                to: after,
            });
        }
        self.commit();
        Some(result)
    }

    pub fn emit(&self, event: MeetingEvent) {
        // No subscribers is fine; the UI may not be attached.
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MeetingEvent> {
        self.events.subscribe()
    }

    fn commit(&self) {
        if let Err(e) = self.persistence.save_all(&self.meetings) {
            warn!("Failed to save meetings: {:#}", e);
        }
        self.emit(MeetingEvent::RecordsChanged {
            count: self.meetings.len(),
        });
    }
}

fn sort_meetings(meetings: &mut [MeetingRecord]) {
    meetings.sort_by_key(|m| m.start_time);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::{MeetingMode, MeetingSource, MeetingStatus};
    use crate::persistence::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    struct SharedStore(Arc<MemoryStore>);

    impl MeetingPersistence for SharedStore {
        fn load_all(&self) -> Result<Vec<MeetingRecord>> {
            self.0.load_all()
        }

        fn save_all(&self, meetings: &[MeetingRecord]) -> Result<()> {
            self.0.save_all(meetings)
        }
    }

    fn record(title: &str, hour: u32) -> MeetingRecord {
        let now = Utc.with_ymd_and_hms(2025, 11, 21, 8, 0, 0).unwrap();
        MeetingRecord::new(
            title,
            Utc.with_ymd_and_hms(2025, 11, 21, hour, 0, 0).unwrap(),
            1800,
            None,
            MeetingSource::Manual,
            MeetingMode::Transparent,
            now,
        )
    }

    #[test]
    fn test_insert_sorts_and_persists() {
        let backing = Arc::new(MemoryStore::default());
        let (tx, mut rx) = broadcast::channel(16);
        let mut store = MeetingStore::load(Box::new(SharedStore(backing.clone())), tx).unwrap();

        store.insert(record("late", 15));
        store.insert(record("early", 9));

        let titles: Vec<_> = store.all().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["early", "late"]);
        assert_eq!(backing.load_all().unwrap().len(), 2);
        assert_eq!(rx.try_recv().unwrap(), MeetingEvent::RecordsChanged { count: 1 });
        assert_eq!(rx.try_recv().unwrap(), MeetingEvent::RecordsChanged { count: 2 });
    }

    #[test]
    fn test_update_emits_status_change() {
        let (tx, mut rx) = broadcast::channel(16);
        let mut store = MeetingStore::load(Box::new(MemoryStore::default()), tx).unwrap();
        let meeting = record("standup", 10);
        let id = meeting.id;
        store.insert(meeting);
        let _ = rx.try_recv();

        let now = Utc::now();
        let result = store.update(id, |m| m.advance(MeetingStatus::InProgress, now));
        assert!(matches!(result, Some(Ok(MeetingStatus::NotStarted))));

        assert_eq!(
            rx.try_recv().unwrap(),
            MeetingEvent::StatusChanged {
                meeting_id: id,
                from: MeetingStatus::NotStarted,
                to: MeetingStatus::InProgress,
            }
        );
        assert_eq!(rx.try_recv().unwrap(), MeetingEvent::RecordsChanged { count: 1 });
    }

    #[test]
    fn test_update_unknown_id() {
        let (tx, _rx) = broadcast::channel(16);
        let mut store = MeetingStore::load(Box::new(MemoryStore::default()), tx).unwrap();
        assert!(store.update(Uuid::new_v4(), |_| ()).is_none());
    }

    #[test]
    fn test_update_resorts_on_time_change() {
        let (tx, _rx) = broadcast::channel(16);
        let mut store = MeetingStore::load(Box::new(MemoryStore::default()), tx).unwrap();
        let first = record("first", 9);
        let id = first.id;
        store.insert(first);
        store.insert(record("second", 10));

        store.update(id, |m| m.start_time += Duration::hours(3));
        assert_eq!(store.all()[1].id, id);
    }

    #[test]
    fn test_remove_and_lookup() {
        let (tx, _rx) = broadcast::channel(16);
        let mut store = MeetingStore::load(Box::new(MemoryStore::default()), tx).unwrap();
        let meeting = record("synced", 11).with_calendar_id("evt-1");
        let id = meeting.id;
        store.insert(meeting);

        assert_eq!(store.find_by_calendar_id("evt-1").map(|m| m.id), Some(id));
        assert!(store.remove(id).is_some());
        assert!(store.remove(id).is_none());
        assert!(store.is_empty());
    }
}
