use chrono::{DateTime, Utc};
use serde::Serialize;

use super::record::MeetingRecord;
use super::status::MeetingStatus;

/// Summary figures shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_meetings: usize,
    pub upcoming_meetings: usize,
    pub completed_today: usize,
    /// Hours, rounded to one decimal.
    pub total_hours_recorded: f64,
    /// Minutes, rounded.
    pub average_meeting_duration: i64,
    pub notes_generated: usize,
}

impl DashboardStats {
    pub fn compute(meetings: &[MeetingRecord], now: DateTime<Utc>) -> Self {
        let recorded: Vec<&MeetingRecord> = meetings.iter().filter(|m| was_recorded(m)).collect();

        let upcoming_meetings = meetings
            .iter()
            .filter(|m| m.start_time > now && m.status == MeetingStatus::NotStarted)
            .count();

        let today = now.date_naive();
        let completed_today = recorded
            .iter()
            .filter(|m| m.start_time.date_naive() == today)
            .count();

        let recorded_seconds: i64 = recorded.iter().map(|m| m.duration_seconds).sum();
        let total_hours = recorded_seconds as f64 / 3600.0;

        let average_minutes = if recorded.is_empty() {
            0.0
        } else {
            recorded_seconds as f64 / recorded.len() as f64 / 60.0
        };

        let notes_generated = meetings
            .iter()
            .filter(|m| m.notes.is_some() && m.status == MeetingStatus::Ready)
            .count();

        Self {
            total_meetings: meetings.len(),
            upcoming_meetings,
            completed_today,
            total_hours_recorded: (total_hours * 10.0).round() / 10.0,
            average_meeting_duration: average_minutes.round() as i64,
            notes_generated,
        }
    }
}

fn was_recorded(meeting: &MeetingRecord) -> bool {
    matches!(
        meeting.status,
        MeetingStatus::Ready | MeetingStatus::Processing
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::{MeetingMode, MeetingNotes, MeetingSource};
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, day, hour, 0, 0).unwrap()
    }

    fn meeting(start: DateTime<Utc>, duration: i64, status: MeetingStatus) -> MeetingRecord {
        let mut m = MeetingRecord::new(
            "m",
            start,
            duration,
            None,
            MeetingSource::Manual,
            MeetingMode::Incognito,
            at(1, 0),
        );
        m.status = status;
        m
    }

    #[test]
    fn test_empty_list() {
        let stats = DashboardStats::compute(&[], at(21, 12));
        assert_eq!(stats.total_meetings, 0);
        assert_eq!(stats.average_meeting_duration, 0);
        assert_eq!(stats.total_hours_recorded, 0.0);
    }

    #[test]
    fn test_mixed_statuses() {
        let now = at(21, 12);
        let mut with_notes = meeting(at(21, 9), 3600, MeetingStatus::Ready);
        with_notes.notes = Some(MeetingNotes {
            summary: "done".to_string(),
            key_takeaways: vec![],
            action_items: vec![],
            full_transcript: None,
            generated_at: now,
            model: "test".to_string(),
        });

        let meetings = vec![
            with_notes,
            meeting(at(21, 10), 1800, MeetingStatus::Processing),
            meeting(at(20, 10), 1200, MeetingStatus::Ready),
            meeting(at(21, 11), 900, MeetingStatus::Failed),
            meeting(at(21, 15), 900, MeetingStatus::NotStarted),
            meeting(at(22, 15), 900, MeetingStatus::NotStarted),
            meeting(at(21, 8), 900, MeetingStatus::NotStarted),
        ];

        let stats = DashboardStats::compute(&meetings, now);
        assert_eq!(stats.total_meetings, 7);
        assert_eq!(stats.upcoming_meetings, 2);
        assert_eq!(stats.completed_today, 2);
        // 3600 + 1800 + 1200 seconds = 1.83h
        assert_eq!(stats.total_hours_recorded, 1.8);
        // 6600 / 3 / 60 = 36.7
        assert_eq!(stats.average_meeting_duration, 37);
        assert_eq!(stats.notes_generated, 1);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(DashboardStats::compute(&[], at(21, 12))).unwrap();
        assert!(json.get("totalHoursRecorded").is_some());
        assert!(json.get("averageMeetingDuration").is_some());
    }
}
