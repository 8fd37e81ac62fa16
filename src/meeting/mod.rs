//! Meeting records and the collection that owns them.
//!
//! A record moves `notStarted → inProgress → processing → {ready | failed}`;
//! only an explicit reschedule puts it back to `notStarted`.

pub mod events;
pub mod manual;
pub mod record;
pub mod stats;
pub mod status;
pub mod store;

pub use events::MeetingEvent;
pub use manual::ManualMeetingInput;
pub use record::{ActionItem, MeetingMode, MeetingNotes, MeetingRecord, MeetingSource};
pub use stats::DashboardStats;
pub use status::{MeetingStatus, TransitionError};
pub use store::MeetingStore;
