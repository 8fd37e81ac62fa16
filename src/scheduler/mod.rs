//! Time-windowed actions per meeting: join, end and reminder timers.

pub mod clock;
pub mod timers;

pub use clock::{Clock, SharedClock, SystemClock, TokioClock};
pub use timers::{JoinScheduler, PendingTimer, ScheduleOutcome, TimerKind};
