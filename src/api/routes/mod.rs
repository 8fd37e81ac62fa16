//! API route modules.

pub mod dashboard;
pub mod meetings;
