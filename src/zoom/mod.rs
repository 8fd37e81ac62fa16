//! Zoom meeting references: finding them in calendar text, validating
//! manual input, and normalizing everything to the native deep-link.

pub mod link;
pub mod validate;

pub use link::{
    build_deep_link, extract_meeting_id, extract_passcode, extract_url, reference_from_text,
    ZoomReference,
};
pub use validate::{manual_reference, validate_meeting_id, validate_meeting_url, ValidationError};
