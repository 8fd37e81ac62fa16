//! Stricter checks for links and ids typed in by hand.
//!
//! Calendar text is scanned loosely (any digit run counts as an id), but
//! manual entry is gated up front so the user hears about a typo now rather
//! than when auto-join fires.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::link::ZoomReference;

static MANUAL_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://[a-z0-9.-]*\.?zoom\.us/[jsw]/([0-9]+)(?:[?#]\S*)?$")
        .expect("static manual url pattern")
});

pub const MIN_MEETING_ID_DIGITS: usize = 9;
pub const MAX_MEETING_ID_DIGITS: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("duration must be at least one minute")]
    InvalidDuration,
    #[error("invalid Zoom URL '{0}': expected a link like https://zoom.us/j/1234567890")]
    InvalidUrl(String),
    #[error("invalid meeting id '{0}': meeting ids are 9-11 digits")]
    InvalidMeetingId(String),
    #[error("passcode must not contain whitespace")]
    InvalidPasscode,
    #[error("either a Zoom URL or a meeting id is required")]
    MissingReference,
}

/// Validate a hand-typed meeting id. Surrounding whitespace is stripped;
/// anything other than 9-11 ASCII digits after that is rejected.
pub fn validate_meeting_id(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    let all_digits = !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit());
    let len_ok = (MIN_MEETING_ID_DIGITS..=MAX_MEETING_ID_DIGITS).contains(&trimmed.len());

    if all_digits && len_ok {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::InvalidMeetingId(input.to_string()))
    }
}

/// Validate a hand-pasted join URL (`/j/`, `/s/` or `/w/` with a 9-11 digit id).
pub fn validate_meeting_url(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    let valid = MANUAL_URL
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|id| (MIN_MEETING_ID_DIGITS..=MAX_MEETING_ID_DIGITS).contains(&id.as_str().len()))
        .unwrap_or(false);

    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::InvalidUrl(input.to_string()))
    }
}

/// Optional passcode: blank means none.
pub fn validate_passcode(input: Option<&str>) -> Result<Option<String>, ValidationError> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(p) if p.chars().any(char::is_whitespace) => Err(ValidationError::InvalidPasscode),
        Some(p) => Ok(Some(p.to_string())),
    }
}

/// Build a reference from manual input. A URL takes precedence when both
/// are filled in, mirroring the single input-method choice in the form.
pub fn manual_reference(
    url: Option<&str>,
    meeting_id: Option<&str>,
    passcode: Option<&str>,
) -> Result<ZoomReference, ValidationError> {
    let url = url.map(str::trim).filter(|s| !s.is_empty());
    let meeting_id = meeting_id.map(str::trim).filter(|s| !s.is_empty());

    match (url, meeting_id) {
        (Some(url), _) => Ok(ZoomReference::Url {
            url: validate_meeting_url(url)?,
        }),
        (None, Some(id)) => Ok(ZoomReference::MeetingId {
            meeting_id: validate_meeting_id(id)?,
            passcode: validate_passcode(passcode)?,
        }),
        (None, None) => Err(ValidationError::MissingReference),
    }
}
