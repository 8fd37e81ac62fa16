//! Zoom link extraction from free-form calendar text.
//!
//! Calendar invites put the join link anywhere: the location field, the
//! notes body, a dedicated URL field, or buried in prose. Everything here
//! resolves ambiguity to "no match" rather than failing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Web join URLs, tried in priority order over the whole text.
static URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)https?://[a-z0-9.-]*\.?zoom\.us/j/[0-9]+(?:\?pwd=[a-z0-9]+)?",
        r"(?i)https?://[a-z0-9.-]*\.?zoom\.us/[sw]/[0-9]+(?:\?\S*)?",
        r"(?i)zoommtg://\S+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static zoom url pattern"))
    .collect()
});

static MEETING_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"/j/([0-9]+)", r"/s/([0-9]+)", r"confno=([0-9]+)", r"confno%3D([0-9]+)"]
        .iter()
        .map(|p| Regex::new(p).expect("static meeting id pattern"))
        .collect()
});

static PASSCODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"pwd=([a-zA-Z0-9]+)", r"pwd%3D([a-zA-Z0-9]+)"]
        .iter()
        .map(|p| Regex::new(p).expect("static passcode pattern"))
        .collect()
});

const DEEP_LINK_BASE: &str = "zoommtg://zoom.us/join";

/// How a meeting points at its Zoom room.
///
/// Exactly one of the two forms is user supplied: calendar events and
/// pasted links carry a URL, manual entry may carry a bare id + passcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ZoomReference {
    Url {
        url: String,
    },
    #[serde(rename_all = "camelCase")]
    MeetingId {
        meeting_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        passcode: Option<String>,
    },
}

impl ZoomReference {
    /// Whether this reference is enough to attempt a join.
    pub fn is_joinable(&self) -> bool {
        match self {
            Self::Url { url } => !url.trim().is_empty(),
            Self::MeetingId { meeting_id, .. } => !meeting_id.is_empty(),
        }
    }

    /// The URL handed to the deep-link opener.
    ///
    /// Web URLs are rewritten to the canonical `zoommtg://` form whenever a
    /// meeting id can be pulled out of them; otherwise the original URL is
    /// used verbatim.
    pub fn join_url(&self) -> Option<String> {
        if !self.is_joinable() {
            return None;
        }

        match self {
            Self::Url { url } => match extract_meeting_id(url) {
                Some(meeting_id) => {
                    let passcode = extract_passcode(url).unwrap_or_default();
                    Some(build_deep_link(&meeting_id, &passcode))
                }
                None => {
                    debug!("No meeting id in {}, opening it verbatim", url);
                    Some(url.clone())
                }
            },
            Self::MeetingId {
                meeting_id,
                passcode,
            } => Some(build_deep_link(
                meeting_id,
                passcode.as_deref().unwrap_or(""),
            )),
        }
    }
}

/// Find the first Zoom link in `text`.
///
/// Patterns are tried in priority order (`/j/` links, then `/s/` and `/w/`,
/// then native `zoommtg://` links); the first pattern with any match wins
/// even if a lower-priority link appears earlier in the text.
pub fn extract_url(text: &str) -> Option<String> {
    URL_PATTERNS
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().to_string())
}

/// Pull the numeric meeting id out of a URL or text.
pub fn extract_meeting_id(url_or_text: &str) -> Option<String> {
    first_capture(&MEETING_ID_PATTERNS, url_or_text)
}

/// Pull the passcode out of a URL or text. Passcodes are optional.
pub fn extract_passcode(url_or_text: &str) -> Option<String> {
    first_capture(&PASSCODE_PATTERNS, url_or_text)
}

/// Canonical native-client join link.
pub fn build_deep_link(meeting_id: &str, passcode: &str) -> String {
    format!(
        "{}?confno={}&pwd={}&zc=0&stype=100",
        DEEP_LINK_BASE, meeting_id, passcode
    )
}

/// Scan calendar text and return a reference if it carries a Zoom link.
pub fn reference_from_text(text: &str) -> Option<ZoomReference> {
    extract_url(text).map(|url| ZoomReference::Url { url })
}

fn first_capture(patterns: &[Regex], haystack: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(haystack)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|s| !s.is_empty())
    })
}
