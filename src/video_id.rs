//! Video identifier extraction from share/watch URLs

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Recognized URL shapes, tried in order. The first match wins.
static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Mobile short links
        r"^https://youtu\.be/([a-zA-Z0-9_-]+)",
        // Mobile shorts
        r"^https://youtube\.com/shorts/([a-zA-Z0-9_-]+)",
        // Web watch links
        r"^https://www\.youtube\.com/watch\?v=([a-zA-Z0-9_-]+)",
        // Web shorts
        r"^https://www\.youtube\.com/shorts/([a-zA-Z0-9_-]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid url pattern"))
    .collect()
});

/// Opaque identifier naming a video within the provider namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Wrap an already-known identifier, e.g. one passed as a query parameter
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical watch URL for this identifier
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the video identifier from a URL.
///
/// Returns `None` when the input matches none of the recognized shapes.
pub fn extract_video_id(url: &str) -> Option<VideoId> {
    URL_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId(m.as_str().to_string()))
}
