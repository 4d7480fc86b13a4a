pub mod config;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod metadata;
pub mod prompts;
pub mod resolver;
pub mod server;
pub mod sources;
pub mod youtube;

#[cfg(test)]
pub(crate) mod testing;

use regex::Regex;

use crate::sources::SourceKind;

/// A single captioned segment
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub start: Option<f64>,
    pub duration: Option<f64>,
}

impl Segment {
    /// A segment carrying only text, with no timing information
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: None,
            duration: None,
        }
    }
}

/// Complete transcript for a video, as produced by the first source that succeeded
#[derive(Debug, Clone)]
pub struct Transcript {
    pub video_id: String,
    pub source: SourceKind,
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// Segment texts joined by a single space, in original order
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

const VIDEO_ID_PATTERNS: &[&str] = &[
    r"^([a-zA-Z0-9_-]{11})$",
    r"(?:youtube\.com/watch\?.*v=)([a-zA-Z0-9_-]{11})",
    r"youtu\.be/([a-zA-Z0-9_-]{11})",
    r"youtube\.com/embed/([a-zA-Z0-9_-]{11})",
    r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
];

/// Extract video ID from various YouTube URL formats
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    VIDEO_ID_PATTERNS
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .find_map(|re| re.captures(input).map(|caps| caps[1].to_string()))
}

/// Normalize the `videoId` a client sent: URLs are reduced to their ID, anything
/// else is passed through trimmed. Returns `None` for blank input.
pub fn normalize_video_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(extract_video_id(trimmed).unwrap_or_else(|| trimmed.to_string()))
}
