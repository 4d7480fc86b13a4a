use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::sources::{SourceError, SourceKind};

/// Phrases that mean the video itself cannot be reached
const UNAVAILABLE_PHRASES: &[&str] = &["private", "unavailable"];

/// Phrases that mean the video has no usable captions
const NO_CAPTIONS_PHRASES: &[&str] = &[
    "no automatic captions",
    "could not find automatic captions",
    "transcript is disabled",
    "transcripts disabled",
    "transcript disabled",
    "subtitles are disabled",
    "subtitles disabled",
    "no captions",
    "no caption tracks",
    "no subtitles",
    "no transcript",
];

/// One failed attempt by one caption source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterFailure {
    pub source: SourceKind,
    pub message: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub captions_exist: bool,
}

impl AdapterFailure {
    pub fn new(source: SourceKind, message: impl Into<String>) -> Self {
        Self {
            source,
            message: message.into(),
            captions_exist: false,
        }
    }

    pub fn from_error(source: SourceKind, err: &SourceError) -> Self {
        Self {
            source,
            message: err.to_string(),
            captions_exist: matches!(err, SourceError::CaptionsInaccessible { .. }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionErrorKind {
    NoCaptionsAvailable,
    VideoUnavailable,
    CaptionsExistButInaccessible,
    TranscriptFetchFailed,
}

impl ResolutionErrorKind {
    /// User-facing message; never includes provider text
    pub fn message(&self) -> &'static str {
        match self {
            ResolutionErrorKind::NoCaptionsAvailable => {
                "This video does not have captions available. Please try a video with closed captions enabled."
            }
            ResolutionErrorKind::VideoUnavailable => "This video is private or unavailable.",
            ResolutionErrorKind::CaptionsExistButInaccessible => {
                "Captions exist for this video but could not be retrieved. The API key may not have permission to download them."
            }
            ResolutionErrorKind::TranscriptFetchFailed => "Failed to fetch transcript. Please try again later.",
        }
    }
}

impl fmt::Display for ResolutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The single outcome of a failed resolution, with every attempt that led to it
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ResolutionError {
    pub kind: ResolutionErrorKind,
    pub failures: Vec<AdapterFailure>,
}

impl ResolutionError {
    pub fn from_failures(failures: Vec<AdapterFailure>) -> Self {
        Self {
            kind: classify(&failures),
            failures,
        }
    }
}

fn contains_any(message: &str, phrases: &[&str]) -> bool {
    let message = message.to_lowercase();
    phrases.iter().any(|phrase| message.contains(phrase))
}

/// Classify the whole failure set into one kind.
///
/// Precedence: unavailable video, then captions that exist but cannot be
/// downloaded, then missing captions, then the generic fallback. Position in
/// the set does not matter.
pub fn classify(failures: &[AdapterFailure]) -> ResolutionErrorKind {
    if failures.iter().any(|f| contains_any(&f.message, UNAVAILABLE_PHRASES)) {
        ResolutionErrorKind::VideoUnavailable
    } else if failures.iter().any(|f| f.captions_exist) {
        ResolutionErrorKind::CaptionsExistButInaccessible
    } else if failures.iter().any(|f| contains_any(&f.message, NO_CAPTIONS_PHRASES)) {
        ResolutionErrorKind::NoCaptionsAvailable
    } else {
        ResolutionErrorKind::TranscriptFetchFailed
    }
}
