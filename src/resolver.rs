use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::Transcript;
use crate::error::{AdapterFailure, ResolutionError};
use crate::sources::{CaptionSource, SourceKind};

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs caption sources in a fixed order and returns the first non-empty
/// transcript, or one classified error once every source has failed.
pub struct TranscriptResolver {
    sources: Vec<Arc<dyn CaptionSource>>,
    timeout: Duration,
}

impl TranscriptResolver {
    pub fn new(sources: Vec<Arc<dyn CaptionSource>>) -> Self {
        Self {
            sources,
            timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured attempt order
    pub fn order(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    pub async fn resolve(&self, video_id: &str) -> Result<Transcript, ResolutionError> {
        let mut failures = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let kind = source.kind();
            debug!("Trying {kind} source for {video_id}");

            let failure = match tokio::time::timeout(self.timeout, source.fetch(video_id)).await {
                Ok(Ok(segments)) if !segments.is_empty() => {
                    info!("Transcript for {video_id} from {kind} source ({} segments)", segments.len());
                    return Ok(Transcript {
                        video_id: video_id.to_string(),
                        source: kind,
                        segments,
                    });
                }
                Ok(Ok(_)) => AdapterFailure::new(kind, "no transcript segments returned"),
                Ok(Err(err)) => AdapterFailure::from_error(kind, &err),
                Err(_) => AdapterFailure::new(kind, format!("timed out after {}s", self.timeout.as_secs_f32())),
            };

            warn!("{kind} source failed for {video_id}: {}", failure.message);
            failures.push(failure);
        }

        let err = ResolutionError::from_failures(failures);
        warn!("No transcript for {video_id}: {:?}", err.kind);
        Err(err)
    }
}
