use async_trait::async_trait;
use log::debug;

use super::{CaptionSource, SourceError, SourceKind};
use crate::Segment;
use crate::youtube::DataApi;

/// Asks the Data API whether caption tracks exist.
///
/// Downloading caption text needs OAuth on the video owner's behalf, so this
/// source never succeeds: it either reports that tracks exist but are out of
/// reach, or that there are none.
pub struct OfficialProbe {
    api: DataApi,
}

impl OfficialProbe {
    pub fn new(api: DataApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CaptionSource for OfficialProbe {
    fn kind(&self) -> SourceKind {
        SourceKind::Official
    }

    async fn fetch(&self, video_id: &str) -> Result<Vec<Segment>, SourceError> {
        let tracks = self.api.caption_tracks(video_id).await?;
        for track in &tracks {
            debug!(
                "Data API lists caption track for {video_id}: lang={} kind={}",
                track.language,
                track.track_kind.as_deref().unwrap_or("unknown")
            );
        }

        if tracks.is_empty() {
            return Err(SourceError::Failed(format!("no caption tracks listed for video {video_id}")));
        }

        Err(SourceError::CaptionsInaccessible {
            count: tracks.len(),
            languages: tracks.into_iter().map(|t| t.language).collect(),
        })
    }
}
