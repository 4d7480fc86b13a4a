use async_trait::async_trait;
use eyre::Result;

use crate::youtube::DataApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub exists: bool,
    pub title: Option<String>,
}

impl VideoMetadata {
    pub fn missing() -> Self {
        Self {
            exists: false,
            title: None,
        }
    }
}

/// Existence and title of a video, checked before any transcript work
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn lookup(&self, video_id: &str) -> Result<VideoMetadata>;
}

#[async_trait]
impl MetadataLookup for DataApi {
    async fn lookup(&self, video_id: &str) -> Result<VideoMetadata> {
        Ok(match self.video_snippet(video_id).await? {
            Some(snippet) => VideoMetadata {
                exists: true,
                title: Some(snippet.title),
            },
            None => VideoMetadata::missing(),
        })
    }
}
