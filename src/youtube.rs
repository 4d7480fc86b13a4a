//! Thin client for the official YouTube Data API v3.

use eyre::{Result, bail};
use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub const DATA_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<u16>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Option<VideoSnippet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoSnippet {
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct CaptionItem {
    snippet: CaptionSnippet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptionSnippet {
    pub language: String,
    #[serde(rename = "trackKind")]
    pub track_kind: Option<String>,
}

/// Authenticated Data API client; the key travels as a query parameter.
#[derive(Clone)]
pub struct DataApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl DataApi {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DATA_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `videos.list?part=snippet`; `None` when the ID matches no video
    pub async fn video_snippet(&self, video_id: &str) -> Result<Option<VideoSnippet>> {
        let resp: ListResponse<VideoItem> = self.list("videos", &[("part", "snippet"), ("id", video_id)]).await?;
        Ok(resp.items.into_iter().next().and_then(|item| item.snippet))
    }

    /// `captions.list?part=snippet`; metadata only, never caption text
    pub async fn caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionSnippet>> {
        let resp: ListResponse<CaptionItem> =
            self.list("captions", &[("part", "snippet"), ("videoId", video_id)]).await?;
        Ok(resp.items.into_iter().map(|item| item.snippet).collect())
    }

    async fn list<T: DeserializeOwned>(&self, resource: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{resource}", self.base_url);
        debug!("Data API request: {resource} {params:?}");

        // Strip the URL from transport errors so the key never reaches logs or responses
        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = resp.status();
        if status.is_server_error() {
            bail!("YouTube Data API {resource} returned HTTP {}", status.as_u16());
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!(
                "YouTube Data API {resource} returned HTTP {}: {}",
                status.as_u16(),
                error_message(&body)
            );
        }

        Ok(resp.json().await.map_err(reqwest::Error::without_url)?)
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.code {
            Some(code) => format!("{} (code {code})", envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}
