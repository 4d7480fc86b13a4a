use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use regex::Regex;
use serde::Deserialize;

use super::{
    CaptionSource, CaptionsData, SourceError, SourceKind, USER_AGENT, YOUTUBE_BASE, fetch_track, require_success,
};
use crate::Segment;

const CLIENT_VERSION: &str = "2.20241126.01.00";

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

/// Scrapes the player's own caption feed through the InnerTube API.
///
/// Takes whatever track the player lists first, preferring automatic captions;
/// there is no language negotiation.
pub struct CommunityScraper {
    client: reqwest::Client,
    base_url: String,
}

impl CommunityScraper {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: YOUTUBE_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn scrape(&self, video_id: &str) -> Result<Vec<Segment>> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("{}/watch?v={video_id}", self.base_url);
        debug!("Fetching watch page: {watch_url}");

        let resp = self.client.get(&watch_url).header("User-Agent", USER_AGENT).send().await?;
        let page_html = require_success(resp, "watch page")?.text().await?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("{}/youtubei/v1/player?key={api_key}&prettyPrint=false", self.base_url);

        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": "en",
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": CLIENT_VERSION
                }
            },
            "videoId": video_id
        });

        let resp = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        let resp: InnerTubePlayerResponse = require_success(resp, "player endpoint")?.json().await?;

        if let Some(status) = &resp.playability_status {
            check_playability(video_id, status)?;
        }

        let Some(captions) = resp.captions else {
            bail!("Transcript is disabled on this video ({video_id})");
        };

        let tracks = captions.into_tracks();
        let Some(track) = tracks
            .iter()
            .find(|t| t.kind.as_deref() == Some("asr"))
            .or_else(|| tracks.first())
        else {
            bail!("no automatic captions found for video {video_id}");
        };

        fetch_track(&self.client, track).await
    }
}

#[async_trait]
impl CaptionSource for CommunityScraper {
    fn kind(&self) -> SourceKind {
        SourceKind::Community
    }

    async fn fetch(&self, video_id: &str) -> std::result::Result<Vec<Segment>, SourceError> {
        Ok(self.scrape(video_id).await?)
    }
}

fn check_playability(video_id: &str, status: &PlayabilityStatus) -> Result<()> {
    let reason = status.reason.as_deref().unwrap_or("no reason given");
    match status.status.as_str() {
        "OK" => Ok(()),
        "LOGIN_REQUIRED" if reason.to_lowercase().contains("private") => {
            bail!("video {video_id} is private")
        }
        "ERROR" | "UNPLAYABLE" => bail!("video {video_id} is unavailable: {reason}"),
        other => bail!("player refused video {video_id} ({other}): {reason}"),
    }
}

fn extract_api_key(html: &str) -> Result<String> {
    let re = Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#)?;
    if let Some(caps) = re.captures(html) {
        return Ok(caps[1].to_string());
    }

    // Fallback: try the newer pattern
    let re2 = Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#)?;
    if let Some(caps) = re2.captures(html) {
        return Ok(caps[1].to_string());
    }

    bail!("could not extract InnerTube API key from watch page");
}
