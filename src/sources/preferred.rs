use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;

use super::{
    CaptionSource, CaptionTrack, CaptionsData, SourceError, SourceKind, USER_AGENT, YOUTUBE_BASE, fetch_track,
    require_success,
};
use crate::Segment;

pub const DEFAULT_LANGUAGE: &str = "en";

const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";
const CAPTIONS_MARKER: &str = "\"captions\":";

/// Reads the caption tracks embedded in the watch page and downloads the one
/// matching the preferred language.
///
/// A video without a track in that language yields an empty result, not an error.
pub struct PreferredLanguage {
    client: reqwest::Client,
    base_url: String,
    language: String,
}

impl PreferredLanguage {
    pub fn new(client: reqwest::Client, language: impl Into<String>) -> Self {
        Self {
            client,
            base_url: YOUTUBE_BASE.to_string(),
            language: language.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn extract(&self, video_id: &str) -> Result<Vec<Segment>> {
        let watch_url = format!("{}/watch?v={video_id}", self.base_url);
        debug!("Fetching watch page: {watch_url}");

        let resp = self
            .client
            .get(&watch_url)
            .header("User-Agent", USER_AGENT)
            .header("Accept-Language", self.language.as_str())
            .send()
            .await?;
        let page_html = require_success(resp, "watch page")?.text().await?;

        let tracks = extract_caption_tracks(&page_html)?;
        let Some(track) = select_track(&tracks, &self.language) else {
            debug!("No '{}' caption track for {video_id} ({} tracks listed)", self.language, tracks.len());
            return Ok(Vec::new());
        };

        fetch_track(&self.client, track).await
    }
}

#[async_trait]
impl CaptionSource for PreferredLanguage {
    fn kind(&self) -> SourceKind {
        SourceKind::Preferred
    }

    async fn fetch(&self, video_id: &str) -> std::result::Result<Vec<Segment>, SourceError> {
        Ok(self.extract(video_id).await?)
    }
}

/// Pull the `captions` object out of the player response inlined in the page.
///
/// A page without a player response (consent or bot-check interstitials) is an
/// error; a player response without captions has no tracks.
fn extract_caption_tracks(html: &str) -> Result<Vec<CaptionTrack>> {
    let Some(player_start) = html.find(PLAYER_RESPONSE_MARKER) else {
        bail!("watch page has no player response");
    };
    let player = &html[player_start..];

    let Some(start) = player.find(CAPTIONS_MARKER) else {
        return Ok(Vec::new());
    };

    let rest = &player[start + CAPTIONS_MARKER.len()..];
    let captions = serde_json::Deserializer::from_str(rest)
        .into_iter::<CaptionsData>()
        .next()
        .transpose()?;

    Ok(captions.map(CaptionsData::into_tracks).unwrap_or_default())
}

/// Manual track in the language first, then the automatic one, then any track
/// whose language code matches
fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let manual = format!(".{language}");
    let automatic = format!("a.{language}");

    tracks
        .iter()
        .find(|t| t.vss_id.as_deref() == Some(manual.as_str()))
        .or_else(|| tracks.iter().find(|t| t.vss_id.as_deref() == Some(automatic.as_str())))
        .or_else(|| tracks.iter().find(|t| t.language_code == language))
}
