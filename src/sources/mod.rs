//! Caption sources: independent strategies for turning a video ID into
//! transcript segments.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Segment;

pub mod community;
pub mod official;
pub mod preferred;

pub use community::CommunityScraper;
pub use official::OfficialProbe;
pub use preferred::PreferredLanguage;

pub const YOUTUBE_BASE: &str = "https://www.youtube.com";

pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Which strategy a source implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Unofficial scrape of the player's timed-text feed
    Community,
    /// Watch-page caption tracks filtered by language
    Preferred,
    /// Caption-track listing through the authenticated Data API
    Official,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Community, SourceKind::Preferred, SourceKind::Official];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Community => "community",
            SourceKind::Preferred => "preferred",
            SourceKind::Official => "official",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown caption source '{s}' (expected community, preferred or official)"))
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0}")]
    Failed(String),

    /// Caption tracks are listed server-side but their text is out of reach
    #[error("{count} caption track(s) listed ({}) but their text cannot be downloaded with this API key", .languages.join(", "))]
    CaptionsInaccessible { count: usize, languages: Vec<String> },
}

impl From<eyre::Report> for SourceError {
    fn from(err: eyre::Report) -> Self {
        SourceError::Failed(format!("{err:#}"))
    }
}

/// One way of obtaining a transcript for a video.
///
/// An empty `Ok` is allowed; the resolver treats it as a failure.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch(&self, video_id: &str) -> std::result::Result<Vec<Segment>, SourceError>;
}

#[derive(Debug, Deserialize)]
pub(crate) struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    pub player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    pub caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(rename = "languageCode")]
    pub language_code: String,
    #[serde(rename = "vssId")]
    pub vss_id: Option<String>,
    pub kind: Option<String>,
}

impl CaptionsData {
    pub fn into_tracks(self) -> Vec<CaptionTrack> {
        self.player_captions_tracklist_renderer
            .and_then(|r| r.caption_tracks)
            .unwrap_or_default()
    }
}

/// Fail on a non-2xx response, naming only the numeric status
pub(crate) fn require_success(resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        bail!("{what} returned HTTP {}", status.as_u16());
    }
    Ok(resp)
}

/// Download one caption track's timed-text XML and parse it
pub(crate) async fn fetch_track(client: &reqwest::Client, track: &CaptionTrack) -> Result<Vec<Segment>> {
    debug!("Fetching caption track: lang={} url={}", track.language_code, track.base_url);

    let resp = client.get(&track.base_url).header("User-Agent", USER_AGENT).send().await?;
    let caption_xml = require_success(resp, "caption track")?.text().await?;

    parse_caption_xml(&caption_xml)
}

pub(crate) fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut in_text = false;
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                in_text = true;
                current_start = None;
                current_dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            current_start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            current_dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                in_text = false;
            }
            Ok(Event::Text(ref e)) if in_text => {
                let raw_text = e.unescape().unwrap_or_default().to_string();
                let text = html_escape::decode_html_entities(&raw_text).trim().to_string();
                if !text.is_empty() {
                    segments.push(Segment {
                        text,
                        start: current_start,
                        duration: current_dur,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!("error parsing caption XML: {e}"),
            _ => {}
        }
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("community".parse::<SourceKind>(), Ok(SourceKind::Community));
        assert_eq!(" Official ".parse::<SourceKind>(), Ok(SourceKind::Official));
        assert!("whisper".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_source_error_from_report_keeps_chain() {
        let report = eyre::eyre!("inner cause").wrap_err("outer context");
        let err = SourceError::from(report);
        assert_eq!(err.to_string(), "outer context: inner cause");
    }

    #[tokio::test]
    async fn test_require_success_omits_reason_phrase() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let resp = reqwest::get(server.uri()).await.unwrap();
        let err = require_success(resp, "watch page").unwrap_err();
        assert_eq!(err.to_string(), "watch page returned HTTP 503");
    }

    #[test]
    fn test_parse_caption_xml_basic() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<transcript>
    <text start="0.21" dur="2.34">Hello world</text>
    <text start="2.55" dur="1.50">This is a test</text>
</transcript>"#;

        let segments = parse_caption_xml(xml).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello world");
        assert_eq!(segments[0].start, Some(0.21));
        assert_eq!(segments[0].duration, Some(2.34));
        assert_eq!(segments[1].text, "This is a test");
    }

    #[test]
    fn test_parse_caption_xml_html_entities() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?>
<transcript>
    <text start="0.0" dur="1.0">it&amp;#39;s a &amp;quot;test&amp;quot;</text>
</transcript>"#;

        let segments = parse_caption_xml(xml).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "it's a \"test\"");
    }

    #[test]
    fn test_parse_caption_xml_missing_timing() {
        let xml = r#"<transcript><text>untimed</text><text start="1.0" dur="0.5"/></transcript>"#;
        let segments = parse_caption_xml(xml).unwrap();
        assert_eq!(segments, vec![Segment::text("untimed")]);
    }

    #[test]
    fn test_parse_caption_xml_empty() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript></transcript>"#;
        let segments = parse_caption_xml(xml).unwrap();
        assert!(segments.is_empty());
    }
}
