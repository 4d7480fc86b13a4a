//! Scripted stand-ins for the network-facing traits.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use eyre::{Result, bail};

use crate::Segment;
use crate::llm::{CompletionClient, CompletionRequest};
use crate::metadata::{MetadataLookup, VideoMetadata};
use crate::sources::{CaptionSource, SourceError, SourceKind};

#[derive(Clone)]
pub enum Script {
    Segments(Vec<&'static str>),
    Fail(&'static str),
    CaptionsExist(usize),
    Hang,
}

/// A caption source that always answers the same way and counts its calls
pub struct ScriptedSource {
    kind: SourceKind,
    script: Script,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(kind: SourceKind, script: Script) -> Self {
        Self {
            kind,
            script,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl CaptionSource for ScriptedSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self, _video_id: &str) -> std::result::Result<Vec<Segment>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Segments(texts) => Ok(texts.iter().map(|t| Segment::text(*t)).collect()),
            Script::Fail(message) => Err(SourceError::Failed(message.to_string())),
            Script::CaptionsExist(count) => Err(SourceError::CaptionsInaccessible {
                count: *count,
                languages: vec!["en".to_string(); *count],
            }),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }
}

pub struct StaticMetadata {
    pub result: std::result::Result<VideoMetadata, &'static str>,
    pub calls: AtomicUsize,
}

impl StaticMetadata {
    pub fn found(title: &str) -> Self {
        Self::with(Ok(VideoMetadata {
            exists: true,
            title: Some(title.to_string()),
        }))
    }

    pub fn missing() -> Self {
        Self::with(Ok(VideoMetadata::missing()))
    }

    pub fn failing(message: &'static str) -> Self {
        Self::with(Err(message))
    }

    fn with(result: std::result::Result<VideoMetadata, &'static str>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MetadataLookup for StaticMetadata {
    async fn lookup(&self, _video_id: &str) -> Result<VideoMetadata> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.result {
            Ok(meta) => Ok(meta.clone()),
            Err(message) => bail!("{message}"),
        }
    }
}

/// Returns a canned reply and keeps every request it was sent
pub struct RecordingLlm {
    reply: std::result::Result<String, &'static str>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl RecordingLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &'static str) -> Self {
        Self {
            reply: Err(message),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().ok()?.last().cloned()
    }
}

#[async_trait]
impl CompletionClient for RecordingLlm {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(message) => bail!("{message}"),
        }
    }
}
