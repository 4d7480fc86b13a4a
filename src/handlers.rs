//! HTTP endpoints. Every response body carries `success`.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::error::{ResolutionError, ResolutionErrorKind};
use crate::prompts::{self, HistoryEntry};
use crate::server::AppState;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Video not found")]
    VideoNotFound,

    #[error("{0} is not configured")]
    MissingConfiguration(&'static str),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// An upstream call failed; the cause only goes into `details`
    #[error("{message}")]
    Upstream { message: &'static str, details: String },
}

impl ApiError {
    fn upstream(message: &'static str, err: eyre::Report) -> Self {
        ApiError::Upstream {
            message,
            details: format!("{err:#}"),
        }
    }

    fn required(field: &str) -> Self {
        ApiError::BadRequest(format!("{field} is required"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::VideoNotFound => StatusCode::NOT_FOUND,
            ApiError::MissingConfiguration(_) | ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Resolution(err) => match err.kind {
                ResolutionErrorKind::NoCaptionsAvailable => StatusCode::BAD_REQUEST,
                ResolutionErrorKind::VideoUnavailable => StatusCode::NOT_FOUND,
                ResolutionErrorKind::CaptionsExistButInaccessible | ResolutionErrorKind::TranscriptFetchFailed => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::Resolution(err) => Some(json!(err.failures)),
            ApiError::Upstream { details, .. } => Some(Value::String(details.clone())),
            _ => None,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self}: {:?}", self.details());
        } else {
            warn!("{self}");
        }

        let mut body = json!({
            "success": false,
            "error": self.to_string(),
        });
        if let Some(details) = self.details() {
            body["details"] = details;
        }
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// A required string field: present and not blank
fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::required(field))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub success: bool,
    pub text: String,
    pub video_title: String,
}

pub async fn convert(
    State(state): State<AppState>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> ApiResult<ConvertResponse> {
    let Json(request) = payload?;
    let video_id = request
        .video_id
        .as_deref()
        .and_then(crate::normalize_video_id)
        .ok_or_else(|| ApiError::BadRequest("Video ID is required".to_string()))?;

    let metadata = state
        .metadata
        .as_ref()
        .ok_or(ApiError::MissingConfiguration("YouTube API key"))?;
    let video = metadata
        .lookup(&video_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch video details", e))?;
    if !video.exists {
        return Err(ApiError::VideoNotFound);
    }

    let transcript = state.resolver.resolve(&video_id).await?;

    Ok(Json(ConvertResponse {
        success: true,
        text: transcript.text(),
        video_title: video.title.unwrap_or_default(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub success: bool,
    pub answer: String,
}

pub async fn ask_ai(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<AskResponse> {
    let Json(request) = payload?;
    let question = required(&request.question, "question")?;
    let transcript = required(&request.transcript, "transcript")?;
    let llm = state.llm()?;

    let completion = prompts::ask(question, transcript, &request.history, state.max_tokens);
    let answer = llm
        .complete(&completion)
        .await
        .map_err(|e| ApiError::upstream("Failed to get AI response", e))?;

    Ok(Json(AskResponse { success: true, answer }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub current_summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: String,
}

pub async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> ApiResult<SummaryResponse> {
    let Json(request) = payload?;
    let text = required(&request.text, "text")?;
    let llm = state.llm()?;

    let summary = llm
        .complete(&prompts::summarize(text, state.max_tokens))
        .await
        .map_err(|e| ApiError::upstream("Failed to generate summary", e))?;

    Ok(Json(SummaryResponse { success: true, summary }))
}

pub async fn expand_summary(
    State(state): State<AppState>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> ApiResult<SummaryResponse> {
    let Json(request) = payload?;
    let text = required(&request.text, "text")?;
    let current = required(&request.current_summary, "currentSummary")?;
    let llm = state.llm()?;

    let addition = llm
        .complete(&prompts::expand(text, current, state.max_tokens))
        .await
        .map_err(|e| ApiError::upstream("Failed to expand summary", e))?;

    Ok(Json(SummaryResponse {
        success: true,
        summary: prompts::append_sentences(current, &addition),
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sources": state.resolver.order(),
        "metadata": state.metadata.is_some(),
        "llm": state.llm.is_some(),
    }))
}
