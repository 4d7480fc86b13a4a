use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use eyre::{Result, WrapErr};
use log::{info, warn};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::handlers::{self, ApiError};
use crate::llm::{self, CompletionClient};
use crate::metadata::MetadataLookup;
use crate::resolver::TranscriptResolver;
use crate::sources::{CaptionSource, CommunityScraper, OfficialProbe, PreferredLanguage, SourceKind};
use crate::youtube::DataApi;

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<TranscriptResolver>,
    /// `None` when no YouTube API key is configured
    pub metadata: Option<Arc<dyn MetadataLookup>>,
    /// `None` when no key for the configured model's provider is available
    pub llm: Option<Arc<dyn CompletionClient>>,
    pub max_tokens: u32,
}

impl AppState {
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let data_api = config
            .youtube_api_key
            .as_ref()
            .map(|key| DataApi::new(client.clone(), key.clone()));

        let mut sources: Vec<Arc<dyn CaptionSource>> = Vec::with_capacity(config.sources.len());
        for kind in &config.sources {
            match kind {
                SourceKind::Community => sources.push(Arc::new(CommunityScraper::new(client.clone()))),
                SourceKind::Preferred => {
                    sources.push(Arc::new(PreferredLanguage::new(client.clone(), config.language.clone())))
                }
                SourceKind::Official => match &data_api {
                    Some(api) => sources.push(Arc::new(OfficialProbe::new(api.clone()))),
                    None => warn!("Skipping official caption source: no YouTube API key configured"),
                },
            }
        }

        let resolver = TranscriptResolver::new(sources).with_timeout(config.source_timeout());
        info!("Caption sources in order: {:?}", resolver.order());

        let llm = match config.llm_api_key() {
            Some(key) => Some(llm::client_for_model(
                client,
                key,
                &config.model,
                config.llm_base_url.as_deref(),
            )),
            None => {
                warn!("No API key for model {}: AI endpoints are disabled", config.model);
                None
            }
        };

        Self {
            resolver: Arc::new(resolver),
            metadata: data_api.map(|api| Arc::new(api) as Arc<dyn MetadataLookup>),
            llm,
            max_tokens: config.max_tokens,
        }
    }

    pub(crate) fn llm(&self) -> Result<&Arc<dyn CompletionClient>, ApiError> {
        self.llm.as_ref().ok_or(ApiError::MissingConfiguration("LLM API key"))
    }
}

/// Build the Axum router with all routes.
///
/// Anything outside `/api` and `/health` falls through to the static directory
/// when one is given.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/api/convert", post(handlers::convert))
        .route("/api/ask-ai", post(handlers::ask_ai))
        .route("/api/summarize", post(handlers::summarize))
        .route("/api/expand-summary", post(handlers::expand_summary))
        .route("/health", get(handlers::health))
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(middleware::from_fn(log_requests))
        .layer(CorsLayer::permissive())
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        "{method} {path} -> {} ({}ms)",
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

/// Bind and serve until Ctrl+C.
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let static_dir = config.static_dir.as_deref().filter(|dir| {
        let exists = dir.is_dir();
        if !exists {
            warn!("Static directory {} not found; serving API only", dir.display());
        }
        exists
    });
    let router = build_router(state, static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {err}");
    }
}
