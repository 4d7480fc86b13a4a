use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Result, WrapErr, bail};
use log::debug;
use serde::Deserialize;

use crate::llm::is_anthropic_model;
use crate::prompts::DEFAULT_MAX_TOKENS;
use crate::sources::SourceKind;
use crate::sources::preferred::DEFAULT_LANGUAGE;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub youtube_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub model: String,
    /// Override for the LLM provider's base URL (OpenAI-compatible gateways)
    pub llm_base_url: Option<String>,
    pub max_tokens: u32,
    /// Caption sources in the order they are attempted
    pub sources: Vec<SourceKind>,
    pub language: String,
    pub source_timeout_secs: u64,
    pub static_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            youtube_api_key: None,
            openai_api_key: None,
            anthropic_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            llm_base_url: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            sources: SourceKind::ALL.to_vec(),
            language: DEFAULT_LANGUAGE.to_string(),
            source_timeout_secs: 10,
            static_dir: Some(PathBuf::from("public")),
        }
    }
}

impl Config {
    /// Load config from ~/.config/ytqa/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content =
            std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&content).wrap_err_with(|| format!("invalid config {}", path.display()))
    }

    /// Parse config file contents; blank keys count as unset
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        for key in [
            &mut config.youtube_api_key,
            &mut config.openai_api_key,
            &mut config.anthropic_api_key,
            &mut config.llm_base_url,
        ] {
            if key.as_deref().is_some_and(|k| k.trim().is_empty()) {
                *key = None;
            }
        }
        if config.source_timeout_secs == 0 {
            bail!("source_timeout_secs must be greater than zero");
        }
        Ok(config)
    }

    /// Apply environment overrides from the process environment
    pub fn with_env(self) -> Result<Self> {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    pub fn with_env_from(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup("YOUTUBE_API_KEY") {
            self.youtube_api_key = Some(key);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            self.anthropic_api_key = Some(key);
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.model = model;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .wrap_err_with(|| format!("PORT must be a port number, got '{port}'"))?;
        }
        Ok(self)
    }

    /// Key for whichever provider serves the configured model
    pub fn llm_api_key(&self) -> Option<&str> {
        if is_anthropic_model(&self.model) {
            self.anthropic_api_key.as_deref()
        } else {
            self.openai_api_key.as_deref()
        }
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytqa")
        .join("config.toml")
}
