use std::path::Path;

use clap::Parser;
use eyre::{Result, WrapErr};
use log::info;
use ytqa::config::{self, Config};
use ytqa::server::{self, AppState};

mod cli;

use cli::Cli;

fn setup_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let target = Box::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("failed to open log file {}", path.display()))?,
        );
        builder.target(env_logger::Target::Pipe(target));
    }

    builder.init();
    if let Some(path) = log_file {
        info!("Logging initialized: {}", path.display());
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let mut config = config.with_env()?;

    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(dir) = &cli.static_dir {
        config.static_dir = Some(dir.clone());
    }
    if let Some(sources) = &cli.sources {
        config.sources = sources.clone();
    }
    if let Some(lang) = &cli.lang {
        config.language = lang.clone();
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_file.as_deref())?;

    let config = load_config(&cli)?;
    if cli.config.is_none() && config::config_path().exists() {
        info!("Config: {}", config::config_path().display());
    }

    let client = reqwest::Client::builder()
        .build()
        .wrap_err("failed to build HTTP client")?;
    let state = AppState::from_config(&config, client);

    server::serve(&config, state).await
}
