use std::path::PathBuf;

use clap::Parser;
use ytqa::sources::SourceKind;

#[derive(Parser)]
#[command(
    name = "ytqa",
    about = "Transcript and Q&A backend for YouTube videos",
    version
)]
pub struct Cli {
    /// Port to listen on (overrides PORT and the config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Config file to load instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory of static frontend files
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Caption sources in fallback order, comma separated (community,preferred,official)
    #[arg(long, value_delimiter = ',')]
    pub sources: Option<Vec<SourceKind>>,

    /// Preferred caption language
    #[arg(short, long)]
    pub lang: Option<String>,

    /// LLM model for the AI endpoints
    #[arg(long)]
    pub model: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
