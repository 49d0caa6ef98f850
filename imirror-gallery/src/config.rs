//! Service configuration resolution
//!
//! Every setting resolves CLI flag first, then environment variable, then
//! the TOML config file, then the compiled default. The resolved value is
//! an explicit struct injected into AppState; nothing reads configuration
//! ambiently after startup.

use clap::Parser;
use imirror_common::config::{self, FileConfig};
use imirror_common::{Error, Result};

pub const DEFAULT_PORT: u16 = 5861;
pub const DEFAULT_MEDIA_API_URL: &str = "http://127.0.0.1:5000/api";

/// Command-line arguments
#[derive(Debug, Default, Parser)]
#[command(name = "imirror-gallery", about = "iMirror gallery coordination service")]
pub struct CliArgs {
    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Base URL of the Media API backend
    #[arg(long)]
    pub media_api_url: Option<String>,

    /// Model identifier forwarded to AI generation endpoints
    #[arg(long)]
    pub ai_model: Option<String>,
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub port: u16,
    pub media_api_url: String,
    /// Forwarded to the backend's AI endpoints, never interpreted here
    pub ai_model: Option<String>,
}

impl GalleryConfig {
    pub fn resolve(cli: &CliArgs) -> Result<Self> {
        let file = FileConfig::load_default();
        Self::resolve_with(cli, &file)
    }

    fn resolve_with(cli: &CliArgs, file: &FileConfig) -> Result<Self> {
        let port = match cli.port {
            Some(port) => port,
            None => match std::env::var("IMIRROR_PORT") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|_| Error::Config(format!("invalid IMIRROR_PORT value: {raw}")))?,
                Err(_) => file.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let media_api_url = config::resolve_setting(
            cli.media_api_url.as_deref(),
            "IMIRROR_MEDIA_API_URL",
            file.media_api_url.as_deref(),
            DEFAULT_MEDIA_API_URL,
        );

        let ai_model = cli
            .ai_model
            .clone()
            .or_else(|| std::env::var("IMIRROR_AI_MODEL").ok())
            .or_else(|| file.ai_model.clone());

        Ok(Self { port, media_api_url, ai_model })
    }
}
