use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments; fixed for the
/// process lifetime once parsed.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Image upload and thumbnail generation API")]
pub struct Args {
    /// Host to bind to (overrides PIXELSTORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PIXELSTORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding the primary and thumbnail storage areas
    /// (overrides PIXELSTORE_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("PIXELSTORE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("PIXELSTORE_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing PIXELSTORE_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading PIXELSTORE_PORT"),
        };
        let env_storage =
            env::var("PIXELSTORE_STORAGE_DIR").unwrap_or_else(|_| "./data/images".into());

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
