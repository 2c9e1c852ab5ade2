//! Layered application configuration.
//!
//! Priority: CLI flag > CLI env var > `MHDQA_` env vars > config file > defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::documents::UploadPolicy;

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-Hop Document Question Answering GUI", long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long, env = "BIND_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Disable timeout middleware
    #[arg(long, env = "TIMEOUT_DISABLED")]
    pub timeout_disabled: Option<bool>,

    /// Log output format (`pretty` or `json`)
    #[arg(long, env = "LOG_FORMAT")]
    pub log_format: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub assets: AssetsConfig,
    pub uploads: UploadsConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub timeout_disabled: bool,
    pub request_timeout_secs: u64,
    pub body_limit_mb: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Logo shown in the header ribbon.
    pub logo_path: PathBuf,
    /// Markup/style file injected verbatim into every page.
    pub styles_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadsConfig {
    pub max_file_size_mb: u64,
    pub max_files: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub timeout_minutes: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub format: String,
}

impl ServerConfig {
    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Request timeout; a disabled timeout becomes one year so the layer
    /// type stays the same.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        if self.timeout_disabled {
            Duration::from_secs(365 * 24 * 60 * 60)
        } else {
            Duration::from_secs(self.request_timeout_secs)
        }
    }
}

impl UploadsConfig {
    #[must_use]
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy {
            max_file_size_bytes: self.max_file_size_mb * 1024 * 1024,
            max_files: self.max_files,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_minutes * 60)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8501)?
            .set_default("server.timeout_disabled", false)?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("server.body_limit_mb", 256)?
            .set_default("assets.static_dir", "static")?
            .set_default("assets.logo_path", "static/logo.png")?
            .set_default("assets.styles_path", "static/styles.md")?
            .set_default("uploads.max_file_size_mb", 200)?
            .set_default("uploads.max_files", 20)?
            .set_default("session.timeout_minutes", 30)?
            .set_default("logging.format", "pretty")?;

        // An explicit file must exist; otherwise ./config.{yaml,toml,json} is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. MHDQA_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("MHDQA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(td) = cli.timeout_disabled {
            builder = builder.set_override("server.timeout_disabled", td)?;
        }
        if let Some(format) = cli.log_format {
            builder = builder.set_override("logging.format", format)?;
        }

        builder.build()?.try_deserialize()
    }
}
