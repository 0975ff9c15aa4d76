use std::time::Duration;

use anyhow::{Context, Result};

use crate::pipeline::sections::SectionHeaders;

const DEFAULT_PIPELINE_TIMEOUT_SECS: u64 = 300;
const DEFAULT_HEARTBEAT_SECS: u64 = 15;
const DEFAULT_MIN_JOB_DESCRIPTION_CHARS: usize = 50;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Persistence is disabled when unset.
    pub database_url: Option<String>,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub pipeline_timeout: Duration,
    pub stream_heartbeat: Duration,
    pub min_job_description_chars: usize,
    pub max_upload_bytes: usize,
    pub section_headers: SectionHeaders,
}

/// Per-run knobs handed to the orchestrator and the stream adapter.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub timeout: Duration,
    pub heartbeat: Duration,
    pub section_headers: SectionHeaders,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_PIPELINE_TIMEOUT_SECS),
            heartbeat: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            section_headers: SectionHeaders::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let section_headers = match std::env::var("RESUME_SECTION_HEADERS") {
            Ok(raw) => SectionHeaders::parse_list(&raw)
                .context("RESUME_SECTION_HEADERS must list at least one header")?,
            Err(_) => SectionHeaders::default(),
        };

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            pipeline_timeout: nonzero_secs(
                "PIPELINE_TIMEOUT_SECS",
                parse_env("PIPELINE_TIMEOUT_SECS", DEFAULT_PIPELINE_TIMEOUT_SECS)?,
            )?,
            stream_heartbeat: nonzero_secs(
                "STREAM_HEARTBEAT_SECS",
                parse_env("STREAM_HEARTBEAT_SECS", DEFAULT_HEARTBEAT_SECS)?,
            )?,
            min_job_description_chars: parse_env(
                "MIN_JOB_DESCRIPTION_CHARS",
                DEFAULT_MIN_JOB_DESCRIPTION_CHARS,
            )?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            section_headers,
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            timeout: self.pipeline_timeout,
            heartbeat: self.stream_heartbeat,
            section_headers: self.section_headers.clone(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn nonzero_secs(key: &str, secs: u64) -> Result<Duration> {
    if secs == 0 {
        anyhow::bail!("{key} must be at least 1 second");
    }
    Ok(Duration::from_secs(secs))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
