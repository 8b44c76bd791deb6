use std::net::SocketAddr;
use std::time::Duration;

use crate::core::errors::{AppError, AppResult};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_MAX_DIFF_LINES: usize = 20_000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Runtime settings read from the process environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub log_level: String,
    pub api_token: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub provider_timeout: Duration,
    pub max_diff_lines: usize,
    pub max_upload_bytes: usize,
    pub session_ttl: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8000))),
            log_level: "info".to_string(),
            api_token: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            provider_timeout: Duration::from_secs(60),
            max_diff_lines: DEFAULT_MAX_DIFF_LINES,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests do not have to
    /// mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let bind = match get("DOCBOT_BIND") {
            Some(raw) => raw
                .parse()
                .map_err(|err| AppError::InvalidInput(format!("DOCBOT_BIND {raw}: {err}")))?,
            None => defaults.bind,
        };

        Ok(Self {
            bind,
            log_level: get("DOCBOT_LOG")
                .map(|level| level.to_ascii_lowercase())
                .unwrap_or(defaults.log_level),
            api_token: get("DOCBOT_API_TOKEN"),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            provider_timeout: parse_number(&get, "DOCBOT_PROVIDER_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.provider_timeout),
            max_diff_lines: parse_number(&get, "DOCBOT_MAX_DIFF_LINES")?
                .map(|value| value as usize)
                .unwrap_or(defaults.max_diff_lines),
            max_upload_bytes: parse_number(&get, "DOCBOT_MAX_UPLOAD_BYTES")?
                .map(|value| value as usize)
                .unwrap_or(defaults.max_upload_bytes),
            session_ttl: parse_number(&get, "DOCBOT_SESSION_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
        })
    }
}

fn parse_number<G>(get: &G, key: &str) -> AppResult<Option<u64>>
where
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|err| AppError::InvalidInput(format!("{key} {raw}: {err}")))
        })
        .transpose()
}
