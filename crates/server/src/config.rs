// crates/server/src/config.rs
//! Environment-driven application configuration.

use std::path::PathBuf;

use career_log_core::llm::{LlmConfig, ProviderType};
use chrono::NaiveTime;
use chrono_tz::Tz;
use thiserror::Error;

use crate::jobs::publisher::PublisherConfig;
use crate::jobs::scheduler::parse_cron;

pub const DEFAULT_PORT: u16 = 47900;
pub const DEFAULT_TIMEZONE: &str = "Asia/Seoul";
pub const DEFAULT_ANALYSIS_CRON: &str = "0 7 * * *";
pub const DEFAULT_WINDOW_BOUNDARY: &str = "06:00";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid {expected}: {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("invalid cron expression in {var}: {reason}")]
    Cron { var: &'static str, reason: String },
}

fn invalid(var: &'static str, expected: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        expected,
        value: value.to_string(),
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// `None` means the default cache location.
    pub db_path: Option<PathBuf>,
    pub timezone: Tz,
    /// Five-field cron expression for the daily analysis.
    pub analysis_cron: String,
    /// Local time of day the analysis window starts and ends at.
    pub window_boundary: NaiveTime,
    pub publisher: PublisherConfig,
    pub llm: LlmConfig,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_path: None,
            timezone: chrono_tz::Asia::Seoul,
            analysis_cron: DEFAULT_ANALYSIS_CRON.to_string(),
            window_boundary: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
            publisher: PublisherConfig::default(),
            llm: LlmConfig::default(),
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Unset or empty variables keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some((var, raw)) = get("CAREER_LOG_PORT")
            .map(|v| ("CAREER_LOG_PORT", v))
            .or_else(|| get("PORT").map(|v| ("PORT", v)))
        {
            config.port = raw.trim().parse().map_err(|_| invalid(var, "port", &raw))?;
        }

        if let Some(raw) = get("CAREER_LOG_DB") {
            config.db_path = Some(PathBuf::from(raw));
        }

        if let Some(raw) = get("CAREER_LOG_TIMEZONE") {
            config.timezone = raw
                .trim()
                .parse()
                .map_err(|_| invalid("CAREER_LOG_TIMEZONE", "IANA time zone", &raw))?;
        }

        if let Some(raw) = get("CAREER_LOG_ANALYSIS_CRON") {
            config.analysis_cron = raw.trim().to_string();
        }
        parse_cron(&config.analysis_cron).map_err(|e| ConfigError::Cron {
            var: "CAREER_LOG_ANALYSIS_CRON",
            reason: e.to_string(),
        })?;

        if let Some(raw) = get("CAREER_LOG_WINDOW_BOUNDARY") {
            config.window_boundary = NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                .map_err(|_| invalid("CAREER_LOG_WINDOW_BOUNDARY", "HH:MM time", &raw))?;
        }

        if let Some(raw) = get("CAREER_LOG_PUBLISHER_WORKERS") {
            config.publisher.workers = parse_positive("CAREER_LOG_PUBLISHER_WORKERS", &raw)?;
        }
        if let Some(raw) = get("CAREER_LOG_PUBLISHER_CAPACITY") {
            config.publisher.capacity = parse_positive("CAREER_LOG_PUBLISHER_CAPACITY", &raw)?;
        }

        config.llm = LlmConfig {
            provider: ProviderType::OpenAi,
            api_key: get("OPENAI_API_KEY"),
            endpoint: get("CAREER_LOG_LLM_ENDPOINT"),
            ..LlmConfig::default()
        };
        if let Some(raw) = get("CAREER_LOG_LLM_MODEL") {
            config.llm.model = raw.trim().to_string();
        }
        if let Some(raw) = get("CAREER_LOG_LLM_TIMEOUT_SECS") {
            config.llm.timeout_secs =
                parse_positive("CAREER_LOG_LLM_TIMEOUT_SECS", &raw)? as u64;
        }

        if let Some(raw) = get("CAREER_LOG_LOG_FORMAT") {
            config.log_format = match raw.trim().to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "text" | "pretty" => LogFormat::Text,
                _ => return Err(invalid("CAREER_LOG_LOG_FORMAT", "log format (text|json)", &raw)),
            };
        }

        Ok(config)
    }
}

fn parse_positive(var: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(var, "positive integer", raw)),
    }
}
