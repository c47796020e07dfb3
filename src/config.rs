//! Environment-driven configuration
//!
//! Every setting is read once at startup. A `.env` file in the working
//! directory is loaded first, so secrets can live there instead of the shell.

use crate::llm::LlmConfig;
use crate::state_machine::{ChatContext, ContextMode};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PAGE_TITLE: &str = "AI Chatbot";
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 60 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Full application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub page_title: String,
    pub chat: ChatContext,
    pub llm: LlmConfig,
    /// Sessions unseen for this long are dropped
    pub session_idle: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup (tests pass a map here)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_var(&lookup, "CHAT_PORT")?.unwrap_or(DEFAULT_PORT);
        let page_title = non_empty(&lookup, "CHAT_PAGE_TITLE")
            .unwrap_or_else(|| DEFAULT_PAGE_TITLE.to_string());
        let session_idle_secs =
            parse_var::<u64>(&lookup, "CHAT_SESSION_IDLE_SECS")?.unwrap_or(DEFAULT_SESSION_IDLE_SECS);
        if session_idle_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "CHAT_SESSION_IDLE_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let context_mode: ContextMode =
            parse_var(&lookup, "CHAT_CONTEXT_MODE")?.unwrap_or_default();

        Ok(Self {
            port,
            page_title,
            chat: ChatContext {
                system_prompt: non_empty(&lookup, "CHAT_SYSTEM_PROMPT"),
                context_mode,
            },
            llm: LlmConfig::from_lookup(&lookup)?,
            session_idle: Duration::from_secs(session_idle_secs),
        })
    }
}

/// Load `.env` if present; a missing file is fine
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded environment from .env"),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(error = %e, "Failed to load .env file"),
    }
}

/// Read a variable, treating blank values as unset
pub(crate) fn non_empty(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    non_empty(lookup, var)
        .map(|value| {
            value.parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}
