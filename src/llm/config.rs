//! Model endpoint configuration and service construction

use super::{HuggingFaceService, LlmError, LlmService, LoggingService};
use crate::config::{non_empty, parse_var, ConfigError};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MODEL_ID: &str = "openai/gpt-oss-120b";
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 200;
pub const DEFAULT_ENDPOINT: &str = "https://router.huggingface.co/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Token variables, checked in order
const TOKEN_VARS: &[&str] = &[
    "HUGGINGFACEHUB_API_TOKEN",
    "HUGGINGFACE_API_TOKEN",
    "HF_TOKEN",
];

/// Configuration for the hosted model endpoint
#[derive(Clone)]
pub struct LlmConfig {
    /// Model repository id, e.g. `openai/gpt-oss-120b`
    pub model_id: String,
    pub max_new_tokens: u32,
    /// OpenAI-compatible base URL (without `/chat/completions`)
    pub endpoint: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// Keeps the token out of logs
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model_id", &self.model_id)
            .field("max_new_tokens", &self.max_new_tokens)
            .field("endpoint", &self.endpoint)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmConfig {
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let timeout_secs =
            parse_var::<u64>(lookup, "CHAT_MODEL_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            model_id: non_empty(lookup, "CHAT_MODEL").unwrap_or(defaults.model_id),
            max_new_tokens: parse_var(lookup, "CHAT_MAX_NEW_TOKENS")?
                .unwrap_or(defaults.max_new_tokens),
            endpoint: non_empty(lookup, "CHAT_MODEL_ENDPOINT").unwrap_or(defaults.endpoint),
            api_token: TOKEN_VARS.iter().find_map(|var| non_empty(lookup, var)),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn has_token(&self) -> bool {
        self.api_token.is_some()
    }
}

/// Create the model service, wrapped with request logging
pub fn build_service(config: &LlmConfig) -> Result<Arc<dyn LlmService>, LlmError> {
    let service: Arc<dyn LlmService> = Arc::new(HuggingFaceService::new(config)?);
    Ok(Arc::new(LoggingService::new(service)))
}
