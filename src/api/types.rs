//! API request and response types

use crate::state_machine::{ChatPhase, ContextMode, Profile, Session, Turn};
use serde::{Deserialize, Serialize};

/// Chat form posted by the page
#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub text: String,
}

/// Sidebar profile form
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Session state as seen by JSON clients
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub transcript: Vec<Turn>,
    pub draft: String,
    pub pending_input_clear: bool,
    pub phase: ChatPhase,
    pub profile: Profile,
}

impl SessionResponse {
    pub fn new(session_id: impl Into<String>, session: &Session) -> Self {
        Self {
            session_id: session_id.into(),
            transcript: session.transcript.clone(),
            draft: session.draft_input_text.clone(),
            pending_input_clear: session.pending_input_clear,
            phase: session.phase,
            profile: session.profile.clone(),
        }
    }
}

/// Model information
#[derive(Debug, Clone, Serialize)]
pub struct ModelResponse {
    pub model_id: String,
    pub max_new_tokens: u32,
    pub context_mode: ContextMode,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
