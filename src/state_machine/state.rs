//! Session state types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Turns
// ============================================================================

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    /// Capitalized label used by the history sidebar
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::System => "System",
        }
    }
}

/// One role-tagged message in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Assistant turn standing in for a failed model call
    pub fn model_error(detail: &str) -> Self {
        Self::assistant(format!("{MODEL_ERROR_PREFIX}{detail})"))
    }
}

/// Marker every failed-call turn starts with
pub const MODEL_ERROR_PREFIX: &str = "(Error calling model: ";

// ============================================================================
// Session
// ============================================================================

/// Submission phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatPhase {
    /// No submission in flight
    #[default]
    Idle,
    /// User turn appended, waiting for the model
    Submitting,
}

/// Sidebar profile fields; unrelated to the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Guest".to_string(),
            email: "Not provided".to_string(),
        }
    }
}

/// One browser session's chat state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub transcript: Vec<Turn>,
    pub pending_input_clear: bool,
    pub draft_input_text: String,
    pub phase: ChatPhase,
    pub profile: Profile,
}

impl Session {
    /// Fresh session with the context's seed transcript
    pub fn new(context: &ChatContext) -> Self {
        Self {
            transcript: context.seed_transcript(),
            pending_input_clear: false,
            draft_input_text: String::new(),
            phase: ChatPhase::Idle,
            profile: Profile::default(),
        }
    }

    /// Force the draft empty if a completed cycle asked for it.
    ///
    /// Must run before the input control is drawn; once drawn, the control's
    /// own value would shadow the cleared draft until the following render.
    pub fn apply_pending_clear(&mut self) {
        if self.pending_input_clear {
            self.draft_input_text.clear();
            self.pending_input_clear = false;
        }
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.phase == ChatPhase::Idle
    }

    /// Turns shown as chat bubbles (system instructions stay hidden)
    pub fn visible_turns(&self) -> impl Iterator<Item = &Turn> {
        self.transcript.iter().filter(|t| t.role != Role::System)
    }
}

// ============================================================================
// Context
// ============================================================================

/// What the model receives on each submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    /// The whole transcript, including earlier replies
    #[default]
    Full,
    /// Only system seed turns plus the text just submitted
    Latest,
}

impl ContextMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextMode::Full => "full",
            ContextMode::Latest => "latest",
        }
    }
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(ContextMode::Full),
            "latest" => Ok(ContextMode::Latest),
            other => Err(format!("expected \"full\" or \"latest\", got {other:?}")),
        }
    }
}

/// Settings shared by every session (immutable configuration)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatContext {
    /// Seeds the transcript with a system turn when set
    pub system_prompt: Option<String>,
    pub context_mode: ContextMode,
}

impl ChatContext {
    /// Transcript a session starts with, and returns to on clear
    pub fn seed_transcript(&self) -> Vec<Turn> {
        self.system_prompt
            .iter()
            .map(|prompt| Turn::system(prompt.clone()))
            .collect()
    }
}
