//! Events that can occur in a session

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User events
    /// The input control's current value, bound on every render
    StageDraft { text: String },
    /// Send button or Enter; `text` is the raw draft, trimmed by the transition
    Submit { text: String },
    ClearAll,
    UpdateProfile { name: String, email: String },

    // Model events
    ModelReply { content: String },
    ModelFailed { message: String },
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::Submit { text: text.into() }
    }

    pub fn stage_draft(text: impl Into<String>) -> Self {
        Event::StageDraft { text: text.into() }
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Event::StageDraft { .. } => "stage_draft",
            Event::Submit { .. } => "submit",
            Event::ClearAll => "clear_all",
            Event::UpdateProfile { .. } => "update_profile",
            Event::ModelReply { .. } => "model_reply",
            Event::ModelFailed { .. } => "model_failed",
        }
    }
}
