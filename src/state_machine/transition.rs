//! Pure state transition function
//!
//! Given the same session, context and event this always produces the same
//! result, with no I/O. The runtime executes the returned effects.

use super::state::{ChatPhase, Role, Turn};
use super::{ChatContext, ContextMode, Effect, Event, Session};
use thiserror::Error;

/// Detail recorded when the model answers with nothing
pub const EMPTY_REPLY_DETAIL: &str = "model returned an empty response";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: Session) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A message is already being answered, wait for the reply")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    state: &Session,
    context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        // ============================================================
        // Draft binding
        // ============================================================
        (ChatPhase::Idle, Event::StageDraft { text }) => {
            let mut next = state.clone();
            next.draft_input_text = text;
            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Submission
        // ============================================================
        (ChatPhase::Idle, Event::Submit { text }) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                // Empty submissions are ignored, not rejected
                return Ok(TransitionResult::new(state.clone()));
            }

            let mut next = state.clone();
            next.transcript.push(Turn::user(trimmed));
            next.phase = ChatPhase::Submitting;
            let turns = model_context(&next.transcript, context.context_mode);

            Ok(TransitionResult::new(next).with_effect(Effect::invoke_model(turns)))
        }

        // ============================================================
        // Model outcome: success and failure both close the cycle
        // ============================================================
        (ChatPhase::Submitting, Event::ModelReply { content }) => {
            let turn = if content.trim().is_empty() {
                Turn::model_error(EMPTY_REPLY_DETAIL)
            } else {
                Turn::assistant(content)
            };
            Ok(complete_cycle(state, turn))
        }

        (ChatPhase::Submitting, Event::ModelFailed { message }) => {
            Ok(complete_cycle(state, Turn::model_error(&message)))
        }

        // ============================================================
        // Clear
        // ============================================================
        (ChatPhase::Idle, Event::ClearAll) => {
            let mut next = state.clone();
            next.transcript = context.seed_transcript();
            Ok(TransitionResult::new(next).with_effect(Effect::Rerender))
        }

        // ============================================================
        // Profile (independent of the conversation)
        // ============================================================
        (_, Event::UpdateProfile { name, email }) => {
            let mut next = state.clone();
            next.profile.name = name;
            next.profile.email = email;
            Ok(TransitionResult::new(next).with_effect(Effect::Rerender))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (
            ChatPhase::Submitting,
            Event::StageDraft { .. } | Event::Submit { .. } | Event::ClearAll,
        ) => Err(TransitionError::Busy),

        (ChatPhase::Idle, event @ (Event::ModelReply { .. } | Event::ModelFailed { .. })) => {
            Err(TransitionError::InvalidTransition(format!(
                "{} with no submission in flight",
                event.kind()
            )))
        }
    }
}

/// Append the assistant turn, return to idle and ask for the input to clear
fn complete_cycle(state: &Session, turn: Turn) -> TransitionResult {
    let mut next = state.clone();
    next.transcript.push(turn);
    next.phase = ChatPhase::Idle;
    next.pending_input_clear = true;
    TransitionResult::new(next).with_effect(Effect::Rerender)
}

/// Turns the model sees for the submission just appended
fn model_context(transcript: &[Turn], mode: ContextMode) -> Vec<Turn> {
    match mode {
        ContextMode::Full => transcript.to_vec(),
        ContextMode::Latest => {
            let system = transcript.iter().filter(|t| t.role == Role::System);
            system.chain(transcript.last()).cloned().collect()
        }
    }
}
