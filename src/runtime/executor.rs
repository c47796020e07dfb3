//! Session runtime executor

use super::traits::ModelClient;
use crate::state_machine::{transition, ChatContext, Effect, Event, Session, TransitionError};

/// What a dispatched event asked of the render loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The page must be drawn again to show the change
    pub rerender: bool,
    /// Model calls made while handling the event
    pub model_calls: usize,
}

impl DispatchOutcome {
    /// Fold in the outcome of a later event in the same batch
    pub fn merge(&mut self, other: DispatchOutcome) {
        self.rerender |= other.rerender;
        self.model_calls += other.model_calls;
    }
}

/// Runs events through the state machine and executes their effects
pub struct SessionRuntime<M>
where
    M: ModelClient,
{
    context: ChatContext,
    model: M,
}

impl<M> SessionRuntime<M>
where
    M: ModelClient,
{
    pub fn new(context: ChatContext, model: M) -> Self {
        Self { context, model }
    }

    pub fn context(&self) -> &ChatContext {
        &self.context
    }

    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// Apply `event` to `session`, following any events its effects produce.
    ///
    /// A rejected first event leaves the session untouched. Model failures are
    /// not errors here; they come back as `ModelFailed` and end up in the
    /// transcript.
    pub async fn dispatch(
        &self,
        session_id: &str,
        session: &mut Session,
        event: Event,
    ) -> Result<DispatchOutcome, TransitionError> {
        let mut outcome = DispatchOutcome::default();

        // Process events in a loop to handle chained effects
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let kind = current_event.kind();
            let result = transition(session, &self.context, current_event).inspect_err(|e| {
                tracing::warn!(session_id, event = kind, error = %e, "Event rejected");
            })?;

            *session = result.new_state;
            tracing::debug!(
                session_id,
                event = kind,
                turns = session.transcript.len(),
                phase = ?session.phase,
                "Transition applied"
            );

            for effect in result.effects {
                if let Some(generated) = self.execute_effect(session_id, effect, &mut outcome).await
                {
                    events_to_process.push(generated);
                }
            }
        }

        Ok(outcome)
    }

    async fn execute_effect(
        &self,
        session_id: &str,
        effect: Effect,
        outcome: &mut DispatchOutcome,
    ) -> Option<Event> {
        match effect {
            Effect::InvokeModel { turns } => {
                outcome.model_calls += 1;
                tracing::info!(
                    session_id,
                    model = %self.model.model_id(),
                    context_turns = turns.len(),
                    "Invoking model"
                );

                // The failure is swallowed into the transcript, never raised
                Some(match self.model.invoke(&turns).await {
                    Ok(content) => Event::ModelReply { content },
                    Err(e) => Event::ModelFailed { message: e.message },
                })
            }

            Effect::Rerender => {
                outcome.rerender = true;
                None
            }
        }
    }
}
