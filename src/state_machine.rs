//! Session chat-history state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! runtime feeds events in, applies the new session and executes effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{ChatContext, ChatPhase, ContextMode, Profile, Role, Session, Turn};
pub use transition::{transition, TransitionError, TransitionResult};
