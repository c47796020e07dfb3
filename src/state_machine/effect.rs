//! Effects produced by state transitions

use super::state::Turn;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call the model with these turns as context
    InvokeModel { turns: Vec<Turn> },

    /// State changed in a way the page must show
    Rerender,
}

impl Effect {
    pub fn invoke_model(turns: Vec<Turn>) -> Self {
        Effect::InvokeModel { turns }
    }
}
