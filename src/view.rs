//! Two-phase page rendering
//!
//! Every render runs `reconcile` to completion before `present` builds the
//! view. The input control is drawn from `ChatView::draft`, so a pending clear
//! has to land in the session first or the old text comes back.

use crate::state_machine::{Profile, Role, Session};
use serde::Serialize;

/// One chat bubble
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BubbleView {
    pub role: &'static str,
    pub bubble_class: &'static str,
    pub content: String,
}

/// One numbered line in the sidebar history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub index: usize,
    pub label: &'static str,
    pub content: String,
}

/// Everything the page draws for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatView {
    pub bubbles: Vec<BubbleView>,
    pub history: Vec<HistoryEntry>,
    /// Initial value of the input control
    pub draft: String,
    pub profile: Profile,
}

/// Phase one: apply deferred state changes that must precede drawing
pub fn reconcile(session: &mut Session) {
    session.apply_pending_clear();
}

/// Phase two: pure projection of the session
pub fn present(session: &Session) -> ChatView {
    let bubbles = session
        .visible_turns()
        .map(|turn| BubbleView {
            role: turn.role.as_str(),
            bubble_class: match turn.role {
                Role::User => "chat-bubble-user",
                _ => "chat-bubble-bot",
            },
            content: turn.content.clone(),
        })
        .collect();

    let history = session
        .visible_turns()
        .enumerate()
        .map(|(i, turn)| HistoryEntry {
            index: i + 1,
            label: turn.role.label(),
            content: turn.content.clone(),
        })
        .collect();

    ChatView {
        bubbles,
        history,
        draft: session.draft_input_text.clone(),
        profile: session.profile.clone(),
    }
}

/// Full render cycle, in the required order
pub fn render(session: &mut Session) -> ChatView {
    reconcile(session);
    present(session)
}
