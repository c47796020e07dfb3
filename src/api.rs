//! HTTP surface for the chatbot
//!
//! The page routes post forms and redirect back to `/`; the JSON routes
//! expose the same session operations to scripted clients.

mod assets;
mod handlers;
mod page;
mod types;

pub use handlers::create_router;
pub use page::PageRenderer;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::runtime::SessionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub pages: Arc<PageRenderer>,
    pub model: ModelResponse,
}

impl AppState {
    pub fn new(sessions: Arc<SessionManager>, pages: PageRenderer, model: ModelResponse) -> Self {
        Self {
            sessions,
            pages: Arc::new(pages),
            model,
        }
    }
}
