//! Mock implementations for testing
//!
//! These mocks enable runtime and router tests without real I/O.

use super::traits::ModelClient;
use crate::llm::LlmError;
use crate::state_machine::Turn;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

// ============================================================================
// Mock Model Client
// ============================================================================

/// Mock model client that returns queued replies
pub struct MockModelClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    model_id: String,
    /// Record of all turn lists sent to the model
    requests: Mutex<Vec<Vec<Turn>>>,
}

impl MockModelClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue an error reply
    pub fn queue_error(&self, error: LlmError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<Vec<Turn>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn invoke(&self, turns: &[Turn]) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(turns.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock reply queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Gated Mock Model Client (for ordering tests)
// ============================================================================

/// Model client that holds every call until `release` is called
pub struct GatedModelClient {
    started: Notify,
    gate: Notify,
}

impl GatedModelClient {
    pub fn new() -> Self {
        Self {
            started: Notify::new(),
            gate: Notify::new(),
        }
    }

    /// Wait until a call is in flight
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// Let one in-flight call finish
    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl ModelClient for GatedModelClient {
    async fn invoke(&self, turns: &[Turn]) -> Result<String, LlmError> {
        self.started.notify_one();
        self.gate.notified().await;
        let last = turns.last().map(|t| t.content.as_str()).unwrap_or_default();
        Ok(format!("reply to {last}"))
    }

    fn model_id(&self) -> &str {
        "gated-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_model_client() {
        let mock = MockModelClient::new("test-model");
        mock.queue_reply("Hello");

        let reply = mock.invoke(&[Turn::user("hi")]).await.unwrap();
        assert_eq!(reply, "Hello");

        // Second call should fail (no more replies)
        let result = mock.invoke(&[Turn::user("again")]).await;
        assert!(result.is_err());

        assert_eq!(mock.recorded_requests().len(), 2);
        assert_eq!(mock.model_id(), "test-model");
    }
}
