//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::llm::{LlmError, LlmMessage, LlmRequest, LlmService, SystemContent};
use crate::state_machine::{Role, Turn};
use async_trait::async_trait;
use std::sync::Arc;

/// The model collaborator: turns in, reply text out
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, turns: &[Turn]) -> Result<String, LlmError>;

    fn model_id(&self) -> &str;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: ModelClient + ?Sized> ModelClient for Arc<T> {
    async fn invoke(&self, turns: &[Turn]) -> Result<String, LlmError> {
        (**self).invoke(turns).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use an `LlmService` as the model collaborator
pub struct LlmModelClient {
    service: Arc<dyn LlmService>,
    max_new_tokens: u32,
}

impl LlmModelClient {
    pub fn new(service: Arc<dyn LlmService>, max_new_tokens: u32) -> Self {
        Self {
            service,
            max_new_tokens,
        }
    }
}

#[async_trait]
impl ModelClient for LlmModelClient {
    async fn invoke(&self, turns: &[Turn]) -> Result<String, LlmError> {
        let request = build_request(turns, self.max_new_tokens);
        let response = self.service.complete(&request).await?;
        Ok(response.text)
    }

    fn model_id(&self) -> &str {
        self.service.model_id()
    }
}

/// System turns become the system prompt; the rest keep their order
pub fn build_request(turns: &[Turn], max_new_tokens: u32) -> LlmRequest {
    let mut system = Vec::new();
    let mut messages = Vec::with_capacity(turns.len());

    for turn in turns {
        match turn.role {
            Role::System => system.push(SystemContent::new(turn.content.clone())),
            Role::User => messages.push(LlmMessage::user(turn.content.clone())),
            Role::Assistant => messages.push(LlmMessage::assistant(turn.content.clone())),
        }
    }

    LlmRequest {
        system,
        messages,
        max_tokens: Some(max_new_tokens),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, MessageRole};
    use std::sync::Mutex;

    struct EchoService {
        requests: Mutex<Vec<LlmRequest>>,
    }

    #[async_trait]
    impl LlmService for EchoService {
        async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            let last = request.messages.last().map(|m| m.content.clone());
            Ok(LlmResponse::from_text(format!("echo: {}", last.unwrap_or_default())))
        }

        fn model_id(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_build_request_splits_system_turns() {
        let turns = vec![
            Turn::system("Be brief."),
            Turn::user("hi"),
            Turn::assistant("hello"),
            Turn::user("how are you?"),
        ];

        let request = build_request(&turns, 200);

        assert_eq!(request.system, vec![SystemContent::new("Be brief.")]);
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.messages[1].role, MessageRole::Assistant);
        assert_eq!(request.messages[2].content, "how are you?");
        assert_eq!(request.max_tokens, Some(200));
    }

    #[tokio::test]
    async fn test_llm_model_client_returns_reply_text() {
        let service = Arc::new(EchoService {
            requests: Mutex::new(Vec::new()),
        });
        let client = LlmModelClient::new(service.clone(), 64);

        let reply = client.invoke(&[Turn::user("ping")]).await.unwrap();

        assert_eq!(reply, "echo: ping");
        assert_eq!(client.model_id(), "echo");
        assert_eq!(service.requests.lock().unwrap()[0].max_tokens, Some(64));
    }
}
