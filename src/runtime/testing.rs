//! Mock implementations for testing
//!
//! These mocks enable runtime and API tests without network I/O.

use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Mock LLM Client
// ============================================================================

enum MockReply {
    Ready(Result<LlmResponse, LlmError>),
    /// Never completes, like a gateway that stopped answering
    Hang,
}

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<MockReply>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockReply::Ready(Ok(response)));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockReply::Ready(Err(error)));
    }

    /// Queue a call that never returns
    pub fn queue_hang(&self) {
        self.responses.lock().unwrap().push_back(MockReply::Hang);
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(MockReply::Ready(result)) => result,
            Some(MockReply::Hang) => std::future::pending().await,
            None => Err(LlmError::network("No mock response queued")),
        }
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
