/*!
 * Mock provider implementation for testing.
 *
 * The mock never touches the network. It records every request it receives
 * so tests can assert on call counts and on the exact conversation each
 * pipeline stage sent:
 * - `MockProvider::echo()` - answers with the final user turn
 * - `MockProvider::scripted(..)` - answers with queued responses in order
 * - `MockProvider::failing()` - always fails with an error
 * - `MockProvider::failing_at(n)` - fails on the n-th call only
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Provider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails on the given 1-based call number, succeeds otherwise
    FailingAt { call: usize },
    /// Always fails with an error
    Failing,
}

/// Mock provider for testing pipeline behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Queued responses consumed before falling back to the responder
    script: Arc<Mutex<VecDeque<String>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&CompletionRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            custom_response: None,
        }
    }

    /// Create a mock that echoes the final user turn back
    pub fn echo() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that answers with the given responses in order
    pub fn scripted<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        let mock = Self::new(MockBehavior::Working);
        mock.push_responses(responses);
        mock
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that fails on the given 1-based call number
    pub fn failing_at(call: usize) -> Self {
        Self::new(MockBehavior::FailingAt { call })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&CompletionRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Queue more responses
    pub fn push_responses<S: Into<String>>(&self, responses: impl IntoIterator<Item = S>) {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        script.extend(responses.into_iter().map(Into::into));
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn respond(&self, request: &CompletionRequest) -> String {
        let queued = self.script.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        if let Some(text) = queued {
            return text;
        }
        match self.custom_response {
            Some(generator) => generator(request),
            None => request.last_user_content().unwrap_or_default().to_string(),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
            script: Arc::clone(&self.script),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let call = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(self.respond(request).trim().to_string()),
            MockBehavior::FailingAt { call: failing_call } if call == failing_call => {
                Err(ProviderError::ApiError {
                    message: format!("Simulated failure (request #{})", call),
                    status_code: 503,
                })
            }
            MockBehavior::FailingAt { .. } => Ok(self.respond(request).trim().to_string()),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
