/*!
 * Provider implementations for chat-completion services.
 *
 * This module contains client implementations for various LLM providers:
 * - OpenAI: OpenAI API integration (also any OpenAI-compatible server)
 * - Anthropic: Anthropic API integration
 * - Ollama: Local LLM server
 * - Mock: scripted provider for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who is speaking
    pub role: Role,
    /// Text of the turn
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Provider-agnostic chat completion request.
///
/// Message order is conversational priority: system instruction first,
/// grounding turns next, the real request last.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier understood by the provider
    pub model: String,
    /// Ordered conversation
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    /// Create an empty request for a model
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature,
        }
    }

    /// Append a message to the request
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Content of the final user turn, if any
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the story pipeline.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request and return the trimmed primary response text
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The response text or an error
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self, model: &str) -> Result<(), ProviderError> {
        let request = CompletionRequest::new(model, 0.0).message(ChatMessage::user("Hello"));
        self.complete(&request).await.map(|_| ())
    }

    /// Short name used in log lines
    fn name(&self) -> &'static str;
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
