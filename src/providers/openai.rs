use std::time::Duration;
use serde::{Serialize, Deserialize};
use reqwest::Client;
use async_trait::async_trait;
use log::{debug, error};

use crate::errors::ProviderError;
use crate::providers::{ChatMessage, CompletionRequest, Provider};

/// OpenAI client for the chat completions API.
///
/// Works against any OpenAI-compatible server (LM Studio, vLLM, Azure
/// deployments behind a compatible gateway) by changing the endpoint.
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL up to and including `/v1`
    endpoint: String,
}

/// OpenAI chat completion request body
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    temperature: f32,
}

/// OpenAI message format
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A single completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    /// Generated choices, the first is the primary answer
    pub choices: Vec<OpenAIChoice>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

impl OpenAIRequest {
    /// Build the wire body from a provider-agnostic request
    pub fn from_completion(request: &CompletionRequest) -> Self {
        Self {
            model: request.model.clone(),
            messages: request.messages.iter().map(OpenAIMessage::from).collect(),
            temperature: request.temperature,
        }
    }
}

impl From<&ChatMessage> for OpenAIMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: Some(message.content.clone()),
        }
    }
}

impl OpenAI {
    /// Default public endpoint
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1";

    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self) -> String {
        let base = if self.endpoint.is_empty() {
            Self::DEFAULT_ENDPOINT
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/chat/completions", base)
    }

    /// Send a chat completion request
    pub async fn send(&self, request: &OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let mut builder = self.client.post(self.api_url())
            .header("Content-Type", "application/json")
            .json(request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await.map_err(ProviderError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response.json::<OpenAIResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI API response: {}", e)))
    }

    /// Extract the primary text from an OpenAI response
    pub fn extract_text_from_response(response: &OpenAIResponse) -> Result<String, ProviderError> {
        let choice = response.choices.first()
            .ok_or_else(|| ProviderError::ParseError("OpenAI response contained no choices".to_string()))?;

        match choice.message.content.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            Some(_) => Err(ProviderError::ParseError("OpenAI response content was empty".to_string())),
            None => Err(ProviderError::ParseError("OpenAI response content was null".to_string())),
        }
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = OpenAIRequest::from_completion(request);
        let response = self.send(&body).await?;
        if let Some(usage) = &response.usage {
            debug!(
                "OpenAI usage for {}: {} prompt / {} completion tokens",
                request.model, usage.prompt_tokens, usage.completion_tokens
            );
        }
        Self::extract_text_from_response(&response)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
