use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error};

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Provider};

/// Ollama client for interacting with the local Ollama chat API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<OllamaMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    stream: bool,
}

/// Chat response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model name
    pub model: String,
    /// Response message
    pub message: OllamaMessage,
    /// Whether the generation is complete
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl ChatRequest {
    /// Build a non-streaming chat request from a provider-agnostic request
    pub fn from_completion(request: &CompletionRequest) -> Self {
        Self {
            model: request.model.clone(),
            messages: request.messages.iter()
                .map(|m| OllamaMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            options: Some(GenerationOptions {
                temperature: Some(request.temperature),
            }),
            stream: false,
        }
    }
}

impl Ollama {
    /// Create a new Ollama client from a complete base URL
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // Ollama uses HTTP/1.1
                .http1_only()
                .build()
                .unwrap_or_default(),
        }
    }

    /// Chat with the Ollama API
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self.client.post(&url)
            .json(request)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let response_text = response.text().await
            .map_err(ProviderError::from_transport)?;

        Self::parse_chat_body(&response_text)
    }

    /// Parse a chat body, tolerating a JSONL stream even though streaming is off
    pub fn parse_chat_body(body: &str) -> Result<ChatResponse, ProviderError> {
        if let Ok(parsed) = serde_json::from_str::<ChatResponse>(body) {
            return Ok(parsed);
        }

        let chunks: Vec<ChatResponse> = body.lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str::<ChatResponse>(line).ok())
            .collect();

        let last = chunks.last().ok_or_else(|| {
            let preview: String = body.chars().take(500).collect();
            ProviderError::ParseError(format!("Unrecognized Ollama chat response: {}", preview))
        })?;

        let content: String = chunks.iter().map(|c| c.message.content.as_str()).collect();
        Ok(ChatResponse {
            model: last.model.clone(),
            message: OllamaMessage {
                role: "assistant".to_string(),
                content,
            },
            done: last.done,
            prompt_eval_count: last.prompt_eval_count,
            eval_count: last.eval_count,
        })
    }

    /// Trimmed assistant text of a chat response
    pub fn extract_text_from_response(response: &ChatResponse) -> Result<String, ProviderError> {
        let text = response.message.content.trim();
        if text.is_empty() {
            return Err(ProviderError::ParseError(format!("Ollama model {} returned no content", response.model)));
        }
        Ok(text.to_string())
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response: serde_json::Value = self.client.get(&url)
            .send()
            .await
            .map_err(ProviderError::from_transport)?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama version response: {}", e)))?;

        response["version"].as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let response = self.chat(&ChatRequest::from_completion(request)).await?;
        debug!(
            "Ollama usage for {}: {:?} prompt / {:?} completion tokens",
            response.model, response.prompt_eval_count, response.eval_count
        );
        Self::extract_text_from_response(&response)
    }

    async fn test_connection(&self, _model: &str) -> Result<(), ProviderError> {
        let version = self.version().await?;
        debug!("Connected to Ollama {}", version);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
