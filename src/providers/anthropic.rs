use std::time::Duration;
use serde::{Serialize, Deserialize};
use reqwest::Client;
use async_trait::async_trait;
use log::{debug, error};

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Provider, Role};

/// Anthropic client for interacting with Anthropic API
#[derive(Debug)]
pub struct Anthropic {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
    /// Maximum number of tokens to generate per call
    max_tokens: u32,
}

/// Anthropic message request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<AnthropicMessage>,

    /// System prompt to guide the AI
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// Temperature for generation
    temperature: f32,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Anthropic message format
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: u32,
    /// Number of output tokens
    pub output_tokens: u32,
}

/// Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// The content of the response
    pub content: Vec<AnthropicContent>,
    /// Why generation stopped ("end_turn", "max_tokens", ...)
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Token usage information
    pub usage: TokenUsage,
}

/// Individual content block in an Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    /// The type of content
    #[serde(rename = "type")]
    pub content_type: String,

    /// The actual text content
    #[serde(default)]
    pub text: String,
}

impl AnthropicRequest {
    /// Build the wire body from a provider-agnostic request.
    ///
    /// The messages API takes the system prompt as a separate field, so
    /// system turns are lifted out and joined in order.
    pub fn from_completion(request: &CompletionRequest, max_tokens: u32) -> Self {
        let system: Vec<&str> = request.messages.iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let messages = request.messages.iter()
            .filter(|m| m.role != Role::System)
            .map(|m| AnthropicMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect();

        Self {
            model: request.model.clone(),
            messages,
            system: if system.is_empty() { None } else { Some(system.join("\n\n")) },
            temperature: request.temperature,
            max_tokens,
        }
    }
}

impl Anthropic {
    /// Create a new Anthropic client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            max_tokens: 4096,
        }
    }

    /// Complete a messages request
    pub async fn send(&self, request: &AnthropicRequest) -> Result<AnthropicResponse, ProviderError> {
        let api_url = if self.endpoint.is_empty() {
            "https://api.anthropic.com/v1/messages".to_string()
        } else {
            format!("{}/v1/messages", self.endpoint.trim_end_matches('/'))
        };

        let response = self.client.post(&api_url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(request)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Anthropic API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response.json::<AnthropicResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Anthropic API response: {}", e)))
    }

    /// Extract text from Anthropic response.
    ///
    /// Output cut off by the token limit is rejected, as is a response
    /// without any text.
    pub fn extract_text_from_response(response: &AnthropicResponse) -> Result<String, ProviderError> {
        if response.stop_reason.as_deref() == Some("max_tokens") {
            return Err(ProviderError::ParseError(format!(
                "Anthropic response was truncated at {} output tokens",
                response.usage.output_tokens
            )));
        }

        let text: String = response.content.iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect();
        let text = text.trim();
        if text.is_empty() {
            return Err(ProviderError::ParseError("Anthropic response contained no text".to_string()));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl Provider for Anthropic {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = AnthropicRequest::from_completion(request, self.max_tokens);
        let response = self.send(&body).await?;
        debug!(
            "Anthropic usage for {}: {} input / {} output tokens",
            request.model, response.usage.input_tokens, response.usage.output_tokens
        );
        Self::extract_text_from_response(&response)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ChatMessage;

    #[test]
    fn test_fromCompletion_shouldLiftSystemTurns() {
        let request = CompletionRequest::new("claude-3-haiku", 0.55)
            .message(ChatMessage::system("You are a storyboard artist."))
            .message(ChatMessage::user("example"))
            .message(ChatMessage::user("scenes"));

        let body = serde_json::to_value(AnthropicRequest::from_completion(&request, 512)).unwrap();

        assert_eq!(body["system"], "You are a storyboard artist.");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], 512);
    }

    #[test]
    fn test_extractText_shouldJoinTextBlocks() {
        let response: AnthropicResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":" SCENE 1"},{"type":"text","text":" / X "}],
                "usage":{"input_tokens":3,"output_tokens":4}}"#,
        ).unwrap();

        assert_eq!(Anthropic::extract_text_from_response(&response).unwrap(), "SCENE 1 / X");
    }

    #[test]
    fn test_extractText_withoutTextBlocks_shouldReturnParseError() {
        for body in [
            r#"{"content":[],"usage":{"input_tokens":3,"output_tokens":0}}"#,
            r#"{"content":[{"type":"tool_use"}],"usage":{"input_tokens":3,"output_tokens":5}}"#,
            r#"{"content":[{"type":"text","text":"   "}],"usage":{"input_tokens":3,"output_tokens":1}}"#,
        ] {
            let response: AnthropicResponse = serde_json::from_str(body).unwrap();

            let result = Anthropic::extract_text_from_response(&response);
            assert!(matches!(result, Err(ProviderError::ParseError(_))), "body: {}", body);
        }
    }

    #[test]
    fn test_extractText_whenStoppedAtMaxTokens_shouldReturnParseError() {
        let response: AnthropicResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"SCENE 1 / VILLAGE"}],"stop_reason":"max_tokens",
                "usage":{"input_tokens":3,"output_tokens":4096}}"#,
        ).unwrap();

        let result = Anthropic::extract_text_from_response(&response);
        assert!(matches!(result, Err(ProviderError::ParseError(msg)) if msg.contains("truncated")));
    }
}
