/*!
 * Error types for the text_to_shots application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::fmt;

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Map a non-success HTTP status and body to the matching variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Classify a transport-level reqwest failure
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Pipeline stage that issued a model call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LanguageDetection,
    Translation,
    SceneSegmentation,
    ShotDecomposition,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LanguageDetection => "language detection",
            Self::Translation => "translation",
            Self::SceneSegmentation => "scene segmentation",
            Self::ShotDecomposition => "shot decomposition",
        };
        f.write_str(name)
    }
}

/// Errors raised by the story processing pipeline.
///
/// Every variant is fatal to the current `process_story` call; no partial
/// result is ever returned alongside one of these.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Missing or invalid settings when building the processor
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Story text rejected before any model call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The model-call primitive failed
    #[error("Upstream call failed during {stage}: {source}")]
    UpstreamCall {
        /// Stage that issued the call
        stage: Stage,
        /// Underlying provider failure
        #[source]
        source: ProviderError,
    },

    /// The model answered, but not in the required shape (strict mode only)
    #[error("Malformed response during {stage}: {reason}")]
    MalformedResponse {
        /// Stage whose output was rejected
        stage: Stage,
        /// What was wrong with the output
        reason: String,
        /// The raw model output
        raw: String,
    },
}

impl PipelineError {
    /// Wrap a provider failure for the given stage
    pub fn upstream(stage: Stage) -> impl FnOnce(ProviderError) -> Self {
        move |source| Self::UpstreamCall { stage, source }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the story pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
