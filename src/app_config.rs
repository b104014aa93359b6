use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use url::Url;

use crate::language_utils::LanguageVocabulary;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Model provider to use
    #[serde(default)]
    pub provider: ModelProvider,

    /// Available model providers
    #[serde(default = "default_available_providers")]
    pub available_providers: Vec<ProviderConfig>,

    /// Pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Model provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    // @provider: OpenAI
    #[default]
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama
    Ollama,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl ModelProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    // @returns: Environment variable holding the credential, if the provider needs one
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama | Self::LMStudio => None,
        }
    }
}

// Implement Display trait for ModelProvider
impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for ModelProvider
impl std::str::FromStr for ModelProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model for scene and shot generation
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Model for translation
    #[serde(default = "String::new")]
    pub fast_model: String,

    // @field: Model for language detection
    #[serde(default = "String::new")]
    pub language_detect_model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds per model call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: ModelProvider) -> Self {
        let model = default_model_for(provider_type);
        Self {
            provider_type: provider_type.to_lowercase_string(),
            fast_model: model.clone(),
            language_detect_model: model.clone(),
            model,
            api_key: String::new(),
            endpoint: default_endpoint_for(provider_type),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Sampling temperature of each pipeline stage
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct StageTemperatures {
    /// Classification, kept deterministic
    #[serde(default = "default_detection_temperature")]
    pub detection: f32,
    #[serde(default = "default_translation_temperature")]
    pub translation: f32,
    #[serde(default = "default_segmentation_temperature")]
    pub segmentation: f32,
    /// Most generative stage
    #[serde(default = "default_decomposition_temperature")]
    pub decomposition: f32,
}

impl Default for StageTemperatures {
    fn default() -> Self {
        Self {
            detection: default_detection_temperature(),
            translation: default_translation_temperature(),
            segmentation: default_segmentation_temperature(),
            decomposition: default_decomposition_temperature(),
        }
    }
}

/// Story pipeline settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Folder holding reference `.txt` files
    #[serde(default = "default_references_folder")]
    pub references_folder: String,

    /// Whether references are used unless the caller says otherwise
    #[serde(default = "default_true")]
    pub use_references: bool,

    /// ISO codes the language detector may answer with
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Fail when scene or shot output breaks its grammar
    #[serde(default)]
    pub strict_format: bool,

    /// Fail when the detector answers outside the language list
    #[serde(default)]
    pub strict_language: bool,

    /// Stories processed at once by the CLI
    #[serde(default = "default_concurrent_stories")]
    pub concurrent_stories: usize,

    /// Per-stage sampling temperatures
    #[serde(default)]
    pub temperatures: StageTemperatures,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            references_folder: default_references_folder(),
            use_references: true,
            languages: default_languages(),
            strict_format: false,
            strict_language: false,
            concurrent_stories: default_concurrent_stories(),
            temperatures: StageTemperatures::default(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_detection_temperature() -> f32 {
    0.0
}

fn default_translation_temperature() -> f32 {
    0.3
}

fn default_segmentation_temperature() -> f32 {
    0.25
}

fn default_decomposition_temperature() -> f32 {
    0.55
}

fn default_references_folder() -> String {
    "outputs".to_string()
}

fn default_languages() -> Vec<String> {
    vec!["tr".to_string(), "en".to_string()]
}

fn default_concurrent_stories() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_available_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(ModelProvider::OpenAI),
        ProviderConfig::new(ModelProvider::Anthropic),
        ProviderConfig::new(ModelProvider::Ollama),
        ProviderConfig::new(ModelProvider::LMStudio),
    ]
}

fn default_endpoint_for(provider: ModelProvider) -> String {
    match provider {
        ModelProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        ModelProvider::Anthropic => "https://api.anthropic.com".to_string(),
        ModelProvider::Ollama => "http://localhost:11434".to_string(),
        // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
        ModelProvider::LMStudio => "http://localhost:1234/v1".to_string(),
    }
}

fn default_model_for(provider: ModelProvider) -> String {
    match provider {
        ModelProvider::OpenAI => "gpt-4o-mini".to_string(),
        ModelProvider::Anthropic => "claude-3-5-haiku-latest".to_string(),
        ModelProvider::Ollama => "llama3.2".to_string(),
        // Placeholder; users should set to the loaded model name in LM Studio
        ModelProvider::LMStudio => "local-model".to_string(),
    }
}

/// Loose format check for OpenAI secret keys
pub fn looks_like_openai_key(api_key: &str) -> bool {
    api_key.starts_with("sk-") && api_key.len() > 20
}

/// Model identifiers used by the pipeline stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSet {
    /// Scene segmentation and shot decomposition
    pub default_model: String,
    /// Translation
    pub fast_model: String,
    /// Language detection
    pub language_detect_model: String,
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        LanguageVocabulary::from_codes(&self.pipeline.languages)
            .context("Invalid language list in pipeline.languages")?;

        let endpoint = self.get_endpoint();
        Url::parse(&endpoint)
            .with_context(|| format!("Invalid endpoint for {}: {}", self.provider.display_name(), endpoint))?;

        if self.pipeline.references_folder.trim().is_empty() {
            return Err(anyhow!("pipeline.references_folder cannot be empty"));
        }
        if self.pipeline.concurrent_stories == 0 {
            return Err(anyhow!("pipeline.concurrent_stories must be at least 1"));
        }

        let t = &self.pipeline.temperatures;
        for (stage, value) in [
            ("detection", t.detection),
            ("translation", t.translation),
            ("segmentation", t.segmentation),
            ("decomposition", t.decomposition),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(anyhow!("Temperature for {} must be between 0 and 2, got {}", stage, value));
            }
        }

        Ok(())
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the mutable configuration of the active provider, creating it if absent
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the models for the active provider
    pub fn get_models(&self) -> ModelSet {
        let fallback = default_model_for(self.provider);
        let pick = |value: Option<&String>| match value {
            Some(v) if !v.is_empty() => v.clone(),
            _ => fallback.clone(),
        };
        let active = self.get_active_provider_config();
        let default_model = pick(active.map(|p| &p.model));

        ModelSet {
            fast_model: match active.map(|p| &p.fast_model) {
                Some(v) if !v.is_empty() => v.clone(),
                _ => default_model.clone(),
            },
            language_detect_model: match active.map(|p| &p.language_detect_model) {
                Some(v) if !v.is_empty() => v.clone(),
                _ => default_model.clone(),
            },
            default_model,
        }
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        default_endpoint_for(self.provider)
    }

    /// Get the per-call timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|t| *t > 0)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Resolve the API key: the configured value first, then the environment.
    ///
    /// `env` looks up a variable by name; callers normally pass
    /// `|name| std::env::var(name).ok()`.
    pub fn resolve_api_key_with<F>(&self, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.trim().is_empty() {
                return Some(provider_config.api_key.trim().to_string());
            }
        }

        self.provider.api_key_env_var()
            .and_then(|name| env(name))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    /// Resolve the API key from config or the process environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            provider: ModelProvider::default(),
            available_providers: default_available_providers(),
            pipeline: PipelineConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
