/*!
 * Tests for application configuration functionality
 */

use text_to_shots::app_config::{Config, LogLevel, ModelProvider, ProviderConfig};

use crate::common;

/// Test that a config file round-trips through the on-disk JSON format
#[test]
fn test_configFile_writtenAndReadBack_shouldKeepValues() {
    let dir = common::create_temp_dir().unwrap();
    let mut config = Config::default();
    config.provider = ModelProvider::Anthropic;
    config.pipeline.references_folder = "refs".to_string();
    config.pipeline.concurrent_stories = 4;
    config.log_level = LogLevel::Debug;

    let path = dir.path().join("conf.json");
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    let loaded: Config = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(loaded.provider, ModelProvider::Anthropic);
    assert_eq!(loaded.pipeline.references_folder, "refs");
    assert_eq!(loaded.pipeline.concurrent_stories, 4);
    assert_eq!(loaded.log_level, LogLevel::Debug);
    assert_eq!(loaded.get_models().default_model, "claude-3-5-haiku-latest");
}

/// Test configuration validation
#[test]
fn test_validate_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.pipeline.concurrent_stories = 0;
    assert!(config.validate().is_err());
    config.pipeline.concurrent_stories = 2;

    config.pipeline.temperatures.decomposition = 3.5;
    assert!(config.validate().is_err());
    config.pipeline.temperatures.decomposition = 0.55;

    config.pipeline.references_folder = "  ".to_string();
    assert!(config.validate().is_err());
    config.pipeline.references_folder = "outputs".to_string();

    config.active_provider_config_mut().endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_getModels_withPartialProviderEntry_shouldFallBackToDefaultModel() {
    let mut config = Config::default();
    let mut entry = ProviderConfig::new(ModelProvider::Ollama);
    entry.model = "mistral".to_string();
    entry.fast_model = String::new();
    entry.language_detect_model = String::new();
    config.available_providers = vec![entry];
    config.provider = ModelProvider::Ollama;

    let models = config.get_models();

    assert_eq!(models.default_model, "mistral");
    assert_eq!(models.fast_model, "mistral");
    assert_eq!(models.language_detect_model, "mistral");
}

#[test]
fn test_activeProviderConfigMut_withMissingEntry_shouldCreateIt() {
    let mut config = Config::default();
    config.available_providers.clear();
    config.provider = ModelProvider::LMStudio;

    config.active_provider_config_mut().model = "qwen2.5-7b".to_string();

    assert_eq!(config.available_providers.len(), 1);
    assert_eq!(config.get_models().default_model, "qwen2.5-7b");
    assert_eq!(config.get_endpoint(), "http://localhost:1234/v1");
}

#[test]
fn test_apiKeyEnvVar_shouldOnlyExistForHostedProviders() {
    assert_eq!(ModelProvider::OpenAI.api_key_env_var(), Some("OPENAI_API_KEY"));
    assert_eq!(ModelProvider::Anthropic.api_key_env_var(), Some("ANTHROPIC_API_KEY"));
    assert_eq!(ModelProvider::Ollama.api_key_env_var(), None);
    assert_eq!(ModelProvider::LMStudio.api_key_env_var(), None);
}
