/*!
 * Provider construction from configuration
 */

use text_to_shots::app_config::{Config, ModelProvider};
use text_to_shots::errors::PipelineError;
use text_to_shots::pipeline::StoryProcessor;

use crate::common;

#[test]
fn test_fromConfig_withAnthropicKeyInConfig_shouldBuildAnthropicClient() {
    let mut config = Config::default();
    config.provider = ModelProvider::Anthropic;
    config.active_provider_config_mut().api_key = "test-anthropic-key".to_string();

    let processor = StoryProcessor::from_config(&config, None).unwrap();

    assert_eq!(processor.context().provider.name(), "anthropic");
    assert_eq!(processor.context().models.default_model, "claude-3-5-haiku-latest");
}

#[test]
fn test_fromConfig_withLmStudio_shouldUseOpenAiCompatibleClientWithoutKey() {
    let mut config = Config::default();
    config.provider = ModelProvider::LMStudio;

    let processor = StoryProcessor::from_config(&config, None).unwrap();

    assert_eq!(processor.context().provider.name(), "openai");
}

#[test]
fn test_fromConfig_withPipelineSettings_shouldCarryThemIntoContext() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "style.txt", "Painterly").unwrap();

    let mut config = Config::default();
    config.provider = ModelProvider::Ollama;
    config.pipeline.references_folder = dir.path().to_string_lossy().to_string();
    config.pipeline.languages = vec!["fr".to_string(), "de".to_string()];
    config.pipeline.strict_format = true;
    config.pipeline.temperatures.decomposition = 0.9;

    let processor = StoryProcessor::from_config(&config, None).unwrap();
    let ctx = processor.context();

    assert!(ctx.strict_format);
    assert!(!ctx.strict_language);
    assert_eq!(ctx.temperatures.decomposition, 0.9);
    assert_eq!(ctx.vocabulary.labels(), ["french", "german", "english"]);
    assert_eq!(processor.list_available_references(), vec!["style.txt"]);
}

#[tokio::test]
async fn test_processStory_withEmptyInput_shouldFailWithoutNetwork() {
    // Points at a closed port; any model call would fail with UpstreamCall
    let mut config = Config::default();
    config.provider = ModelProvider::Ollama;
    config.active_provider_config_mut().endpoint = "http://127.0.0.1:9".to_string();

    let processor = StoryProcessor::from_config(&config, None).unwrap();
    let err = processor.process_story("  ", true).await.unwrap_err();

    assert!(matches!(err, PipelineError::InvalidInput(_)));
}
