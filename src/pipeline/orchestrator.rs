/*!
 * Pipeline orchestrator for turning one story into scenes and shots.
 *
 * The orchestrator runs the stages strictly in order:
 * 1. Reference loading (skipped when references are disabled)
 * 2. Language detection, then translation when the story is not English
 * 3. Scene segmentation of the English text
 * 4. Shot decomposition of the segmented scenes
 *
 * The first failing stage aborts the run. Nothing is retried and no
 * partial result is returned.
 */

use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::{Config, ModelProvider, ModelSet, StageTemperatures, looks_like_openai_key};
use crate::breakdown::BreakdownError;
use crate::errors::{PipelineError, ProviderError, Stage};
use crate::language_utils::LanguageVocabulary;
use crate::models::{ReferenceBundle, StoryAnalysisResult};
use crate::providers::{CompletionRequest, Provider};
use crate::providers::anthropic::Anthropic;
use crate::providers::ollama::Ollama;
use crate::providers::openai::OpenAI;

use super::prompts::GroundingExamples;
use super::{language, references, scenes, shots};

/// Key sent to LM Studio, which ignores it but expects a bearer token
const LM_STUDIO_PLACEHOLDER_KEY: &str = "lm-studio";

/// Everything a stage needs besides its input.
///
/// Built once per processor and shared read-only by every stage call.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    /// Model-call primitive
    pub provider: Arc<dyn Provider>,

    /// Model identifier per stage
    pub models: ModelSet,

    /// Sampling temperature per stage
    pub temperatures: StageTemperatures,

    /// Folder holding reference documents
    pub references_folder: PathBuf,

    /// Labels the detector may answer with
    pub vocabulary: LanguageVocabulary,

    /// Grounding example turns
    pub examples: GroundingExamples,

    /// Fail when a breakdown does not parse
    pub strict_format: bool,

    /// Fail when the detector answers outside the vocabulary
    pub strict_language: bool,
}

impl PipelineContext {
    /// Build a context from configuration and an already constructed provider
    pub fn from_config(config: &Config, provider: Arc<dyn Provider>) -> Result<Self, PipelineError> {
        let vocabulary = LanguageVocabulary::from_codes(&config.pipeline.languages)
            .map_err(|e| PipelineError::Configuration(format!("{:#}", e)))?;

        Ok(Self {
            provider,
            models: config.get_models(),
            temperatures: config.pipeline.temperatures,
            references_folder: PathBuf::from(&config.pipeline.references_folder),
            vocabulary,
            examples: GroundingExamples::default(),
            strict_format: config.pipeline.strict_format,
            strict_language: config.pipeline.strict_language,
        })
    }

    /// Context with default settings around the given provider
    pub fn for_provider(provider: Arc<dyn Provider>) -> Self {
        let config = Config::default();
        Self {
            provider,
            models: config.get_models(),
            temperatures: StageTemperatures::default(),
            references_folder: PathBuf::from(&config.pipeline.references_folder),
            vocabulary: LanguageVocabulary::default(),
            examples: GroundingExamples::default(),
            strict_format: false,
            strict_language: false,
        }
    }
}

/// Send one stage request and return the trimmed answer.
///
/// A blank answer is an upstream failure of `stage`, whatever the provider.
pub(crate) async fn request_text(
    stage: Stage,
    request: &CompletionRequest,
    ctx: &PipelineContext,
) -> Result<String, PipelineError> {
    let text = ctx.provider
        .complete(request)
        .await
        .map_err(PipelineError::upstream(stage))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(PipelineError::UpstreamCall {
            stage,
            source: ProviderError::ParseError(format!("{} returned an empty response", ctx.provider.name())),
        });
    }
    Ok(text.to_string())
}

/// Apply the format policy to a parsed breakdown.
///
/// Returns the parsed value when it conforms. A nonconforming breakdown is
/// an error in strict mode and a warning otherwise.
pub(crate) fn check_format<T>(
    stage: Stage,
    parsed: Result<T, BreakdownError>,
    raw: &str,
    ctx: &PipelineContext,
) -> Result<Option<T>, PipelineError> {
    match parsed {
        Ok(value) => Ok(Some(value)),
        Err(e) if ctx.strict_format => Err(PipelineError::MalformedResponse {
            stage,
            reason: e.to_string(),
            raw: raw.to_string(),
        }),
        Err(e) => {
            warn!("Output of {} does not follow the expected format: {}", stage, e);
            Ok(None)
        }
    }
}

/// Runs the full story pipeline against one provider
#[derive(Debug, Clone)]
pub struct StoryProcessor {
    ctx: PipelineContext,
}

impl StoryProcessor {
    /// Create a processor from a prepared context
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx }
    }

    /// Create a processor and its provider client from configuration.
    ///
    /// `api_key` overrides the configured and environment credentials.
    /// Fails with `Configuration` when a provider that needs a credential
    /// has none.
    pub fn from_config(config: &Config, api_key: Option<String>) -> Result<Self, PipelineError> {
        Self::from_config_with_env(config, api_key, |name| std::env::var(name).ok())
    }

    /// Same as `from_config`, reading fallback credentials through `env`
    pub fn from_config_with_env<F>(config: &Config, api_key: Option<String>, env: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = config.get_endpoint();
        let timeout_secs = config.get_timeout_secs();
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .or_else(|| config.resolve_api_key_with(env));

        let provider: Arc<dyn Provider> = match config.provider {
            ModelProvider::OpenAI => {
                let key = require_key(config.provider, api_key)?;
                if !looks_like_openai_key(&key) {
                    warn!("The OpenAI API key does not look like an OpenAI secret key; continuing anyway");
                }
                Arc::new(OpenAI::new(key, endpoint, timeout_secs))
            }
            ModelProvider::Anthropic => {
                let key = require_key(config.provider, api_key)?;
                Arc::new(Anthropic::new(key, endpoint, timeout_secs))
            }
            ModelProvider::Ollama => Arc::new(Ollama::new(endpoint, timeout_secs)),
            ModelProvider::LMStudio => {
                let key = api_key.unwrap_or_else(|| LM_STUDIO_PLACEHOLDER_KEY.to_string());
                Arc::new(OpenAI::new(key, endpoint, timeout_secs))
            }
        };

        let ctx = PipelineContext::from_config(config, provider)?;
        Ok(Self::new(ctx))
    }

    /// Shared stage context
    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    /// Reference files currently available in the configured folder
    pub fn list_available_references(&self) -> Vec<String> {
        references::list_available(&self.ctx.references_folder)
    }

    /// Turn one raw story into its scene and shot breakdown.
    pub async fn process_story(
        &self,
        raw_story: &str,
        use_references: bool,
    ) -> Result<StoryAnalysisResult, PipelineError> {
        if raw_story.trim().is_empty() {
            return Err(PipelineError::InvalidInput("story text is empty".to_string()));
        }

        let start = Instant::now();

        let bundle = if use_references {
            let bundle = references::load(&self.ctx.references_folder);
            if bundle.is_empty() {
                info!("No reference documents found in {:?}", self.ctx.references_folder);
            } else {
                info!("Using {} reference document(s)", bundle.filenames.len());
            }
            bundle
        } else {
            debug!("References disabled for this story");
            ReferenceBundle::empty()
        };

        info!("Detecting story language");
        let detected = language::detect_language(raw_story, &self.ctx).await?;
        info!("Detected language: {}", detected);

        let translated_story = if detected.needs_translation() {
            info!("Translating story to English");
            Some(language::translate_to_english(raw_story, &detected, &self.ctx).await?)
        } else {
            None
        };
        let story = translated_story.as_deref().unwrap_or(raw_story);

        info!("Segmenting story into scenes");
        let scene_text = scenes::segment(story, &bundle.text, &self.ctx).await?;

        info!("Decomposing scenes into shots");
        let shot_text = shots::decompose(&scene_text, &bundle.text, &self.ctx).await?;

        info!("Story processed in {:.1}s", start.elapsed().as_secs_f64());

        Ok(StoryAnalysisResult {
            original_story: raw_story.to_string(),
            detected_language: detected.label().to_string(),
            translated_story,
            scenes: scene_text,
            shots: shot_text,
            references_used: bundle.filenames,
        })
    }
}

fn require_key(provider: ModelProvider, api_key: Option<String>) -> Result<String, PipelineError> {
    api_key.ok_or_else(|| {
        let hint = provider
            .api_key_env_var()
            .map(|var| format!(" or set {}", var))
            .unwrap_or_default();
        PipelineError::Configuration(format!(
            "No API key configured for {}. Add api_key to the provider entry{}",
            provider.display_name(),
            hint
        ))
    })
}
