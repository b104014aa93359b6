/*!
 * Language detection and translation to English.
 */

use log::{debug, info, warn};

use crate::errors::{PipelineError, Stage};
use crate::language_utils::DetectedLanguage;
use crate::providers::{ChatMessage, CompletionRequest};

use super::orchestrator::{PipelineContext, request_text};
use super::prompts;

/// Ask the model which vocabulary label describes `text`.
///
/// Unrecognized answers are kept and treated as non-English, unless the
/// context requires a strict vocabulary match.
pub async fn detect_language(text: &str, ctx: &PipelineContext) -> Result<DetectedLanguage, PipelineError> {
    let request = CompletionRequest::new(&ctx.models.language_detect_model, ctx.temperatures.detection)
        .message(ChatMessage::system(prompts::detector_instruction(&ctx.vocabulary)))
        .message(ChatMessage::user(text));

    let answer = request_text(Stage::LanguageDetection, &request, ctx).await?;

    let detected = ctx.vocabulary.classify(&answer);
    if let DetectedLanguage::Unrecognized(label) = &detected {
        if ctx.strict_language {
            return Err(PipelineError::MalformedResponse {
                stage: Stage::LanguageDetection,
                reason: format!(
                    "'{}' is not one of {}",
                    label,
                    ctx.vocabulary.as_choice_list()
                ),
                raw: answer,
            });
        }
        warn!("Detector answered '{}', outside the configured languages; translating anyway", label);
    }

    debug!("Raw detector answer: {:?}", answer);
    Ok(detected)
}

/// Translate `text` to English.
pub async fn translate_to_english(
    text: &str,
    source: &DetectedLanguage,
    ctx: &PipelineContext,
) -> Result<String, PipelineError> {
    let source_label = match source {
        DetectedLanguage::Known(label) => Some(label.as_str()),
        _ => None,
    };

    let request = CompletionRequest::new(&ctx.models.fast_model, ctx.temperatures.translation)
        .message(ChatMessage::system(prompts::translator_instruction(source_label)))
        .message(ChatMessage::user(text));

    let translation = request_text(Stage::Translation, &request, ctx).await?;

    info!("Translated {} characters of {} into English", text.chars().count(), source);
    Ok(translation)
}
