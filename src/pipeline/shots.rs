/*!
 * Shot decomposition: scene breakdown text to a per-scene shot list.
 *
 * The scene text is the only narrative input; the raw story is never sent.
 */

use log::info;

use crate::breakdown;
use crate::errors::{PipelineError, Stage};
use crate::providers::{ChatMessage, CompletionRequest};

use super::orchestrator::{PipelineContext, check_format, request_text};
use super::prompts::{self, STORYBOARD_INSTRUCTION};

pub fn build_request(scenes: &str, references: &str, ctx: &PipelineContext) -> CompletionRequest {
    CompletionRequest::new(&ctx.models.default_model, ctx.temperatures.decomposition)
        .message(ChatMessage::system(STORYBOARD_INSTRUCTION))
        .message(ChatMessage::user(ctx.examples.shot_turn()))
        .message(ChatMessage::user(prompts::shot_request(references, scenes)))
}

/// Expand segmented scenes into shots
pub async fn decompose(scenes: &str, references: &str, ctx: &PipelineContext) -> Result<String, PipelineError> {
    let request = build_request(scenes, references, ctx);

    let shots = request_text(Stage::ShotDecomposition, &request, ctx).await?;

    if let Some(parsed) = check_format(Stage::ShotDecomposition, breakdown::parse_shots(&shots), &shots, ctx)? {
        let total: usize = parsed.iter().map(|s| s.shots.len()).sum();
        info!("Decomposed {} scene(s) into {} shot(s)", parsed.len(), total);
    }
    Ok(shots)
}
