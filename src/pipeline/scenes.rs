/*!
 * Scene segmentation: raw English story to scene breakdown text.
 */

use log::info;

use crate::breakdown;
use crate::errors::{PipelineError, Stage};
use crate::providers::{ChatMessage, CompletionRequest};

use super::orchestrator::{PipelineContext, check_format, request_text};
use super::prompts::{self, SCENE_ANALYST_INSTRUCTION};

/// Build the segmentation conversation
pub fn build_request(story: &str, references: &str, ctx: &PipelineContext) -> CompletionRequest {
    CompletionRequest::new(&ctx.models.default_model, ctx.temperatures.segmentation)
        .message(ChatMessage::system(SCENE_ANALYST_INSTRUCTION))
        .message(ChatMessage::user(ctx.examples.scene_turn()))
        .message(ChatMessage::user(prompts::scene_request(references, story)))
}

/// Split `story` into scenes, conditioned on the reference bundle text
pub async fn segment(story: &str, references: &str, ctx: &PipelineContext) -> Result<String, PipelineError> {
    let request = build_request(story, references, ctx);

    let scenes = request_text(Stage::SceneSegmentation, &request, ctx).await?;

    if let Some(parsed) = check_format(Stage::SceneSegmentation, breakdown::parse_scenes(&scenes), &scenes, ctx)? {
        info!("Story segmented into {} scene(s)", parsed.len());
    }
    Ok(scenes)
}
