/*!
 * Story pipeline turning raw prose into scenes and shots.
 *
 * The pipeline processes one story through four stages:
 * 1. **References**: load and truncate the reference documents
 * 2. **Language**: detect the story language, translate to English if needed
 * 3. **Scenes**: segment the English story into headed scenes
 * 4. **Shots**: decompose the scenes into numbered shots with image prompts
 *
 * Every stage is a free function taking its input and a `PipelineContext`,
 * so a stage can be run alone against any `Provider`.
 */

pub mod language;
pub mod orchestrator;
pub mod prompts;
pub mod references;
pub mod scenes;
pub mod shots;

// Re-export types used externally
pub use orchestrator::{PipelineContext, StoryProcessor};
pub use prompts::GroundingExamples;
