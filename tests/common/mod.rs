/*!
 * Common test utilities for the text_to_shots test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use text_to_shots::pipeline::{PipelineContext, StoryProcessor};
use text_to_shots::providers::mock::MockProvider;

/// Scene breakdown following the heading grammar
pub const TWO_SCENE_BREAKDOWN: &str = "SCENE 1 / VILLAGE SQUARE / MORNING / EXTERIOR / HODJA – BAKER
Hodja smells fresh bread.
BAKER (suspicious)
You owe me for the smell!
SCENE 2 / COURTROOM / NOON / INTERIOR / HODJA – BAKER – JUDGE
Hodja jingles his purse.";

/// Shot breakdown for `TWO_SCENE_BREAKDOWN`
pub const TWO_SCENE_SHOTS: &str = "SCENE 1 / VILLAGE SQUARE / MORNING / EXTERIOR / HODJA – BAKER
🎥 Objective: Establish the quarrel.
1. Wide Shot – Bakery stall in the square
Prompt: \"Steam rising from loaves at a village bakery at dawn\"
2. Close-Up – Baker pointing
Prompt: \"An angry baker pointing, flour on his sleeves\"
SCENE 2 / COURTROOM / NOON / INTERIOR / HODJA – BAKER – JUDGE
🎥 Objective: Deliver the punchline.
1. Medium Shot – Hodja jingling coins
Prompt: \"Hodja shaking a leather purse beside his ear, sly smile\"";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Processor around the mock, reading references from `folder`
pub fn processor_with(mock: &MockProvider, folder: &Path) -> StoryProcessor {
    let mut ctx = PipelineContext::for_provider(Arc::new(mock.clone()));
    ctx.references_folder = folder.to_path_buf();
    StoryProcessor::new(ctx)
}

/// Mock answering like a well-behaved model for an English story
pub fn english_story_mock() -> MockProvider {
    MockProvider::scripted(["english", TWO_SCENE_BREAKDOWN, TWO_SCENE_SHOTS])
}
