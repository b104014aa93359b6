/*!
 * Data models returned by the story pipeline.
 */

use serde::{Deserialize, Serialize};

use crate::breakdown::{self, BreakdownError, Scene, SceneShots};

/// Conditioning text used when no reference document contributes
pub const NO_REFERENCES: &str = "No references provided.";

/// Reference documents combined into one conditioning blob.
///
/// Built fresh for every pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceBundle {
    /// Labeled, truncated blocks joined by blank lines, or the sentinel
    pub text: String,
    /// Files that contributed a block, in enumeration order
    pub filenames: Vec<String>,
}

impl ReferenceBundle {
    /// The "no references" bundle
    pub fn empty() -> Self {
        Self {
            text: NO_REFERENCES.to_string(),
            filenames: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty()
    }
}

impl Default for ReferenceBundle {
    fn default() -> Self {
        Self::empty()
    }
}

/// Result of story analysis containing scenes and shots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryAnalysisResult {
    /// Input text exactly as given
    pub original_story: String,
    /// Canonical lowercase language label
    pub detected_language: String,
    /// English translation, present iff the story was not English
    pub translated_story: Option<String>,
    /// Scene breakdown
    pub scenes: String,
    /// Shot breakdown derived from `scenes`
    pub shots: String,
    /// Reference files incorporated, in discovery order
    pub references_used: Vec<String>,
}

impl StoryAnalysisResult {
    /// Text the scene stage analysed
    pub fn story_for_analysis(&self) -> &str {
        self.translated_story.as_deref().unwrap_or(&self.original_story)
    }

    /// Parse the scene breakdown
    pub fn parse_scenes(&self) -> Result<Vec<Scene>, BreakdownError> {
        breakdown::parse_scenes(&self.scenes)
    }

    /// Parse the shot breakdown
    pub fn parse_shots(&self) -> Result<Vec<SceneShots>, BreakdownError> {
        breakdown::parse_shots(&self.shots)
    }

    /// Human-readable report
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Story Breakdown\n\n");
        out.push_str(&format!("- Detected language: {}\n", self.detected_language));
        if self.references_used.is_empty() {
            out.push_str("- References: none\n");
        } else {
            out.push_str(&format!("- References: {}\n", self.references_used.join(", ")));
        }

        if let Some(translation) = &self.translated_story {
            out.push_str("\n## Translated Story\n\n");
            out.push_str(translation);
            out.push('\n');
        }

        out.push_str("\n## Scenes\n\n```text\n");
        out.push_str(&self.scenes);
        out.push_str("\n```\n\n## Shots\n\n```text\n");
        out.push_str(&self.shots);
        out.push_str("\n```\n");
        out
    }
}
