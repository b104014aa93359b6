/*!
 * Prompt templates for the story pipeline.
 *
 * Each generative stage gets a system instruction plus one grounding
 * example sent as a prior user turn. The example shows the exact output
 * format; the instruction alone is not enough for reliable compliance.
 */

use crate::language_utils::LanguageVocabulary;

/// Marks the start of a grounding example turn
pub const EXAMPLE_HEADER: &str = "### REFERENCE EXAMPLE ###";

/// Marks the reference bundle in the final user turn
pub const REFERENCES_HEADER: &str = "### REFERENCE DOCUMENTS ###";

/// Marks the story in the segmentation request
pub const STORY_HEADER: &str = "### RAW STORY TO ANALYZE ###";

/// Marks the scene text in the decomposition request
pub const SCENES_HEADER: &str = "### SCENES TO VISUALIZE ###";

pub const SCENE_ANALYST_INSTRUCTION: &str = "You are a professional script analyst. Using the provided reference documents, break the raw story into as many scenes as necessary. Start a new scene only when the location, time of day, emotional tone, or main characters change. Do not merge distinct story beats into a single scene, and do not split a single continuous beat across scenes. Use this exact format for each scene header:\nSCENE <n> / <LOCATION> / <TIME> / <INTERIOR|EXTERIOR> / <CHARACTER>[–<CHARACTER>...]\nThen list concise action descriptions and dialogue in English. No commentary and no non-English text.";

pub const STORYBOARD_INSTRUCTION: &str = "You are an experienced storyboard artist. Using only the provided scene list, create a dynamic number of shots per scene. The number of shots must be based on the scene's content and complexity; do not use a fixed count. A simple action might only need 1-2 shots, while a complex dialogue or action sequence could require 8 or more. For each scene, repeat its SCENE header, then write one Objective line stating the visual intent, then the shot list. Numbering restarts at 1 for every scene. Use this format:\n<number>. <Shot Title> – <brief action>\nPrompt: \"<vivid English prompt>\"";

const TRANSLATOR_INSTRUCTION: &str = "You are a professional translator. Translate the following story from {source_language} to fluent, natural English suitable for film scene analysis. Keep every story beat, character name, and line of dialogue. Respond with the translation only.";

pub const EXAMPLE_STORY: &str = r#""Wife, You Are Right Too" Anecdote
Film Treatment
One day, a neighbor comes to Hodja's house, upset. He complains about his wife and asks Hodja to judge who is right. Hodja listens, nods, and says, "You are right."
After the neighbor leaves, his wife comes in, equally upset. She presents her side. Hodja nods and says, "You are right too." Hodja's own wife, having overheard, says, "How can both be right?" Hodja pauses, thinks, and replies, "Wife, you are right too.""#;

pub const EXAMPLE_SCENES: &str = "SCENE 1 / HODJA'S COURTYARD / DAY / EXTERIOR / HODJA – NEIGHBOR
Hodja greets his agitated neighbor and listens to the complaint.
NEIGHBOR (agitated)
Hodja, you must help me with this matter!
HODJA (calmly)
Tell me what troubles you, my friend.
SCENE 2 / HODJA'S COURTYARD / DAY / EXTERIOR / HODJA – COMPLAINANT
Hodja tells the man, \"You are right,\" and sends him away.
HODJA (raising his hand)
You are right, my friend.
COMPLAINANT (relieved)
Thank you, Hodja. I knew you would understand.";

pub const EXAMPLE_SHOTS: &str = "# EXAMPLE SCENE (4 SHOTS - MORE COMPLEX)
SCENE 1 / HODJA'S COURTYARD / DAY / EXTERIOR / HODJA – NEIGHBOR
🎥 Objective: Establish the rural setting, neighbor's agitation, and Hodja's calm demeanor.
1. Wide Shot – Neighbor knocking on the gate
Prompt: \"Morning light over a rustic courtyard, an agitated man pounding on a wooden gate…\"
2. Medium Shot - Hodja opening the gate
Prompt: \"Hodja opens the wooden gate, his expression is calm and welcoming.\"
3. Two-Shot – Neighbor explaining his problem animatedly
Prompt: \"The neighbor gestures wildly while complaining, Hodja listens patiently, nodding.\"
4. Close-Up – Hodja's calm face
Prompt: \"Hodja's serene expression as he listens, soft shadows under his turban.\"
# EXAMPLE SCENE (2 SHOTS - SIMPLER)
SCENE 2 / HODJA'S COURTYARD / DAY / EXTERIOR / HODJA – COMPLAINANT
🎥 Objective: Show Hodja's judgment and the complainant's relief.
1. Medium Shot – Hodja raising a reassuring hand
Prompt: \"Hodja seated on a low wooden bench, palm up, saying 'You are right'...\"
2. Wide Shot – Complainant departing happily
Prompt: \"Man walking away from the courtyard, posture relaxed, bright midday sun.\"";

/// Fixed input/output pairs injected ahead of the real request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingExamples {
    /// Example raw story
    pub story: String,
    /// Scene breakdown of `story`
    pub scenes: String,
    /// Shot breakdown of `scenes`
    pub shots: String,
}

impl Default for GroundingExamples {
    fn default() -> Self {
        Self {
            story: EXAMPLE_STORY.to_string(),
            scenes: EXAMPLE_SCENES.to_string(),
            shots: EXAMPLE_SHOTS.to_string(),
        }
    }
}

impl GroundingExamples {
    /// Grounding turn for the scene segmenter
    pub fn scene_turn(&self) -> String {
        format!(
            "{}\nRaw story (example):\n{}\n{}\nEnd example.",
            EXAMPLE_HEADER, self.story, self.scenes
        )
    }

    /// Grounding turn for the shot decomposer
    pub fn shot_turn(&self) -> String {
        format!("{}\n{}\nEnd example.", EXAMPLE_HEADER, self.shots)
    }
}

/// Instruction restricting the detector to the vocabulary
pub fn detector_instruction(vocabulary: &LanguageVocabulary) -> String {
    format!(
        "You are a language detector. Answer only with {}.",
        vocabulary.as_choice_list()
    )
}

/// Instruction for the translator persona
pub fn translator_instruction(source_language: Option<&str>) -> String {
    let source = match source_language {
        Some(label) => capitalize(label),
        None => "its original language".to_string(),
    };
    TRANSLATOR_INSTRUCTION.replace("{source_language}", &source)
}

/// Final user turn of the segmentation request
pub fn scene_request(references: &str, story: &str) -> String {
    format!("{}\n{}\n\n{}\n{}", REFERENCES_HEADER, references, STORY_HEADER, story)
}

/// Final user turn of the decomposition request
pub fn shot_request(references: &str, scenes: &str) -> String {
    format!(
        "{}\n{}\n\n{}\n{}\n\nGenerate shots for the scenes above:",
        REFERENCES_HEADER, references, SCENES_HEADER, scenes
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
