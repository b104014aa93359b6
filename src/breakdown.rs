/*!
 * Parsers for the scene and shot text the pipeline produces.
 *
 * Both stages return semi-structured text. These parsers turn it into typed
 * values and report the first place where the text breaks the grammar:
 *
 * ```text
 * SCENE <n> / <LOCATION> / <TIME> / <INTERIOR|EXTERIOR> / <CHARACTER>[–<CHARACTER>...]
 * ```
 *
 * ```text
 * SCENE <n> / ...
 * Objective: <visual intent>
 * <n>. <Shot Title> – <brief action>
 * Prompt: "<vivid English prompt>"
 * ```
 *
 * Shot numbers are scene-local and restart at 1 for every scene.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Full scene heading
static SCENE_HEADING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^SCENE\s+(\d+)\s*/\s*([^/]+?)\s*/\s*([^/]+?)\s*/\s*(INTERIOR|EXTERIOR|INT\.?|EXT\.?)\s*/\s*(.+?)\s*$",
    )
    .unwrap()
});

/// Anything that starts like a scene heading
static SCENE_PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^SCENE\s+(\d+)\b").unwrap());

/// Character list separators: en dash, em dash, or a spaced hyphen
static CHARACTER_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[–—]\s*|\s+-\s+|\s*,\s*").unwrap());

/// `<n>. <title> – <action>`
static SHOT_LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s+(.+?)\s+[–—-]\s+(.+?)\s*$").unwrap());

/// `Prompt: "..."`
static PROMPT_LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)^prompt\s*:\s*(.*?)\s*$"#).unwrap());

/// `🎥 Objective: ...`
static OBJECTIVE_LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\W*objective\s*:\s*(.+?)\s*$").unwrap());

/// Ways a breakdown can violate its grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BreakdownError {
    #[error("no scene headings found")]
    NoScenes,

    #[error("malformed scene heading on line {line}: {text}")]
    MalformedHeading { line: usize, text: String },

    #[error("scene numbers out of order: expected {expected}, found {found}")]
    SceneNumbering { expected: u32, found: u32 },

    #[error("shot found before any scene heading on line {line}")]
    ShotOutsideScene { line: usize },

    #[error("scene {scene}: shot numbering expected {expected}, found {found}")]
    ShotNumbering { scene: u32, expected: u32, found: u32 },

    #[error("scene {scene}: shot {shot} has no Prompt line")]
    MissingPrompt { scene: u32, shot: u32 },

    #[error("scene {scene}: Prompt line on line {line} does not follow a shot")]
    OrphanPrompt { scene: u32, line: usize },

    #[error("scene {scene} has no Objective line")]
    MissingObjective { scene: u32 },

    #[error("scene {scene} has no shots")]
    EmptyScene { scene: u32 },
}

/// Interior or exterior setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Setting {
    Interior,
    Exterior,
}

impl Setting {
    fn parse(token: &str) -> Option<Self> {
        match token.trim_end_matches('.').to_uppercase().as_str() {
            "INTERIOR" | "INT" => Some(Self::Interior),
            "EXTERIOR" | "EXT" => Some(Self::Exterior),
            _ => None,
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interior => f.write_str("INTERIOR"),
            Self::Exterior => f.write_str("EXTERIOR"),
        }
    }
}

/// One scene of a scene breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub number: u32,
    pub location: String,
    pub time: String,
    pub setting: Setting,
    pub characters: Vec<String>,
    /// Action and dialogue lines, blank lines dropped
    pub body: Vec<String>,
}

impl Scene {
    /// Canonical heading line
    pub fn heading(&self) -> String {
        format!(
            "SCENE {} / {} / {} / {} / {}",
            self.number,
            self.location,
            self.time,
            self.setting,
            self.characters.join(" – ")
        )
    }
}

/// One numbered shot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shot {
    pub number: u32,
    pub title: String,
    pub action: String,
    pub prompt: String,
}

/// Shot list for one scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneShots {
    pub scene_number: u32,
    /// Heading line as written by the model
    pub heading: String,
    pub objective: String,
    pub shots: Vec<Shot>,
}

/// Strip markdown decoration. Returns `None` for comment lines.
fn clean_line(line: &str) -> Option<&str> {
    let line = line.trim().trim_matches('*').trim();
    if let Some(rest) = line.strip_prefix('#') {
        let rest = rest.trim_start_matches('#').trim();
        return if SCENE_PREFIX_REGEX.is_match(rest) { Some(rest) } else { None };
    }
    Some(line)
}

fn parse_heading(text: &str, line: usize) -> Result<Scene, BreakdownError> {
    let malformed = || BreakdownError::MalformedHeading { line, text: text.to_string() };
    let caps = SCENE_HEADING_REGEX.captures(text).ok_or_else(malformed)?;

    let number = caps[1].parse::<u32>().map_err(|_| malformed())?;
    let setting = Setting::parse(&caps[4]).ok_or_else(malformed)?;
    let characters: Vec<String> = CHARACTER_SEPARATOR_REGEX
        .split(&caps[5])
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if characters.is_empty() {
        return Err(malformed());
    }

    Ok(Scene {
        number,
        location: caps[2].trim().to_string(),
        time: caps[3].trim().to_string(),
        setting,
        characters,
        body: Vec::new(),
    })
}

/// Parse a scene breakdown.
///
/// Text before the first heading is ignored. Scene numbers must run 1, 2, 3...
pub fn parse_scenes(text: &str) -> Result<Vec<Scene>, BreakdownError> {
    let mut scenes: Vec<Scene> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let Some(line) = clean_line(raw) else { continue };
        if line.is_empty() {
            continue;
        }

        if SCENE_PREFIX_REGEX.is_match(line) {
            let scene = parse_heading(line, line_no)?;
            let expected = scenes.len() as u32 + 1;
            if scene.number != expected {
                return Err(BreakdownError::SceneNumbering { expected, found: scene.number });
            }
            scenes.push(scene);
        } else if let Some(current) = scenes.last_mut() {
            current.body.push(line.to_string());
        }
    }

    if scenes.is_empty() {
        return Err(BreakdownError::NoScenes);
    }
    Ok(scenes)
}

fn unquote(prompt: &str) -> String {
    let trimmed = prompt.trim();
    let trimmed = trimmed
        .strip_prefix(['"', '“'])
        .unwrap_or(trimmed);
    let trimmed = trimmed
        .strip_suffix(['"', '”'])
        .unwrap_or(trimmed);
    trimmed.trim().to_string()
}

fn finish_scene(scene: Option<SceneShots>, out: &mut Vec<SceneShots>) -> Result<(), BreakdownError> {
    let Some(scene) = scene else { return Ok(()) };
    if scene.objective.is_empty() {
        return Err(BreakdownError::MissingObjective { scene: scene.scene_number });
    }
    match scene.shots.last() {
        None => return Err(BreakdownError::EmptyScene { scene: scene.scene_number }),
        Some(shot) if shot.prompt.is_empty() => {
            return Err(BreakdownError::MissingPrompt { scene: scene.scene_number, shot: shot.number });
        }
        Some(_) => {}
    }
    out.push(scene);
    Ok(())
}

/// Parse a shot breakdown.
///
/// Every scene needs an Objective line and at least one shot; every shot
/// needs a Prompt line; shot numbers restart at 1 in each scene.
pub fn parse_shots(text: &str) -> Result<Vec<SceneShots>, BreakdownError> {
    let mut scenes = Vec::new();
    let mut current: Option<SceneShots> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let Some(line) = clean_line(raw) else { continue };
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = SCENE_PREFIX_REGEX.captures(line) {
            finish_scene(current.take(), &mut scenes)?;
            let scene_number = caps[1].parse::<u32>().map_err(|_| BreakdownError::MalformedHeading {
                line: line_no,
                text: line.to_string(),
            })?;
            current = Some(SceneShots {
                scene_number,
                heading: line.to_string(),
                objective: String::new(),
                shots: Vec::new(),
            });
            continue;
        }

        if let Some(caps) = SHOT_LINE_REGEX.captures(line) {
            let scene = current.as_mut().ok_or(BreakdownError::ShotOutsideScene { line: line_no })?;
            let number = caps[1].parse::<u32>().unwrap_or(0);
            if let Some(previous) = scene.shots.last() {
                if previous.prompt.is_empty() {
                    return Err(BreakdownError::MissingPrompt {
                        scene: scene.scene_number,
                        shot: previous.number,
                    });
                }
            }
            let expected = scene.shots.len() as u32 + 1;
            if number != expected {
                return Err(BreakdownError::ShotNumbering {
                    scene: scene.scene_number,
                    expected,
                    found: number,
                });
            }
            scene.shots.push(Shot {
                number,
                title: caps[2].trim().to_string(),
                action: caps[3].trim().to_string(),
                prompt: String::new(),
            });
            continue;
        }

        if let Some(caps) = PROMPT_LINE_REGEX.captures(line) {
            let scene = current.as_mut().ok_or(BreakdownError::ShotOutsideScene { line: line_no })?;
            let scene_number = scene.scene_number;
            match scene.shots.last_mut() {
                Some(shot) if shot.prompt.is_empty() => shot.prompt = unquote(&caps[1]),
                _ => return Err(BreakdownError::OrphanPrompt { scene: scene_number, line: line_no }),
            }
            continue;
        }

        if let Some(caps) = OBJECTIVE_LINE_REGEX.captures(line) {
            if let Some(scene) = current.as_mut() {
                if scene.objective.is_empty() {
                    scene.objective = caps[1].to_string();
                }
            }
        }
    }

    finish_scene(current.take(), &mut scenes)?;
    if scenes.is_empty() {
        return Err(BreakdownError::NoScenes);
    }
    Ok(scenes)
}
