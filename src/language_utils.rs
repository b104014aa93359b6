/*!
 * Language label utilities
 *
 * The detection stage asks the model to answer with a bare lowercase
 * English language name ("turkish", "english"). The set of accepted
 * labels is configured as ISO 639-1 / 639-3 codes and mapped to names here.
 */

use anyhow::{Result, anyhow};
use isolang::Language;
use std::fmt;

/// Canonical label of the language that never needs translation
pub const ENGLISH_LABEL: &str = "english";

/// Get the lowercase English name used as a detection label for a code
pub fn label_for_code(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    let lang = match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => Language::from_639_3(&normalized_code),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Invalid language code: {}", code))?;

    // isolang names can carry a qualifier, e.g. "Modern Greek (1453-)"
    let name = lang.to_name();
    let name = name.split(" (").next().unwrap_or(name);
    Ok(name.trim().to_lowercase())
}

/// Result of classifying a detection response against the vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectedLanguage {
    /// The canonical English label
    English,
    /// A label from the configured vocabulary other than English
    Known(String),
    /// A response outside the vocabulary, kept as given
    Unrecognized(String),
}

impl DetectedLanguage {
    /// Whether translation to English is needed
    pub fn needs_translation(&self) -> bool {
        !matches!(self, Self::English)
    }

    /// Label stored in the analysis result
    pub fn label(&self) -> &str {
        match self {
            Self::English => ENGLISH_LABEL,
            Self::Known(label) | Self::Unrecognized(label) => label,
        }
    }
}

impl fmt::Display for DetectedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Closed set of labels the detector may answer with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageVocabulary {
    labels: Vec<String>,
}

impl LanguageVocabulary {
    /// Build a vocabulary from ISO codes. English is always included.
    pub fn from_codes<S: AsRef<str>>(codes: &[S]) -> Result<Self> {
        let mut labels = Vec::new();
        for code in codes {
            let label = label_for_code(code.as_ref())?;
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        if !labels.iter().any(|l| l == ENGLISH_LABEL) {
            labels.push(ENGLISH_LABEL.to_string());
        }
        Ok(Self { labels })
    }

    /// Accepted labels in prompt order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Render the labels for the detector instruction: `'turkish' or 'english'`
    pub fn as_choice_list(&self) -> String {
        let quoted: Vec<String> = self.labels.iter().map(|l| format!("'{}'", l)).collect();
        match quoted.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
            Some((last, _)) => last.clone(),
            None => String::new(),
        }
    }

    /// Classify a raw model answer.
    ///
    /// Whitespace, quotes, and trailing punctuation are stripped and the
    /// comparison is case-insensitive.
    pub fn classify(&self, raw: &str) -> DetectedLanguage {
        let cleaned = raw
            .trim()
            .trim_matches(|c: char| c == '\'' || c == '"' || c == '`' || c == '.' || c.is_whitespace())
            .to_lowercase();

        if cleaned == ENGLISH_LABEL {
            DetectedLanguage::English
        } else if self.labels.contains(&cleaned) {
            DetectedLanguage::Known(cleaned)
        } else {
            DetectedLanguage::Unrecognized(cleaned)
        }
    }
}

impl Default for LanguageVocabulary {
    fn default() -> Self {
        Self {
            labels: vec!["turkish".to_string(), ENGLISH_LABEL.to_string()],
        }
    }
}
