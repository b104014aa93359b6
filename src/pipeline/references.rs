/*!
 * Reference document loading.
 *
 * Reference documents are plain `.txt` files in one folder. Each readable,
 * non-empty file contributes a labeled block holding at most its first
 * `MAX_REFERENCE_CHARS` characters. A missing folder, an unreadable file, or
 * an empty file only means fewer references; none of them is an error.
 */

use log::{debug, warn};
use std::path::Path;

use crate::file_utils::FileManager;
use crate::models::ReferenceBundle;

/// Characters kept from each reference document
pub const MAX_REFERENCE_CHARS: usize = 500;

/// Appended to a block whose document was cut short
pub const TRUNCATION_MARKER: &str = "...";

/// Extension of reference documents
const REFERENCE_EXTENSION: &str = "txt";

/// List reference file names in the folder, sorted by name.
///
/// Returns an empty list when the folder is absent or cannot be listed.
pub fn list_available(folder: &Path) -> Vec<String> {
    reference_paths(folder)
        .iter()
        .map(|path| FileManager::file_name(path))
        .collect()
}

/// Read, truncate, and combine every usable reference document
pub fn load(folder: &Path) -> ReferenceBundle {
    let mut blocks = Vec::new();
    let mut filenames = Vec::new();

    for path in reference_paths(folder) {
        let filename = FileManager::file_name(&path);
        let content = match FileManager::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping unreadable reference {}: {:#}", filename, e);
                continue;
            }
        };

        let content = content.trim();
        if content.is_empty() {
            debug!("Skipping empty reference {}", filename);
            continue;
        }

        blocks.push(reference_block(&filename, content));
        filenames.push(filename);
    }

    if blocks.is_empty() {
        return ReferenceBundle::empty();
    }

    debug!("Loaded {} reference document(s): {}", filenames.len(), filenames.join(", "));
    ReferenceBundle {
        text: blocks.join("\n\n"),
        filenames,
    }
}

/// One labeled block; the marker is added only when content was cut
pub fn reference_block(filename: &str, content: &str) -> String {
    let (excerpt, truncated) = truncate_chars(content, MAX_REFERENCE_CHARS);
    let marker = if truncated { TRUNCATION_MARKER } else { "" };
    format!("--- Ref: {} ---\n{}{}", filename, excerpt, marker)
}

/// First `max` characters of `text`, never splitting a character
fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => (&text[..byte_index], true),
        None => (text, false),
    }
}

fn reference_paths(folder: &Path) -> Vec<std::path::PathBuf> {
    if !FileManager::dir_exists(folder) {
        debug!("Reference folder {:?} does not exist", folder);
        return Vec::new();
    }

    FileManager::find_files_in_dir(folder, REFERENCE_EXTENSION).unwrap_or_else(|e| {
        warn!("Could not list reference folder {:?}: {:#}", folder, e);
        Vec::new()
    })
}
