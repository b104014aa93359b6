/*!
 * Tests for reference document loading
 */

use text_to_shots::models::NO_REFERENCES;
use text_to_shots::pipeline::references;

use crate::common;

#[test]
fn test_load_withMixedFolder_shouldKeepOnlyUsableTextFiles() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "a.txt", &"a".repeat(600)).unwrap();
    common::create_test_file(dir.path(), "b.txt", "").unwrap();
    common::create_test_file(dir.path(), "notes.md", "markdown is not a reference").unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    common::create_test_file(&dir.path().join("nested"), "deep.txt", "too deep").unwrap();

    let bundle = references::load(dir.path());

    assert_eq!(bundle.filenames, vec!["a.txt"]);
    assert!(bundle.text.starts_with("--- Ref: a.txt ---\n"));
    assert!(bundle.text.ends_with("..."));
    assert!(!bundle.text.contains("too deep"));
}

#[test]
fn test_load_withUppercaseExtension_shouldIncludeFile() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "WORLD.TXT", "A dusty Anatolian village").unwrap();

    let bundle = references::load(dir.path());

    assert_eq!(bundle.filenames, vec!["WORLD.TXT"]);
}

#[test]
fn test_load_withOnlyEmptyFiles_shouldReturnSentinel() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "blank.txt", "\n\n").unwrap();

    let bundle = references::load(dir.path());

    assert_eq!(bundle.text, NO_REFERENCES);
    assert!(bundle.filenames.is_empty());
}

#[cfg(unix)]
#[test]
fn test_load_withDanglingSymlink_shouldKeepReadableReferences() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "good.txt", "Warm palette").unwrap();
    std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("broken.txt")).unwrap();

    let bundle = references::load(dir.path());

    assert_eq!(bundle.filenames, vec!["good.txt"]);
    assert_eq!(bundle.text, "--- Ref: good.txt ---\nWarm palette");
}

#[test]
fn test_referenceBlock_withExactlyLimit_shouldNotAddMarker() {
    let content = "b".repeat(references::MAX_REFERENCE_CHARS);

    let block = references::reference_block("b.txt", &content);

    assert_eq!(block, format!("--- Ref: b.txt ---\n{}", content));
}
