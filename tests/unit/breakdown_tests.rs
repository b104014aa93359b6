/*!
 * Tests for the scene and shot breakdown parsers
 */

use text_to_shots::breakdown::{self, BreakdownError, Setting};

use crate::common::{TWO_SCENE_BREAKDOWN, TWO_SCENE_SHOTS};

#[test]
fn test_parseScenes_withMultipleCharacters_shouldSplitOnEveryDash() {
    let scenes = breakdown::parse_scenes(TWO_SCENE_BREAKDOWN).unwrap();

    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[0].characters, vec!["HODJA", "BAKER"]);
    assert_eq!(scenes[1].characters, vec!["HODJA", "BAKER", "JUDGE"]);
    assert_eq!(scenes[1].setting, Setting::Interior);
    assert_eq!(scenes[0].body.len(), 3);
}

#[test]
fn test_parseScenes_withAbbreviatedSetting_shouldAcceptIt() {
    let scenes = breakdown::parse_scenes("SCENE 1 / ROOFTOP / DUSK / EXT. / HODJA - DONKEY").unwrap();

    assert_eq!(scenes[0].setting, Setting::Exterior);
    assert_eq!(scenes[0].characters, vec!["HODJA", "DONKEY"]);
}

#[test]
fn test_parseShots_withTwoScenes_shouldRestartNumbering() {
    let scenes = breakdown::parse_shots(TWO_SCENE_SHOTS).unwrap();

    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[0].shots.iter().map(|s| s.number).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(scenes[1].shots[0].number, 1);
    assert_eq!(scenes[1].objective, "Deliver the punchline.");
    assert_eq!(scenes[0].shots[1].title, "Close-Up");
    assert_eq!(scenes[0].shots[1].prompt, "An angry baker pointing, flour on his sleeves");
}

#[test]
fn test_parseShots_withNumberingCarriedAcrossScenes_shouldFail() {
    let continuous = TWO_SCENE_SHOTS.replace("1. Medium Shot", "3. Medium Shot");

    assert_eq!(
        breakdown::parse_shots(&continuous),
        Err(BreakdownError::ShotNumbering { scene: 2, expected: 1, found: 3 })
    );
}

#[test]
fn test_parseShots_withPromptBeforeAnyShot_shouldFail() {
    let text = "SCENE 1 / A / DAY / EXTERIOR / X\nObjective: y\nPrompt: \"stray\"";

    assert!(matches!(
        breakdown::parse_shots(text),
        Err(BreakdownError::OrphanPrompt { scene: 1, .. })
    ));
}
