/*!
 * End-to-end story processing with a mock provider
 */

use std::sync::Arc;

use text_to_shots::errors::{PipelineError, Stage};
use text_to_shots::pipeline::{PipelineContext, StoryProcessor, language, scenes, shots};
use text_to_shots::providers::mock::MockProvider;
use text_to_shots::providers::{CompletionRequest, Role};

use crate::common::{self, TWO_SCENE_BREAKDOWN, TWO_SCENE_SHOTS};

#[tokio::test]
async fn test_processStory_withWellFormedModel_shouldReturnParsableBreakdown() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "characters.txt", "Hodja: witty village sage").unwrap();
    let mock = common::english_story_mock();

    let result = common::processor_with(&mock, dir.path())
        .process_story("Hodja smells the bread and pays with the sound of coins.", true)
        .await
        .unwrap();

    assert_eq!(result.detected_language, "english");
    assert!(result.translated_story.is_none());
    assert_eq!(result.references_used, vec!["characters.txt"]);
    assert_eq!(result.parse_scenes().unwrap().len(), 2);
    assert_eq!(result.parse_shots().unwrap()[0].shots.len(), 2);

    // Shot request carries the scene text and the references, never the raw story
    let shot_request = &mock.requests()[2];
    let last = shot_request.last_user_content().unwrap();
    assert!(last.contains(TWO_SCENE_BREAKDOWN));
    assert!(last.contains("--- Ref: characters.txt ---\nHodja: witty village sage"));
    assert!(!last.contains("pays with the sound of coins"));
}

#[tokio::test]
async fn test_processStory_withTurkishStory_shouldAnalyseTranslation() {
    let dir = common::create_temp_dir().unwrap();
    let mock = MockProvider::scripted([
        "turkish",
        "Hodja smells the bread.",
        TWO_SCENE_BREAKDOWN,
        TWO_SCENE_SHOTS,
    ]);

    let result = common::processor_with(&mock, dir.path())
        .process_story("Hoca ekmeğin kokusunu alır.", false)
        .await
        .unwrap();

    assert_eq!(result.translated_story.as_deref(), Some("Hodja smells the bread."));
    assert_eq!(result.story_for_analysis(), "Hodja smells the bread.");

    let requests = mock.requests();
    assert_eq!(requests.len(), 4);
    assert!(requests[2].last_user_content().unwrap().ends_with("Hodja smells the bread."));
    assert!(!requests[2].last_user_content().unwrap().contains("ekmeğin"));
}

#[tokio::test]
async fn test_processStory_withFailingProvider_shouldReturnNoPartialResult() {
    let dir = common::create_temp_dir().unwrap();
    let mock = MockProvider::failing();

    let err = common::processor_with(&mock, dir.path())
        .process_story("Any story", true)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::UpstreamCall { stage: Stage::LanguageDetection, .. }));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_processStory_withStrictFormat_shouldRejectProseScenes() {
    let dir = common::create_temp_dir().unwrap();
    let mock = MockProvider::scripted(["english", "The story has one long scene."]);
    let mut ctx = PipelineContext::for_provider(Arc::new(mock.clone()));
    ctx.references_folder = dir.path().to_path_buf();
    ctx.strict_format = true;

    let err = StoryProcessor::new(ctx)
        .process_story("A story", true)
        .await
        .unwrap_err();

    match err {
        PipelineError::MalformedResponse { stage, raw, .. } => {
            assert_eq!(stage, Stage::SceneSegmentation);
            assert_eq!(raw, "The story has one long scene.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // Decomposition never ran
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn test_processStory_concurrentStories_shouldNotShareState() {
    let dir = common::create_temp_dir().unwrap();
    let mock = MockProvider::echo().with_custom_response(|request: &CompletionRequest| {
        if request.messages.len() == 2 && request.temperature == 0.0 {
            "english".to_string()
        } else {
            request.last_user_content().unwrap_or_default().to_string()
        }
    });
    let processor = common::processor_with(&mock, dir.path());

    let (first, second) = tokio::join!(
        processor.process_story("The first tale.", false),
        processor.process_story("The second tale.", false),
    );

    assert!(first.unwrap().scenes.ends_with("The first tale."));
    assert!(second.unwrap().scenes.ends_with("The second tale."));
    assert_eq!(mock.call_count(), 6);
}

#[test]
fn test_stagesAlone_shouldBeCallableWithAnyProvider() {
    let mock = MockProvider::scripted(["english", TWO_SCENE_BREAKDOWN, TWO_SCENE_SHOTS]);
    let ctx = PipelineContext::for_provider(Arc::new(mock.clone()));

    let detected = tokio_test::block_on(language::detect_language("A tale", &ctx)).unwrap();
    let scene_text = tokio_test::block_on(scenes::segment("A tale", "No references provided.", &ctx)).unwrap();
    let shot_text = tokio_test::block_on(shots::decompose(&scene_text, "No references provided.", &ctx)).unwrap();

    assert!(!detected.needs_translation());
    assert_eq!(scene_text, TWO_SCENE_BREAKDOWN);
    assert_eq!(shot_text, TWO_SCENE_SHOTS);
    let roles: Vec<Role> = mock.requests()[2].messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::User]);
}
