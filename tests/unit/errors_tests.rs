/*!
 * Tests for error types and conversions
 */

use std::error::Error;

use text_to_shots::errors::{AppError, PipelineError, ProviderError, Stage};

#[test]
fn test_fromStatus_shouldMapStatusCodes() {
    assert!(matches!(
        ProviderError::from_status(401, "bad key".to_string()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(403, "forbidden".to_string()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(429, "slow down".to_string()),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        ProviderError::from_status(500, "boom".to_string()),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

#[test]
fn test_upstreamCall_shouldNameStageAndKeepSource() {
    let error = PipelineError::upstream(Stage::SceneSegmentation)(ProviderError::ConnectionError(
        "timed out".to_string(),
    ));

    assert_eq!(
        error.to_string(),
        "Upstream call failed during scene segmentation: Connection error: timed out"
    );
    assert!(error.source().is_some());
}

#[test]
fn test_appError_fromPipelineError_shouldWrap() {
    let app_error: AppError = PipelineError::InvalidInput("story text is empty".to_string()).into();

    assert!(matches!(app_error, AppError::Pipeline(PipelineError::InvalidInput(_))));
    assert_eq!(app_error.to_string(), "Pipeline error: Invalid input: story text is empty");
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "story.txt missing");
    let app_error: AppError = io_error.into();

    assert!(matches!(app_error, AppError::File(msg) if msg.contains("story.txt")));
}
