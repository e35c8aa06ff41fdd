use async_trait::async_trait;
use std::sync::Arc;

use super::{FetchOutcome, TranscriptSource};
use crate::extractors::VideoId;
use crate::TranscriptError;

/// Tries `primary`, then `secondary` when the primary has nothing or fails upstream
pub struct FallbackSource {
    primary: Arc<dyn TranscriptSource>,
    secondary: Arc<dyn TranscriptSource>,
}

impl FallbackSource {
    pub fn new(primary: Arc<dyn TranscriptSource>, secondary: Arc<dyn TranscriptSource>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl TranscriptSource for FallbackSource {
    async fn fetch_transcript(&self, video_id: &VideoId) -> FetchOutcome {
        let primary_err = match self.primary.fetch_transcript(video_id).await {
            Ok(doc) => return Ok(doc),
            Err(err @ TranscriptError::InvalidInput(_)) => return Err(err),
            Err(err) => err,
        };

        tracing::warn!(
            "{} failed for {} ({}), trying {}",
            self.primary.source_name(),
            video_id,
            primary_err,
            self.secondary.source_name()
        );

        let secondary_err = match self.secondary.fetch_transcript(video_id).await {
            Ok(doc) => return Ok(doc),
            Err(err) => err,
        };

        Err(combine_failures(primary_err, secondary_err))
    }

    fn source_name(&self) -> &'static str {
        "fallback"
    }
}

/// Any "not found" wins over upstream failures
fn combine_failures(primary: TranscriptError, secondary: TranscriptError) -> TranscriptError {
    match (primary, secondary) {
        (err @ TranscriptError::NotFound(_), _) => err,
        (_, err @ TranscriptError::NotFound(_)) => err,
        (err @ TranscriptError::InvalidInput(_), _) => err,
        (_, err @ TranscriptError::InvalidInput(_)) => err,
        (TranscriptError::Upstream(first), TranscriptError::Upstream(second)) => {
            TranscriptError::Upstream(format!("{}; fallback: {}", first, second))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{MockTranscriptSource, TranscriptDocument};

    fn video_id() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    fn source(outcome: FetchOutcome, calls: usize, name: &'static str) -> Arc<dyn TranscriptSource> {
        let mut mock = MockTranscriptSource::new();
        mock.expect_fetch_transcript()
            .times(calls)
            .returning(move |_| outcome.clone());
        mock.expect_source_name().return_const(name);
        Arc::new(mock)
    }

    fn doc(text: &str) -> FetchOutcome {
        Ok(TranscriptDocument::from_text(text).unwrap())
    }

    #[tokio::test]
    async fn test_primary_success_skips_secondary() {
        let fallback = FallbackSource::new(source(doc("primary"), 1, "a"), source(doc("secondary"), 0, "b"));

        let result = fallback.fetch_transcript(&video_id()).await.unwrap();
        assert_eq!(result.segments()[0].text, "primary");
    }

    #[tokio::test]
    async fn test_falls_back_on_upstream_error() {
        let primary = source(Err(TranscriptError::Upstream("boom".into())), 1, "a");
        let fallback = FallbackSource::new(primary, source(doc("secondary"), 1, "b"));

        let result = fallback.fetch_transcript(&video_id()).await.unwrap();
        assert_eq!(result.segments()[0].text, "secondary");
    }

    #[tokio::test]
    async fn test_falls_back_on_not_found() {
        let primary = source(Err(TranscriptError::NotFound("none".into())), 1, "a");
        let fallback = FallbackSource::new(primary, source(doc("secondary"), 1, "b"));

        assert!(fallback.fetch_transcript(&video_id()).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_input_is_not_retried() {
        let primary = source(Err(TranscriptError::InvalidInput("bad".into())), 1, "a");
        let fallback = FallbackSource::new(primary, source(doc("secondary"), 0, "b"));

        let err = fallback.fetch_transcript(&video_id()).await.unwrap_err();
        assert!(matches!(err, TranscriptError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_not_found_wins_when_both_fail() {
        let primary = source(Err(TranscriptError::NotFound("no captions".into())), 1, "a");
        let secondary = source(Err(TranscriptError::Upstream("down".into())), 1, "b");
        let fallback = FallbackSource::new(primary, secondary);

        let err = fallback.fetch_transcript(&video_id()).await.unwrap_err();
        assert_eq!(err, TranscriptError::NotFound("no captions".into()));
    }

    #[tokio::test]
    async fn test_both_upstream_failures_are_combined() {
        let primary = source(Err(TranscriptError::Upstream("first".into())), 1, "a");
        let secondary = source(Err(TranscriptError::Upstream("second".into())), 1, "b");
        let fallback = FallbackSource::new(primary, secondary);

        let err = fallback.fetch_transcript(&video_id()).await.unwrap_err();
        assert_eq!(err, TranscriptError::Upstream("first; fallback: second".into()));
    }
}
