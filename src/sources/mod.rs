use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod alternative;
pub mod fallback;
pub mod youtube;

pub use alternative::AlternativeSource;
pub use fallback::FallbackSource;
pub use youtube::YoutubeCaptionSource;

use crate::extractors::VideoId;
use crate::TranscriptError;

/// Result of asking a source for a transcript
pub type FetchOutcome = std::result::Result<TranscriptDocument, TranscriptError>;

/// One captioned span of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text, exactly as the upstream delivered it
    pub text: String,

    /// Duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// Start offset in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,

    /// Language code of the caption track
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl TranscriptSegment {
    /// Segment with no timing metadata
    pub fn untimed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration: None,
            offset: None,
            lang: None,
        }
    }
}

/// Ordered, non-empty sequence of segments in upstream order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TranscriptDocument {
    segments: Vec<TranscriptSegment>,
}

// Never empty, so there is no `is_empty`
#[allow(clippy::len_without_is_empty)]
impl TranscriptDocument {
    /// Returns `None` when there are no segments
    pub fn new(segments: Vec<TranscriptSegment>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    /// Single untimed segment holding an already-joined transcript; `None` if empty
    pub fn from_text(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() {
            None
        } else {
            Self::new(vec![TranscriptSegment::untimed(text)])
        }
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

/// A place transcripts can be fetched from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for a video
    async fn fetch_transcript(&self, video_id: &VideoId) -> FetchOutcome;

    /// Short name used in logs
    fn source_name(&self) -> &'static str;
}
