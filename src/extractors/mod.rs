use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use url::Url;

use crate::TranscriptError;

/// Whole-string match for a bare identifier
static VIDEO_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("video id pattern is valid"));

/// Identifier following a known path marker or `v=`/`vi=` key, anywhere in the input
static EMBEDDED_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:youtube(?:-nocookie)?\.com/(?:[^/]+/.+/|(?:v|vi|e|embed|shorts|live)/|.*[?&]vi?=)|youtu\.be/)",
        r"([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
    ))
    .expect("embedded video id pattern is valid")
});

/// Canonical 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Accept `candidate` only if it is exactly 11 characters of `[A-Za-z0-9_-]`
    pub fn parse(candidate: &str) -> Option<Self> {
        VIDEO_ID_PATTERN
            .is_match(candidate)
            .then(|| Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract a video identifier from a user-supplied URL or bare identifier.
///
/// Tries, in order: structured URL parsing (`youtu.be/<id>` and `youtube.com?v=<id>`),
/// a pattern scan for embed/short/legacy forms, and finally the raw input as a bare id.
pub fn extract_video_id(raw: &str) -> Result<VideoId, TranscriptError> {
    if let Some(id) = from_parsed_url(raw) {
        return Ok(id);
    }

    if let Some(id) = from_embedded_pattern(raw) {
        return Ok(id);
    }

    VideoId::parse(raw).ok_or_else(|| {
        TranscriptError::InvalidInput(format!("Could not find a YouTube video ID in: {}", raw))
    })
}

fn from_parsed_url(raw: &str) -> Option<VideoId> {
    let parsed = Url::parse(raw).ok()?;
    let host = parsed.host_str()?;

    let candidate = if host == "youtu.be" {
        parsed.path_segments()?.next()?.to_string()
    } else if host.contains("youtube.com") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())?
    } else {
        return None;
    };

    VideoId::parse(&candidate)
}

fn from_embedded_pattern(raw: &str) -> Option<VideoId> {
    EMBEDDED_ID_PATTERN
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| VideoId::parse(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    fn extract(raw: &str) -> String {
        extract_video_id(raw).unwrap().to_string()
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(extract("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), ID);
    }

    #[test]
    fn test_watch_url_with_extra_params_and_fragment() {
        assert_eq!(
            extract("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42s#comments"),
            ID
        );
        assert_eq!(extract("https://m.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123"), ID);
        assert_eq!(extract("https://music.youtube.com/watch?v=dQw4w9WgXcQ"), ID);
    }

    #[test]
    fn test_short_url() {
        assert_eq!(extract("https://youtu.be/dQw4w9WgXcQ"), ID);
        assert_eq!(extract("https://youtu.be/dQw4w9WgXcQ?t=10"), ID);
        assert_eq!(extract("https://youtu.be/dQw4w9WgXcQ/extra/segments"), ID);
    }

    #[test]
    fn test_embed_and_legacy_paths() {
        assert_eq!(extract("https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1"), ID);
        assert_eq!(extract("https://www.youtube.com/v/dQw4w9WgXcQ"), ID);
        assert_eq!(extract("https://www.youtube.com/e/dQw4w9WgXcQ"), ID);
        assert_eq!(extract("https://www.youtube.com/shorts/dQw4w9WgXcQ"), ID);
        assert_eq!(extract("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ"), ID);
        assert_eq!(extract("https://www.youtube.com/user/SomeChannel/u/1/dQw4w9WgXcQ"), ID);
        assert_eq!(extract("http://youtube.com/user/SomeChannel#p/a/u/1/dQw4w9WgXcQ"), ID);
    }

    #[test]
    fn test_url_without_scheme() {
        assert_eq!(extract("www.youtube.com/watch?v=dQw4w9WgXcQ"), ID);
        assert_eq!(extract("youtu.be/dQw4w9WgXcQ"), ID);
        assert_eq!(extract("check this out: youtube.com/watch?vi=dQw4w9WgXcQ please"), ID);
    }

    #[test]
    fn test_bare_video_id() {
        assert_eq!(extract(ID), ID);
        assert_eq!(extract("_-aZ09_-aZ0"), "_-aZ09_-aZ0");
    }

    #[test]
    fn test_case_is_preserved() {
        assert_eq!(extract("https://youtu.be/ABCdefGHIjk"), "ABCdefGHIjk");
        assert_ne!(extract("https://youtu.be/ABCdefGHIjk"), "abcdefghijk");
    }

    #[test]
    fn test_youtube_url_without_v_param_fails() {
        let err = extract_video_id("https://www.youtube.com/watch?list=PL123").unwrap_err();
        assert!(matches!(err, TranscriptError::InvalidInput(_)));

        assert!(extract_video_id("https://www.youtube.com/").is_err());
    }

    #[test]
    fn test_identifier_must_be_exactly_eleven_chars() {
        assert!(extract_video_id("https://www.youtube.com/watch?v=tooShort").is_err());
        assert!(extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQXY").is_err());
        assert!(extract_video_id("https://youtu.be/short").is_err());
        assert!(extract_video_id("dQw4w9WgXc").is_err());
        assert!(extract_video_id("dQw4w9WgXcQQ").is_err());
    }

    #[test]
    fn test_invalid_input() {
        for raw in ["hello world", "", "https://example.com/watch?v=dQw4w9WgXcQ", "dQw4w9WgX!Q"] {
            let err = extract_video_id(raw).unwrap_err();
            assert!(matches!(err, TranscriptError::InvalidInput(_)), "{raw}");
        }
    }

    #[test]
    fn test_video_id_serializes_as_string() {
        let id = VideoId::parse(ID).unwrap();
        assert_eq!(id.as_str(), ID);
        assert!(VideoId::parse("https://youtu.be/dQw4w9WgXcQ").is_none());
        assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{}\"", ID));
    }
}
