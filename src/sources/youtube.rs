use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{FetchOutcome, TranscriptDocument, TranscriptSegment, TranscriptSource};
use crate::config::SourcesConfig;
use crate::extractors::VideoId;
use crate::{Result, TranscriptError};

static TRANSCRIPT_LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<text start="([^"]*)" dur="([^"]*)">([^<]*)</text>"#)
        .expect("transcript line pattern is valid")
});

/// The `"captions"` object embedded in a watch page
#[derive(Debug, Deserialize)]
struct CaptionsFragment {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct TracklistRenderer {
    #[serde(rename = "captionTracks", default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,

    #[serde(rename = "languageCode")]
    language_code: Option<String>,
}

/// Primary source: reads the caption catalog YouTube embeds in each watch page
pub struct YoutubeCaptionSource {
    client: Client,
    watch_base: Url,
}

impl YoutubeCaptionSource {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client for caption source")?;

        let watch_base = Url::parse(&config.watch_base_url)
            .with_context(|| format!("Invalid watch page base URL: {}", config.watch_base_url))?;

        Ok(Self { client, watch_base })
    }

    fn watch_url(&self, video_id: &VideoId) -> std::result::Result<Url, TranscriptError> {
        let mut url = self
            .watch_base
            .join("/watch")
            .map_err(|e| TranscriptError::Upstream(format!("Invalid watch page URL: {}", e)))?;
        url.query_pairs_mut().append_pair("v", video_id.as_str());
        Ok(url)
    }

    async fn fetch_watch_page(&self, video_id: &VideoId) -> std::result::Result<String, TranscriptError> {
        let url = self.watch_url(video_id)?;
        tracing::debug!("Fetching watch page: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TranscriptError::Upstream(format!(
                "Watch page responded with HTTP {}",
                status
            )));
        }

        Ok(response.text().await?)
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> std::result::Result<String, TranscriptError> {
        let url = self
            .watch_base
            .join(&track.base_url)
            .map_err(|e| TranscriptError::Upstream(format!("Invalid caption track URL: {}", e)))?;
        tracing::debug!("Fetching caption track: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TranscriptError::NotFound(format!(
                "Caption track could not be retrieved (HTTP {})",
                status
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl TranscriptSource for YoutubeCaptionSource {
    async fn fetch_transcript(&self, video_id: &VideoId) -> FetchOutcome {
        let html = self.fetch_watch_page(video_id).await?;
        let tracks = parse_caption_tracks(&html)?;
        let track = tracks.first().ok_or_else(|| {
            TranscriptError::NotFound("No caption tracks are available for this video".to_string())
        })?;

        let xml = self.fetch_track(track).await?;
        let segments = parse_transcript_xml(&xml, track.language_code.as_deref());
        tracing::debug!("Parsed {} caption segments for {}", segments.len(), video_id);

        TranscriptDocument::new(segments).ok_or_else(|| {
            TranscriptError::NotFound("The caption track contained no text".to_string())
        })
    }

    fn source_name(&self) -> &'static str {
        "youtube-captions"
    }
}

/// Pull the caption track list out of a watch page
fn parse_caption_tracks(html: &str) -> std::result::Result<Vec<CaptionTrack>, TranscriptError> {
    let Some((_, after)) = html.split_once("\"captions\":") else {
        if html.contains("class=\"g-recaptcha\"") {
            return Err(TranscriptError::Upstream(
                "YouTube is receiving too many requests from this server (captcha required)"
                    .to_string(),
            ));
        }
        if !html.contains("\"playabilityStatus\":") {
            return Err(TranscriptError::NotFound(
                "The video is no longer available".to_string(),
            ));
        }
        return Err(TranscriptError::NotFound(
            "Transcripts are disabled for this video".to_string(),
        ));
    };

    let fragment = after
        .split(",\"videoDetails")
        .next()
        .unwrap_or(after)
        .replace('\n', "");
    let captions: CaptionsFragment = serde_json::from_str(&fragment)?;

    let tracklist = captions.tracklist.ok_or_else(|| {
        TranscriptError::NotFound("Transcripts are disabled for this video".to_string())
    })?;

    if tracklist.caption_tracks.is_empty() {
        return Err(TranscriptError::NotFound(
            "No caption tracks are available for this video".to_string(),
        ));
    }

    Ok(tracklist.caption_tracks)
}

fn parse_transcript_xml(xml: &str, lang: Option<&str>) -> Vec<TranscriptSegment> {
    TRANSCRIPT_LINE_PATTERN
        .captures_iter(xml)
        .map(|caps| TranscriptSegment {
            text: html_escape::decode_html_entities(&caps[3]).into_owned(),
            duration: caps[2].parse().ok(),
            offset: caps[1].parse().ok(),
            lang: lang.map(str::to_string),
        })
        .collect()
}
