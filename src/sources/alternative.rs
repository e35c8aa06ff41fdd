use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{FetchOutcome, TranscriptDocument, TranscriptSource};
use crate::config::SourcesConfig;
use crate::extractors::VideoId;
use crate::{Result, TranscriptError};

#[derive(Debug, Deserialize)]
struct AlternativeResponse {
    transcript: Option<Value>,
}

/// Transcript proxy reached over plain HTTP: `GET <endpoint>?id=<video id>`
///
/// The proxy answers with `{"transcript": "<joined text>"}`, so the resulting
/// document is a single untimed segment.
pub struct AlternativeSource {
    client: Client,
    endpoint: Url,
}

impl AlternativeSource {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client for alternative source")?;

        let endpoint = Url::parse(&config.alternative_endpoint).with_context(|| {
            format!("Invalid alternative endpoint: {}", config.alternative_endpoint)
        })?;

        Ok(Self { client, endpoint })
    }

    fn request_url(&self, video_id: &VideoId) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("id", video_id.as_str());
        url
    }
}

#[async_trait]
impl TranscriptSource for AlternativeSource {
    async fn fetch_transcript(&self, video_id: &VideoId) -> FetchOutcome {
        let url = self.request_url(video_id);
        tracing::debug!("Requesting alternative transcript: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .json::<Value>()
                .await
                .unwrap_or_else(|_| Value::Object(Default::default()));
            return Err(TranscriptError::Upstream(format!(
                "API responded with {}: {}",
                status.as_u16(),
                error_body
            )));
        }

        let body: AlternativeResponse = response.json().await?;
        match body.transcript {
            Some(Value::String(text)) => TranscriptDocument::from_text(text).ok_or_else(|| {
                TranscriptError::NotFound("The alternative source returned an empty transcript".to_string())
            }),
            _ => Err(TranscriptError::NotFound(
                "The alternative source returned no transcript".to_string(),
            )),
        }
    }

    fn source_name(&self) -> &'static str {
        "alternative-api"
    }
}
