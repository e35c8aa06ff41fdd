use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

pub mod cors;

use crate::config::{Config, SourcesConfig};
use crate::extractors::{extract_video_id, VideoId};
use crate::output;
use crate::sources::{
    AlternativeSource, FallbackSource, TranscriptDocument, TranscriptSource, YoutubeCaptionSource,
};
use crate::{Result, TranscriptError};

/// Client-facing messages for one endpoint
struct EndpointMessages {
    name: &'static str,
    url_required: &'static str,
    invalid_url: &'static str,
    not_found: &'static str,
    fetch_failed: &'static str,
}

const TRANSCRIPT_ENDPOINT: EndpointMessages = EndpointMessages {
    name: "transcript",
    url_required: "Video URL is required",
    invalid_url: "Invalid YouTube URL",
    not_found: "No transcript found for this video",
    fetch_failed: "Failed to fetch transcript",
};

const ALTERNATIVE_ENDPOINT: EndpointMessages = EndpointMessages {
    name: "transcript-alt",
    url_required: "YouTube URL is required",
    invalid_url: "Could not extract YouTube video ID from the provided URL",
    not_found: "No transcript found for this video",
    fetch_failed: "Failed to fetch transcript from alternative source",
};

/// Sources shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Backs `POST /api/transcript`
    pub transcript: Arc<dyn TranscriptSource>,

    /// Backs `POST /api/transcript-alt`
    pub alternative: Arc<dyn TranscriptSource>,
}

impl AppState {
    pub fn from_config(config: &SourcesConfig) -> Result<Self> {
        let primary: Arc<dyn TranscriptSource> = Arc::new(YoutubeCaptionSource::new(config)?);
        let alternative: Arc<dyn TranscriptSource> = Arc::new(AlternativeSource::new(config)?);

        let transcript: Arc<dyn TranscriptSource> = if config.fallback_to_alternative {
            Arc::new(FallbackSource::new(primary, alternative.clone()))
        } else {
            primary
        };

        Ok(Self {
            transcript,
            alternative,
        })
    }
}

/// Build the API router with CORS applied to every route
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/transcript", post(transcript))
        .route("/api/transcript-alt", post(transcript_alt))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(cors::cors))
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::from_config(&config.sources)?;

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[derive(Debug, Deserialize)]
struct TranscriptRequest {
    #[serde(rename = "videoUrl")]
    video_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptResponse<'a> {
    transcript: &'a TranscriptDocument,
    full_text: String,
    video_id: VideoId,
}

#[derive(Serialize)]
struct PlainTranscriptResponse {
    transcript: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

/// JSON error response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    details: Option<String>,
}

impl ApiError {
    fn url_required(messages: &EndpointMessages) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: messages.url_required,
            details: None,
        }
    }

    /// Map a failure to its status code, logging it on the way
    fn from_transcript_error(err: TranscriptError, messages: &EndpointMessages) -> Self {
        match err {
            TranscriptError::InvalidInput(reason) => {
                tracing::warn!("Rejected input: {}", reason);
                Self {
                    status: StatusCode::BAD_REQUEST,
                    error: messages.invalid_url,
                    details: None,
                }
            }
            TranscriptError::NotFound(reason) => {
                tracing::warn!("No transcript: {}", reason);
                Self {
                    status: StatusCode::NOT_FOUND,
                    error: messages.not_found,
                    details: None,
                }
            }
            TranscriptError::Upstream(reason) => {
                tracing::error!("Error fetching transcript: {}", reason);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: messages.fetch_failed,
                    details: Some(reason),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error,
            details: self.details.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

async fn transcript(State(state): State<AppState>, body: Bytes) -> Response {
    let messages = &TRANSCRIPT_ENDPOINT;
    let span = request_span(messages);

    async move {
        match fetch_for_request(state.transcript.as_ref(), &body, messages).await {
            Ok((video_id, doc)) => Json(TranscriptResponse {
                full_text: output::format_as_text(&doc),
                transcript: &doc,
                video_id,
            })
            .into_response(),
            Err(err) => err.into_response(),
        }
    }
    .instrument(span)
    .await
}

async fn transcript_alt(State(state): State<AppState>, body: Bytes) -> Response {
    let messages = &ALTERNATIVE_ENDPOINT;
    let span = request_span(messages);

    async move {
        match fetch_for_request(state.alternative.as_ref(), &body, messages).await {
            Ok((_, doc)) => Json(PlainTranscriptResponse {
                transcript: output::format_as_text(&doc),
            })
            .into_response(),
            Err(err) => err.into_response(),
        }
    }
    .instrument(span)
    .await
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorBody { error: "Not found", details: None })).into_response()
}

fn request_span(messages: &EndpointMessages) -> tracing::Span {
    tracing::info_span!("request", endpoint = messages.name, request_id = %Uuid::new_v4())
}

/// Body → video ID → transcript, stopping at the first failure
async fn fetch_for_request(
    source: &dyn TranscriptSource,
    body: &[u8],
    messages: &EndpointMessages,
) -> std::result::Result<(VideoId, TranscriptDocument), ApiError> {
    let video_url = read_video_url(body, messages)?;

    let video_id = extract_video_id(&video_url)
        .map_err(|e| ApiError::from_transcript_error(e, messages))?;

    tracing::info!("Fetching transcript for video ID {} from {}", video_id, source.source_name());

    let doc = source
        .fetch_transcript(&video_id)
        .await
        .map_err(|e| ApiError::from_transcript_error(e, messages))?;

    tracing::info!("Fetched {} transcript segments for {}", doc.len(), video_id);
    Ok((video_id, doc))
}

fn read_video_url(body: &[u8], messages: &EndpointMessages) -> std::result::Result<String, ApiError> {
    let request: TranscriptRequest = serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("Unreadable request body: {}", e);
        ApiError::url_required(messages)
    })?;

    match request.video_url {
        Some(url) if !url.is_empty() => Ok(url),
        _ => {
            tracing::warn!("Request did not include a videoUrl");
            Err(ApiError::url_required(messages))
        }
    }
}
