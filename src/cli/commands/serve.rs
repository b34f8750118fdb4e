//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for transcript lookup, file transcription, and
//! summarization.

use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::RecapError;
use crate::pipeline::{PipelineInput, TranscriptPipeline};
use crate::summarize::{OpenAiSummarizer, Summarizer, SummaryRequest};
use crate::transcript::{SourceStrategy, Transcript};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Request bodies above this size are rejected before reaching a handler.
/// Leaves headroom above the transcription limit for multipart framing.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Shared application state.
struct AppState {
    pipeline: TranscriptPipeline,
    summarizer: Option<OpenAiSummarizer>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let pipeline = TranscriptPipeline::new(&settings)?;
    if !pipeline.can_transcribe_audio() {
        Output::warning("No transcription API key: /transcribe and non-YouTube URLs will fail.");
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let summarizer = match OpenAiSummarizer::new(&settings.summarization, &settings.http, prompts) {
        Ok(s) => Some(s),
        Err(RecapError::ConfigurationMissing(_)) => {
            Output::warning("No summarization API key: /summarize will fail.");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let state = Arc::new(AppState {
        pipeline,
        summarizer,
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Recap API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Transcript", "POST /transcript");
    Output::kv("Transcribe file", "POST /transcribe (multipart)");
    Output::kv("Summarize", "POST /summarize");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/transcript", post(transcript))
        .route("/transcribe", post(transcribe_file))
        .route("/summarize", post(summarize))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct TranscriptRequest {
    /// Video page URL
    url: String,
}

#[derive(Serialize, Debug)]
struct TranscriptResponse {
    transcript: String,
    source_strategy: SourceStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_title: Option<String>,
    word_count: usize,
}

impl From<Transcript> for TranscriptResponse {
    fn from(t: Transcript) -> Self {
        Self {
            word_count: t.word_count(),
            transcript: t.text,
            source_strategy: t.source_strategy,
            video_title: t.video_title,
        }
    }
}

#[derive(Deserialize)]
struct SummarizeRequest {
    /// Transcript text; fetched from `url` when absent.
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    url: Option<String>,
    prompt: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    video_title: Option<String>,
}

#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_title: Option<String>,
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

/// Error returned by handlers, rendered as `{error, code}` JSON.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse {
                error: message.into(),
                code: "bad_request",
            },
        }
    }
}

impl From<RecapError> for ApiError {
    fn from(e: RecapError) -> Self {
        let status = StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(code = e.code(), error = %e, "Request failed");
        }
        Self {
            status,
            body: ErrorResponse {
                error: e.to_string(),
                code: e.code(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn transcript(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranscriptRequest>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let transcript = state.pipeline.run(PipelineInput::url(req.url)).await?;
    Ok(Json(transcript.into()))
}

async fn transcribe_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field.content_type().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
        upload = Some(PipelineInput::upload(bytes.to_vec(), file_name, mime_type));
        break;
    }

    let input = upload.ok_or_else(|| ApiError::bad_request("Missing 'file' field"))?;
    let transcript = state.pipeline.run(input).await?;
    Ok(Json(transcript.into()))
}

async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let summarizer = state
        .summarizer
        .as_ref()
        .ok_or_else(|| RecapError::ConfigurationMissing("summarization.api_key".to_string()))?;

    let (transcript, video_title) = match (req.transcript, req.url) {
        (Some(text), _) if !text.trim().is_empty() => (text, req.video_title),
        (_, Some(url)) => {
            let t = state.pipeline.run(PipelineInput::url(url)).await?;
            (t.text, req.video_title.or(t.video_title))
        }
        _ => return Err(ApiError::bad_request("Provide either 'transcript' or 'url'")),
    };

    let request = SummaryRequest {
        transcript,
        prompt: req.prompt,
        context: req.context,
        video_title,
    };
    let summary = summarizer.summarize(&request).await?;
    info!(chars = summary.len(), "Summary served");

    Ok(Json(SummarizeResponse {
        summary,
        video_title: request.video_title,
    }))
}
