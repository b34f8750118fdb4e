//! Upload validation and speech-to-text submission.

use super::{SpeechToText, TranscriptionRequest};
use crate::config::TranscriptionSettings;
use crate::error::{RecapError, Result};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Human-readable class of a speech-to-text failure, sniffed from the error
/// body. Best effort only: upstream wording is not a stable contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFailure {
    InvalidFormat,
    FileTooLarge,
    DurationExceeded,
    Other,
}

impl UpstreamFailure {
    pub fn message(&self) -> &'static str {
        match self {
            UpstreamFailure::InvalidFormat => {
                "The speech-to-text service could not decode the file. Try MP3, WAV or M4A."
            }
            UpstreamFailure::FileTooLarge => {
                "The speech-to-text service rejected the file as too large (25 MB maximum)."
            }
            UpstreamFailure::DurationExceeded => {
                "The recording is longer than the speech-to-text service allows (about 3 hours)."
            }
            UpstreamFailure::Other => "The speech-to-text service returned an error.",
        }
    }
}

/// Classify an error response by status and body text.
pub fn classify_upstream_failure(status: Option<u16>, body: &str) -> UpstreamFailure {
    let body = body.to_lowercase();

    if status == Some(413)
        || body.contains("too large")
        || body.contains("maximum content size")
        || body.contains("file size")
    {
        UpstreamFailure::FileTooLarge
    } else if body.contains("duration") || body.contains("too long") {
        UpstreamFailure::DurationExceeded
    } else if body.contains("invalid file format")
        || body.contains("unsupported")
        || body.contains("could not be decoded")
        || body.contains("invalid format")
    {
        UpstreamFailure::InvalidFormat
    } else {
        UpstreamFailure::Other
    }
}

/// Validates media and submits it to a speech-to-text backend.
pub struct AudioTranscriber {
    backend: Arc<dyn SpeechToText>,
    language: String,
    max_bytes: u64,
}

impl AudioTranscriber {
    pub fn new(backend: Arc<dyn SpeechToText>, settings: &TranscriptionSettings) -> Self {
        Self {
            backend,
            language: settings.language.clone(),
            max_bytes: settings.max_file_bytes,
        }
    }

    /// Largest accepted input in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Validate an upload without submitting it.
    pub fn prepare(&self, bytes: Vec<u8>, file_name: &str, mime_type: &str) -> Result<TranscriptionRequest> {
        TranscriptionRequest::new(bytes, file_name, mime_type, self.max_bytes)
    }

    /// Validate and transcribe. Returns the trimmed transcript text.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn transcribe(&self, bytes: Vec<u8>, file_name: &str, mime_type: &str) -> Result<String> {
        let request = self.prepare(bytes, file_name, mime_type)?;
        info!(file = %request.file_name, mime = %request.mime_type, "Submitting for transcription");

        let text = match self.backend.transcribe(request, &self.language).await {
            Ok(text) => text,
            Err(RecapError::UpstreamService { status, detail }) => {
                let failure = classify_upstream_failure(status, &detail);
                warn!(?failure, ?status, "Speech-to-text request failed");
                return Err(RecapError::UpstreamService {
                    status,
                    detail: format!("{} ({})", failure.message(), excerpt(&detail)),
                });
            }
            Err(e) => return Err(e),
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(RecapError::TranscriptionEmpty);
        }
        Ok(text.to_string())
    }
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() > 200 {
        format!("{}...", body.chars().take(200).collect::<String>())
    } else {
        body.to_string()
    }
}
