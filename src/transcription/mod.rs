//! Speech-to-text transcription.
//!
//! [`AudioTranscriber`] validates uploads and downloaded media, then hands
//! them to a [`SpeechToText`] backend. The default backend is the OpenAI
//! transcription endpoint ([`WhisperClient`]).

mod request;
mod transcriber;
mod whisper;

pub use request::{extension_for_mime, mime_for_extension, MediaFormat, TranscriptionRequest};
pub use transcriber::{classify_upstream_failure, AudioTranscriber, UpstreamFailure};
pub use whisper::WhisperClient;

#[cfg(test)]
pub(crate) use transcriber::test_support;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for speech-to-text services.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe a validated request to plain text.
    ///
    /// Non-2xx responses are returned as
    /// [`RecapError::UpstreamService`](crate::error::RecapError::UpstreamService)
    /// with the raw error body as detail.
    async fn transcribe(&self, request: TranscriptionRequest, language: &str) -> Result<String>;
}
