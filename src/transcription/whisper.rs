//! OpenAI transcription endpoint client.

use super::{SpeechToText, TranscriptionRequest};
use crate::config::{HttpSettings, TranscriptionSettings};
use crate::error::{RecapError, Result};
use crate::http::build_client;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument};

/// Posts audio to `{api_base}/audio/transcriptions` as multipart form data.
pub struct WhisperClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl WhisperClient {
    /// Create a client. Fails with `ConfigurationMissing` when no API key is set.
    pub fn new(settings: &TranscriptionSettings, http: &HttpSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| RecapError::ConfigurationMissing("transcription.api_key".to_string()))?;

        Ok(Self {
            client: build_client(http)?,
            api_key,
            endpoint: format!("{}/audio/transcriptions", settings.api_base.trim_end_matches('/')),
            model: settings.model.clone(),
        })
    }
}

#[async_trait]
impl SpeechToText for WhisperClient {
    #[instrument(skip(self, request), fields(file = %request.file_name, bytes = request.size_bytes))]
    async fn transcribe(&self, request: TranscriptionRequest, language: &str) -> Result<String> {
        let part = Part::bytes(request.file_bytes)
            .file_name(request.file_name)
            .mime_str(&request.mime_type)
            .map_err(|e| RecapError::UnsupportedFileType(format!("{}: {}", request.mime_type, e)))?;

        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "text")
            .text("language", language.to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RecapError::transport(format!("Transcription request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RecapError::transport(format!("Failed to read transcription response: {}", e)))?;

        if !status.is_success() {
            return Err(RecapError::upstream(status.as_u16(), body));
        }

        debug!(chars = body.len(), "Transcription received");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let settings = TranscriptionSettings::default();
        let err = WhisperClient::new(&settings, &HttpSettings::default()).err().unwrap();
        assert!(matches!(err, RecapError::ConfigurationMissing(ref k) if k == "transcription.api_key"));
    }

    #[test]
    fn test_endpoint_from_api_base() {
        let settings = TranscriptionSettings {
            api_key: Some("sk-test".to_string()),
            api_base: "http://localhost:8080/v1/".to_string(),
            ..Default::default()
        };
        let client = WhisperClient::new(&settings, &HttpSettings::default()).unwrap();
        assert_eq!(client.endpoint, "http://localhost:8080/v1/audio/transcriptions");
        assert_eq!(client.model, "whisper-1");
    }
}
