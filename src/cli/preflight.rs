//! Pre-flight checks before network-bound operations.
//!
//! Validates that the API keys an operation needs are configured before
//! anything is downloaded or uploaded.

use crate::config::Settings;
use crate::error::{RecapError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Caption lookup for a video URL. Needs nothing up front; other
    /// platforms report missing keys when they reach speech-to-text.
    TranscribeUrl,
    /// Local file transcription requires the speech-to-text key.
    TranscribeFile,
    /// Summarization requires the chat model key.
    Summarize,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::TranscribeUrl => Ok(()),
        Operation::TranscribeFile => require(&settings.transcription.api_key, "transcription.api_key"),
        Operation::Summarize => require(&settings.summarization.api_key, "summarization.api_key"),
    }
}

fn require(key: &Option<String>, name: &str) -> Result<()> {
    match key.as_deref() {
        Some(k) if !k.is_empty() => Ok(()),
        _ => Err(RecapError::ConfigurationMissing(format!(
            "{} (set it in the config file or export OPENAI_API_KEY='sk-...')",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_lookup_has_no_requirements() {
        assert!(check(Operation::TranscribeUrl, &Settings::default()).is_ok());
    }

    #[test]
    fn test_file_and_summary_need_keys() {
        let mut settings = Settings::default();
        assert!(matches!(
            check(Operation::TranscribeFile, &settings),
            Err(RecapError::ConfigurationMissing(_))
        ));

        settings.summarization.api_key = Some("sk-test".to_string());
        assert!(check(Operation::Summarize, &settings).is_ok());
    }
}
