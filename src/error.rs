//! Error types for Recap.

use thiserror::Error;

/// Library-level error type for Recap operations.
#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Invalid video reference: {0}")]
    InvalidReference(String),

    #[error("No captions available for {0}")]
    NoCaptionsAvailable(String),

    #[error("Upstream service error{}: {detail}", status_suffix(.status))]
    UpstreamService { status: Option<u16>, detail: String },

    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Transcription returned no text")]
    TranscriptionEmpty,

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl RecapError {
    /// Shorthand for an upstream failure that has an HTTP status.
    pub fn upstream(status: u16, detail: impl Into<String>) -> Self {
        RecapError::UpstreamService {
            status: Some(status),
            detail: detail.into(),
        }
    }

    /// Shorthand for an upstream failure where no response was received.
    pub fn transport(detail: impl Into<String>) -> Self {
        RecapError::UpstreamService {
            status: None,
            detail: detail.into(),
        }
    }

    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            RecapError::InvalidReference(_) => "invalid_reference",
            RecapError::NoCaptionsAvailable(_) => "no_captions_available",
            RecapError::UpstreamService { .. } => "upstream_service_error",
            RecapError::FileTooLarge { .. } => "file_too_large",
            RecapError::UnsupportedFileType(_) => "unsupported_file_type",
            RecapError::TranscriptionEmpty => "transcription_empty",
            RecapError::ConfigurationMissing(_) => "configuration_missing",
            RecapError::Config(_) | RecapError::TomlParse(_) => "configuration_error",
            RecapError::OpenAI(_) | RecapError::Summarization(_) => "summarization_error",
            RecapError::Io(_) | RecapError::Json(_) => "internal_error",
        }
    }

    /// HTTP status code the API server answers with for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            RecapError::InvalidReference(_) | RecapError::UnsupportedFileType(_) => 400,
            RecapError::NoCaptionsAvailable(_) => 404,
            RecapError::FileTooLarge { .. } => 413,
            RecapError::TranscriptionEmpty => 422,
            RecapError::UpstreamService { .. } | RecapError::OpenAI(_) => 502,
            RecapError::ConfigurationMissing(_) => 503,
            _ => 500,
        }
    }
}

/// Result type alias for Recap operations.
pub type Result<T> = std::result::Result<T, RecapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display() {
        let err = RecapError::upstream(429, "rate limited");
        assert_eq!(err.to_string(), "Upstream service error (HTTP 429): rate limited");

        let err = RecapError::transport("connection refused");
        assert_eq!(err.to_string(), "Upstream service error: connection refused");
    }

    #[test]
    fn test_codes_and_statuses() {
        let err = RecapError::FileTooLarge { size: 10, limit: 5 };
        assert_eq!(err.code(), "file_too_large");
        assert_eq!(err.http_status(), 413);
        assert_eq!(RecapError::TranscriptionEmpty.http_status(), 422);
        assert_eq!(
            RecapError::ConfigurationMissing("key".into()).code(),
            "configuration_missing"
        );
    }
}
