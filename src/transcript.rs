//! Transcript produced by the pipeline.

use serde::{Deserialize, Serialize};

/// Which extraction method produced a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStrategy {
    /// Public timed-text endpoint queried by language.
    DirectTimedText,
    /// Caption track found in the embedded player response.
    PlayerResponse,
    /// Caption track list matched directly in the raw page.
    RawTrackList,
    /// Third-party transcript API.
    DelegatedApi,
    /// Media resolved for a non-YouTube platform and run through speech-to-text.
    MediaTranscription,
    /// Uploaded file run through speech-to-text.
    UploadedFile,
}

impl std::fmt::Display for SourceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SourceStrategy::DirectTimedText => "direct_timed_text",
            SourceStrategy::PlayerResponse => "player_response",
            SourceStrategy::RawTrackList => "raw_track_list",
            SourceStrategy::DelegatedApi => "delegated_api",
            SourceStrategy::MediaTranscription => "media_transcription",
            SourceStrategy::UploadedFile => "uploaded_file",
        };
        write!(f, "{}", name)
    }
}

/// A successfully acquired transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Plain transcript text, never empty.
    pub text: String,
    pub source_strategy: SourceStrategy,
    pub video_title: Option<String>,
}

impl Transcript {
    pub fn new(text: String, source_strategy: SourceStrategy, video_title: Option<String>) -> Self {
        Self {
            text,
            source_strategy,
            video_title,
        }
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
