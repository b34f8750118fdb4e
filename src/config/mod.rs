//! Configuration module for Recap.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, SummaryPrompts};
pub use settings::{
    ApiKeyOverrides, CaptionSettings, DelegatedApiSettings, GeneralSettings, HttpSettings,
    MediaResolverSettings, PromptSettings, Settings, SummarizationSettings,
    TranscriptionSettings, DEFAULT_USER_AGENT, MAX_TRANSCRIPTION_BYTES,
};
