//! Recap - video transcripts and summaries
//!
//! Fetches the transcript of an online video, or of an uploaded audio/video
//! file, and hands it to an LLM for summarization.
//!
//! # Overview
//!
//! For YouTube links Recap tries progressively more expensive caption
//! sources until one yields text: the public timed-text endpoint, the watch
//! page's embedded player response, a raw scan of the page for caption
//! tracks, and finally (if configured) a paid transcript API. Other
//! platforms and direct media links are downloaded and sent to
//! speech-to-text, as are uploaded files.
//!
//! # Architecture
//!
//! - `reference` - URL to platform and video id
//! - `captions` - caption document parsing and track discovery
//! - `strategies` - the caption strategy chain and the media download path
//! - `transcription` - upload validation and speech-to-text
//! - `pipeline` - resolution and extraction state machine
//! - `summarize` - chat-model summarization
//! - `http` - outbound HTTP abstraction
//! - `config` - settings and prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use recap::config::Settings;
//! use recap::pipeline::{PipelineInput, TranscriptPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = TranscriptPipeline::new(&settings)?;
//!
//!     let transcript = pipeline
//!         .run(PipelineInput::url("https://youtu.be/dQw4w9WgXcQ"))
//!         .await?;
//!     println!("{} ({})", transcript.text, transcript.source_strategy);
//!
//!     Ok(())
//! }
//! ```

pub mod captions;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod openai;
pub mod pipeline;
pub mod reference;
pub mod strategies;
pub mod summarize;
pub mod transcript;
pub mod transcription;

pub use error::{RecapError, Result};
