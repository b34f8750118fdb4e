//! CLI module for Recap.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_size, mask_key, Output};

use crate::config::ApiKeyOverrides;
use clap::{Parser, Subcommand, ValueEnum};

/// Recap - video transcripts and summaries
///
/// Fetches a transcript for a video URL (captions first, speech-to-text when
/// there are none) or an audio/video file, and summarizes it with an LLM.
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// OpenAI API key for speech-to-text and summarization
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    /// API key for the third-party transcript service
    #[arg(long, env = "TRANSCRIPT_API_KEY", hide_env_values = true, global = true)]
    pub transcript_api_key: Option<String>,

    /// API key for the media resolution services
    #[arg(long, env = "MEDIA_API_KEY", hide_env_values = true, global = true)]
    pub media_api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Keys given on the command line or in the environment.
    pub fn api_keys(&self) -> ApiKeyOverrides {
        ApiKeyOverrides {
            openai: self.openai_api_key.clone(),
            transcript: self.transcript_api_key.clone(),
            media: self.media_api_key.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the transcript of a video URL or local audio/video file
    Transcribe {
        /// Video URL, or path to a local audio/video file
        input: String,

        /// Write the transcript to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: TranscriptFormat,
    },

    /// Fetch a transcript and run a prompt over it
    Summarize {
        /// Video URL, or path to a local audio/video file
        input: String,

        /// What to ask of the transcript
        #[arg(short, long, default_value = "Summarize the key points of this video.")]
        prompt: String,

        /// File with earlier conversation about the video
        #[arg(long)]
        context: Option<String>,

        /// Chat model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check configuration and API keys
    Doctor,
}

/// Transcript output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TranscriptFormat {
    /// Plain text
    Text,
    /// JSON with source strategy and title
    Json,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
