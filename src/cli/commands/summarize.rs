//! Summarize command implementation.

use super::transcribe::fetch_transcript;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::summarize::{OpenAiSummarizer, Summarizer, SummaryRequest};
use anyhow::{Context, Result};

/// Run the summarize command.
pub async fn run_summarize(
    input: &str,
    prompt: &str,
    context: Option<String>,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Summarize, &settings) {
        Output::error(&e.to_string());
        Output::info("Run 'recap doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let context = match context {
        Some(path) => Some(
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read context file {}", path))?,
        ),
        None => None,
    };

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let mut summarizer = OpenAiSummarizer::new(&settings.summarization, &settings.http, prompts)?;
    if let Some(model) = model.as_deref() {
        summarizer = summarizer.with_model(model);
    }

    let transcript = fetch_transcript(input, &settings).await?;

    let request = SummaryRequest {
        transcript: transcript.text,
        prompt: prompt.to_string(),
        context,
        video_title: transcript.video_title,
    };

    let spinner = Output::spinner("Generating summary...");
    let result = summarizer.summarize(&request).await;
    spinner.finish_and_clear();

    println!("{}", result?);
    Ok(())
}
