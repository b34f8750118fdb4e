//! Transcribe command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{format_size, Output, TranscriptFormat};
use crate::config::Settings;
use crate::error::RecapError;
use crate::pipeline::{PipelineInput, TranscriptPipeline};
use crate::transcript::Transcript;
use crate::transcription::MediaFormat;
use anyhow::{Context, Result};
use std::path::Path;

/// Turn a CLI argument into pipeline input: an existing file becomes an
/// upload, anything else is treated as a URL.
pub async fn load_input(input: &str, settings: &Settings) -> Result<PipelineInput> {
    let path = Path::new(input);
    if !path.is_file() {
        preflight::check(Operation::TranscribeUrl, settings)?;
        return Ok(PipelineInput::url(input));
    }

    preflight::check(Operation::TranscribeFile, settings)?;

    let size = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to inspect {}", path.display()))?
        .len();
    let limit = settings.transcription.max_file_bytes;
    if size > limit {
        return Err(RecapError::FileTooLarge { size, limit }.into());
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let mime_type = MediaFormat::from_file_name(&file_name)
        .map(|f| f.mime_type())
        .unwrap_or("application/octet-stream");

    Output::info(&format!("Read {} ({})", file_name, format_size(bytes.len() as u64)));
    Ok(PipelineInput::upload(bytes, file_name, mime_type))
}

/// Fetch a transcript with a spinner.
pub async fn fetch_transcript(input: &str, settings: &Settings) -> Result<Transcript> {
    let pipeline_input = load_input(input, settings).await?;
    let pipeline = TranscriptPipeline::new(settings)?;

    let spinner = Output::spinner(&format!("Fetching transcript for {}", input));
    let result = pipeline.run(pipeline_input).await;
    spinner.finish_and_clear();

    let transcript = result?;
    Output::success(&format!(
        "Transcript via {} ({} words)",
        transcript.source_strategy,
        transcript.word_count()
    ));
    Ok(transcript)
}

/// Run the transcribe command.
pub async fn run_transcribe(
    input: &str,
    output: Option<String>,
    format: TranscriptFormat,
    settings: Settings,
) -> Result<()> {
    let transcript = fetch_transcript(input, &settings).await?;
    let rendered = render(&transcript, format)?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, rendered)
                .await
                .with_context(|| format!("Failed to write {}", path))?;
            Output::success(&format!("Transcript written to {}", path));
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn render(transcript: &Transcript, format: TranscriptFormat) -> Result<String> {
    Ok(match format {
        TranscriptFormat::Text => transcript.text.clone(),
        TranscriptFormat::Json => serde_json::to_string_pretty(transcript)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::SourceStrategy;

    #[tokio::test]
    async fn test_missing_path_is_treated_as_url() {
        let input = load_input("https://youtu.be/abc123XYZ", &Settings::default())
            .await
            .unwrap();
        assert!(matches!(input, PipelineInput::Url(ref u) if u == "https://youtu.be/abc123XYZ"));
    }

    #[tokio::test]
    async fn test_existing_file_becomes_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.wav");
        std::fs::write(&path, [0u8; 8]).unwrap();

        let mut settings = Settings::default();
        settings.transcription.api_key = Some("sk-test".to_string());

        let input = load_input(path.to_str().unwrap(), &settings).await.unwrap();
        match input {
            PipelineInput::Upload {
                bytes,
                file_name,
                mime_type,
            } => {
                assert_eq!(bytes.len(), 8);
                assert_eq!(file_name, "memo.wav");
                assert_eq!(mime_type, "audio/wav");
            }
            other => panic!("unexpected input: {other:?}"),
        }

        // Without a key the file is rejected before it is read.
        assert!(load_input(path.to_str().unwrap(), &Settings::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.mp3");
        std::fs::write(&path, [0u8; 64]).unwrap();

        let mut settings = Settings::default();
        settings.transcription.api_key = Some("sk-test".to_string());
        settings.transcription.max_file_bytes = 32;

        let err = load_input(path.to_str().unwrap(), &settings).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecapError>(),
            Some(RecapError::FileTooLarge { size: 64, limit: 32 })
        ));
    }

    #[test]
    fn test_render_json() {
        let t = Transcript::new(
            "hello world".to_string(),
            SourceStrategy::PlayerResponse,
            Some("Title".to_string()),
        );
        let json = render(&t, TranscriptFormat::Json).unwrap();
        assert!(json.contains("\"source_strategy\": \"player_response\""));
        assert_eq!(render(&t, TranscriptFormat::Text).unwrap(), "hello world");
    }
}
