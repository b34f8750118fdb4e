//! Transcript acquisition pipeline.
//!
//! Each run walks `Idle -> Resolving -> Extracting -> Done | Failed`. URLs
//! are resolved into a [`VideoReference`] and dispatched by platform:
//! YouTube to the caption [`StrategyChain`], everything else through the
//! [`GenericMediaPath`] and speech-to-text. Uploads pass straight through
//! resolving and go to speech-to-text. The pipeline holds no per-run state,
//! so one instance serves concurrent runs.

use crate::config::Settings;
use crate::error::{RecapError, Result};
use crate::http::{HttpFetcher, ReqwestFetcher};
use crate::reference::{VideoReference, VideoReferenceResolver};
use crate::strategies::{GenericMediaPath, StrategyChain};
use crate::transcript::{SourceStrategy, Transcript};
use crate::transcription::{AudioTranscriber, SpeechToText, WhisperClient};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// What a pipeline run starts from.
#[derive(Debug, Clone)]
pub enum PipelineInput {
    /// A video page URL.
    Url(String),
    /// An uploaded audio or video file.
    Upload {
        bytes: Vec<u8>,
        file_name: String,
        mime_type: String,
    },
}

impl PipelineInput {
    pub fn url(url: impl Into<String>) -> Self {
        PipelineInput::Url(url.into())
    }

    pub fn upload(bytes: Vec<u8>, file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        PipelineInput::Upload {
            bytes,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Run state. `Done` and `Failed` are terminal.
#[derive(Debug)]
pub enum PipelineState {
    Idle,
    Resolving,
    Extracting,
    Done(Transcript),
    Failed(RecapError),
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Resolving => "resolving",
            PipelineState::Extracting => "extracting",
            PipelineState::Done(_) => "done",
            PipelineState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done(_) | PipelineState::Failed(_))
    }

    /// The transcript or error of a terminal state.
    pub fn into_result(self) -> Result<Transcript> {
        match self {
            PipelineState::Done(transcript) => Ok(transcript),
            PipelineState::Failed(e) => Err(e),
            other => Err(RecapError::Config(format!(
                "pipeline stopped in non-terminal state '{}'",
                other.name()
            ))),
        }
    }
}

/// Resolved work for the extracting step.
enum Job {
    Reference(VideoReference),
    Upload {
        bytes: Vec<u8>,
        file_name: String,
        mime_type: String,
    },
}

/// Orchestrates resolution and extraction for one input at a time.
pub struct TranscriptPipeline {
    resolver: VideoReferenceResolver,
    chain: StrategyChain,
    media: GenericMediaPath,
    transcriber: Option<AudioTranscriber>,
}

impl TranscriptPipeline {
    /// Build the pipeline from settings with live HTTP and speech-to-text
    /// clients. Speech-to-text is left out when no transcription key is set;
    /// runs that need it then fail with `ConfigurationMissing`.
    pub fn new(settings: &Settings) -> Result<Self> {
        let fetcher: Arc<dyn HttpFetcher> = Arc::new(ReqwestFetcher::new(&settings.http)?);

        let backend: Option<Arc<dyn SpeechToText>> =
            match WhisperClient::new(&settings.transcription, &settings.http) {
                Ok(client) => Some(Arc::new(client)),
                Err(RecapError::ConfigurationMissing(key)) => {
                    debug!(%key, "Speech-to-text disabled");
                    None
                }
                Err(e) => return Err(e),
            };

        Ok(Self::from_parts(settings, fetcher, backend))
    }

    /// Build the pipeline around the given collaborators.
    pub fn from_parts(
        settings: &Settings,
        fetcher: Arc<dyn HttpFetcher>,
        speech_to_text: Option<Arc<dyn SpeechToText>>,
    ) -> Self {
        Self::with_components(
            StrategyChain::youtube(settings, fetcher.clone()),
            GenericMediaPath::from_settings(
                &settings.media,
                &settings.http,
                settings.transcription.max_file_bytes,
                fetcher,
            ),
            speech_to_text.map(|backend| AudioTranscriber::new(backend, &settings.transcription)),
        )
    }

    /// Assemble a pipeline from fully built parts.
    pub fn with_components(
        chain: StrategyChain,
        media: GenericMediaPath,
        transcriber: Option<AudioTranscriber>,
    ) -> Self {
        Self {
            resolver: VideoReferenceResolver::new(),
            chain,
            media,
            transcriber,
        }
    }

    /// Whether uploads and non-YouTube media can be transcribed.
    pub fn can_transcribe_audio(&self) -> bool {
        self.transcriber.is_some()
    }

    /// Drive one run to a terminal state.
    #[instrument(skip(self, input))]
    pub async fn execute(&self, input: PipelineInput) -> PipelineState {
        let mut state = PipelineState::Idle;

        advance(&mut state, PipelineState::Resolving);
        let job = match self.resolve(input) {
            Ok(job) => job,
            Err(e) => return finish(&mut state, Err(e)),
        };

        advance(&mut state, PipelineState::Extracting);
        let result = self.extract(job).await;
        finish(&mut state, result)
    }

    /// Run and return the transcript or the classified error.
    pub async fn run(&self, input: PipelineInput) -> Result<Transcript> {
        self.execute(input).await.into_result()
    }

    fn resolve(&self, input: PipelineInput) -> Result<Job> {
        match input {
            PipelineInput::Url(url) => {
                let reference = self.resolver.resolve(&url)?;
                debug!(platform = %reference.platform, id = %reference.id, "Reference resolved");
                Ok(Job::Reference(reference))
            }
            PipelineInput::Upload {
                bytes,
                file_name,
                mime_type,
            } => Ok(Job::Upload {
                bytes,
                file_name,
                mime_type,
            }),
        }
    }

    async fn extract(&self, job: Job) -> Result<Transcript> {
        match job {
            Job::Reference(reference) if reference.platform.has_caption_chain() => {
                self.chain.fetch_transcript(&reference).await
            }
            Job::Reference(reference) => {
                let transcriber = self.transcriber()?;
                let media = self.media.fetch_media(&reference).await?;
                let text = transcriber
                    .transcribe(media.bytes, &media.file_name, &media.mime_type)
                    .await?;
                Ok(Transcript::new(text, SourceStrategy::MediaTranscription, media.title))
            }
            Job::Upload {
                bytes,
                file_name,
                mime_type,
            } => {
                let text = self.transcriber()?.transcribe(bytes, &file_name, &mime_type).await?;
                let title = Path::new(&file_name)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
                    .filter(|s| !s.is_empty());
                Ok(Transcript::new(text, SourceStrategy::UploadedFile, title))
            }
        }
    }

    fn transcriber(&self) -> Result<&AudioTranscriber> {
        self.transcriber
            .as_ref()
            .ok_or_else(|| RecapError::ConfigurationMissing("transcription.api_key".to_string()))
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    debug!(from = state.name(), to = next.name(), "Pipeline transition");
    *state = next;
}

fn finish(state: &mut PipelineState, result: Result<Transcript>) -> PipelineState {
    let next = match result {
        Ok(transcript) => {
            info!(
                source = %transcript.source_strategy,
                words = transcript.word_count(),
                "Transcript ready"
            );
            PipelineState::Done(transcript)
        }
        Err(e) => {
            info!(code = e.code(), error = %e, "Pipeline failed");
            PipelineState::Failed(e)
        }
    };
    advance(state, next);
    std::mem::replace(state, PipelineState::Idle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::FakeFetcher;
    use crate::transcription::test_support::FakeSpeechToText;

    const CAPTIONS: &str = r#"<transcript><text start="0" dur="2">Hello &amp; welcome</text><text start="2" dur="3">to the channel</text></transcript>"#;

    fn pipeline(fetcher: FakeFetcher, stt: Option<Arc<FakeSpeechToText>>) -> TranscriptPipeline {
        let settings = Settings::default();
        TranscriptPipeline::from_parts(
            &settings,
            Arc::new(fetcher),
            stt.map(|s| s as Arc<dyn SpeechToText>),
        )
    }

    #[tokio::test]
    async fn test_youtube_url_uses_timed_text() {
        let pipeline = pipeline(
            FakeFetcher::new().respond("api/timedtext?lang=en&v=abc123XYZ", 200, CAPTIONS),
            None,
        );

        let state = pipeline.execute(PipelineInput::url("https://youtu.be/abc123XYZ")).await;
        assert!(state.is_terminal());
        assert_eq!(state.name(), "done");

        let transcript = state.into_result().unwrap();
        assert_eq!(transcript.text, "Hello & welcome to the channel");
        assert_eq!(transcript.source_strategy, SourceStrategy::DirectTimedText);
    }

    #[tokio::test]
    async fn test_unsupported_domain_is_invalid_reference() {
        let fetcher = FakeFetcher::new();
        let pipeline = pipeline(fetcher, None);

        let state = pipeline
            .execute(PipelineInput::url("https://www.example.com/watch/42"))
            .await;
        assert_eq!(state.name(), "failed");
        assert!(matches!(state.into_result(), Err(RecapError::InvalidReference(_))));
    }

    #[tokio::test]
    async fn test_upload_goes_to_speech_to_text() {
        let stt = Arc::new(FakeSpeechToText::replying("uploaded words here"));
        let pipeline = pipeline(FakeFetcher::new(), Some(stt.clone()));

        let transcript = pipeline
            .run(PipelineInput::upload(vec![1, 2, 3], "lecture.m4a", "audio/x-m4a"))
            .await
            .unwrap();

        assert_eq!(transcript.source_strategy, SourceStrategy::UploadedFile);
        assert_eq!(transcript.video_title.as_deref(), Some("lecture"));
        assert_eq!(stt.call_count(), 1);
    }

    #[tokio::test]
    async fn test_upload_without_speech_to_text_key() {
        let pipeline = pipeline(FakeFetcher::new(), None);
        assert!(!pipeline.can_transcribe_audio());

        let err = pipeline
            .run(PipelineInput::upload(vec![1], "a.mp3", "audio/mpeg"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecapError::ConfigurationMissing(_)));
    }

    #[tokio::test]
    async fn test_direct_media_link_is_downloaded_and_transcribed() {
        let stt = Arc::new(FakeSpeechToText::replying("podcast episode text"));
        let fetcher = FakeFetcher::new().respond_bytes("episode.mp3", "audio/mpeg", vec![0u8; 32]);
        let pipeline = pipeline(fetcher, Some(stt.clone()));

        let transcript = pipeline
            .run(PipelineInput::url("https://cdn.podcasts.test/shows/episode.mp3"))
            .await
            .unwrap();

        assert_eq!(transcript.source_strategy, SourceStrategy::MediaTranscription);
        let requests = stt.requests.lock().unwrap();
        assert_eq!(requests[0].0.file_name, "episode.mp3");
        assert_eq!(requests[0].0.mime_type, "audio/mpeg");
    }

    #[tokio::test]
    async fn test_youtube_without_captions() {
        let fetcher = FakeFetcher::new().respond("watch?v=", 200, "<html><title>Silent - YouTube</title></html>");
        let pipeline = pipeline(fetcher, None);

        let err = pipeline
            .run(PipelineInput::url("https://www.youtube.com/watch?v=abc123XYZ"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecapError::NoCaptionsAvailable(_)));
    }
}
