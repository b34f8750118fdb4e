//! Configuration settings for Recap.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ceiling imposed by the speech-to-text service on uploaded audio.
pub const MAX_TRANSCRIPTION_BYTES: u64 = 25 * 1024 * 1024;

/// Browser user agent sent when scraping watch pages.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub http: HttpSettings,
    pub captions: CaptionSettings,
    pub delegated: DelegatedApiSettings,
    pub media: MediaResolverSettings,
    pub transcription: TranscriptionSettings,
    pub summarization: SummarizationSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level when no -v flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Outbound HTTP settings shared by every network collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Request timeout in seconds. None leaves the transport default in place.
    pub timeout_secs: Option<u64>,
    /// User agent presented to video platforms.
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Caption extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionSettings {
    /// Languages tried against the timed-text endpoint, in priority order.
    pub languages: Vec<String>,
    /// Accept-Language header used when fetching the watch page.
    pub accept_language: String,
    /// A caption transcript must be longer than this many characters.
    pub min_chars: usize,
    /// Also try auto-generated (ASR) tracks on the timed-text endpoint.
    pub include_auto_generated: bool,
}

impl Default for CaptionSettings {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string(), "en-US".to_string(), "en-GB".to_string()],
            accept_language: "en-US".to_string(),
            min_chars: 10,
            include_auto_generated: true,
        }
    }
}

/// Third-party transcript API, used as the last caption strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DelegatedApiSettings {
    /// API key. The strategy is skipped entirely when unset.
    pub api_key: Option<String>,
    /// Endpoint queried with `?video_id=<id>`.
    pub endpoint: String,
}

impl Default for DelegatedApiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.youtube-transcript.io/v1/transcript".to_string(),
        }
    }
}

/// Media resolution APIs for non-YouTube platforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaResolverSettings {
    /// API key shared by both providers.
    pub api_key: Option<String>,
    /// Primary video-info endpoint, queried with `?url=<video url>`.
    pub primary_endpoint: String,
    /// Alternative social-media downloader endpoint (JSON POST).
    pub alternative_endpoint: String,
}

impl Default for MediaResolverSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            primary_endpoint: "https://video-info-api.p.rapidapi.com/v1/info".to_string(),
            alternative_endpoint:
                "https://social-media-video-downloader.p.rapidapi.com/smvd/get/all".to_string(),
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// OpenAI API key for the transcription endpoint.
    pub api_key: Option<String>,
    /// API base URL.
    pub api_base: String,
    /// Whisper model to use.
    pub model: String,
    /// Language hint sent with every request.
    pub language: String,
    /// Maximum accepted upload size in bytes.
    pub max_file_bytes: u64,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.openai.com/v1".to_string(),
            model: "whisper-1".to_string(),
            language: "en".to_string(),
            max_file_bytes: MAX_TRANSCRIPTION_BYTES,
        }
    }
}

/// LLM summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationSettings {
    /// OpenAI API key for chat completions.
    pub api_key: Option<String>,
    /// API base URL.
    pub api_base: String,
    /// Chat model.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Transcripts longer than this are truncated before prompting.
    pub max_transcript_chars: usize,
}

impl Default for SummarizationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_transcript_chars: 100_000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

/// API keys supplied from outside the config file (flags or environment).
#[derive(Debug, Clone, Default)]
pub struct ApiKeyOverrides {
    pub openai: Option<String>,
    pub transcript: Option<String>,
    pub media: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::RecapError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recap")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Fill API keys the config file leaves unset. Keys already present in
    /// the file win over the overrides.
    pub fn with_api_keys(mut self, keys: ApiKeyOverrides) -> Self {
        fn fill(slot: &mut Option<String>, value: &Option<String>) {
            let empty = slot.as_deref().map_or(true, str::is_empty);
            if empty {
                if let Some(v) = value.as_ref().filter(|v| !v.is_empty()) {
                    *slot = Some(v.clone());
                }
            }
        }

        fill(&mut self.transcription.api_key, &keys.openai);
        fill(&mut self.summarization.api_key, &keys.openai);
        fill(&mut self.delegated.api_key, &keys.transcript);
        fill(&mut self.media.api_key, &keys.media);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.captions.languages, vec!["en", "en-US", "en-GB"]);
        assert_eq!(settings.transcription.max_file_bytes, 25 * 1024 * 1024);
        assert_eq!(settings.transcription.language, "en");
        assert!(settings.delegated.api_key.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [captions]
            languages = ["de"]

            [delegated]
            api_key = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(settings.captions.languages, vec!["de"]);
        assert_eq!(settings.captions.min_chars, 10);
        assert_eq!(settings.delegated.api_key.as_deref(), Some("abc"));
        assert_eq!(settings.transcription.model, "whisper-1");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.summarization.model = "gpt-4.1".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.summarization.model, "gpt-4.1");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.general.log_level, "warn");
    }

    #[test]
    fn test_api_key_overrides_do_not_replace_file_keys() {
        let mut settings = Settings::default();
        settings.delegated.api_key = Some("from-file".to_string());

        let settings = settings.with_api_keys(ApiKeyOverrides {
            openai: Some("sk-env".to_string()),
            transcript: Some("from-env".to_string()),
            media: Some(String::new()),
        });

        assert_eq!(settings.delegated.api_key.as_deref(), Some("from-file"));
        assert_eq!(settings.transcription.api_key.as_deref(), Some("sk-env"));
        assert_eq!(settings.summarization.api_key.as_deref(), Some("sk-env"));
        assert!(settings.media.api_key.is_none());
    }
}
