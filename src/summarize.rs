//! Transcript summarization with a chat model.

use crate::config::{HttpSettings, Prompts, SummarizationSettings};
use crate::error::{RecapError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// What to do with a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub transcript: String,
    /// Instruction for the model, e.g. "Summarize the key points".
    pub prompt: String,
    /// Earlier conversation about the same video.
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub video_title: Option<String>,
}

/// Trait for text generation over a transcript.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String>;
}

/// Chat-completions summarizer.
pub struct OpenAiSummarizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_transcript_chars: usize,
    prompts: Prompts,
}

impl OpenAiSummarizer {
    /// Create a summarizer. Fails with `ConfigurationMissing` when no API key is set.
    pub fn new(settings: &SummarizationSettings, http: &HttpSettings, prompts: Prompts) -> Result<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| RecapError::ConfigurationMissing("summarization.api_key".to_string()))?;

        Ok(Self {
            client: create_client(api_key, &settings.api_base, http)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_transcript_chars: settings.max_transcript_chars,
            prompts,
        })
    }

    /// Use a different chat model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    #[instrument(skip(self, request), fields(model = %self.model, chars = request.transcript.len()))]
    async fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        let user_message = render_user_message(&self.prompts, request, self.max_transcript_chars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.render_with_custom(&self.prompts.summary.system, &HashMap::new()))
                .build()
                .map_err(|e| RecapError::Summarization(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(|e| RecapError::Summarization(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| RecapError::Summarization(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| RecapError::OpenAI(format!("Failed to generate summary: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| RecapError::Summarization("Empty response from model".to_string()))?;

        info!(chars = answer.len(), "Summary generated");
        Ok(answer)
    }
}

/// Build the user message for a request, truncating long transcripts.
pub fn render_user_message(prompts: &Prompts, request: &SummaryRequest, max_transcript_chars: usize) -> String {
    let transcript = truncate_chars(request.transcript.trim(), max_transcript_chars);
    if transcript.len() < request.transcript.trim().len() {
        warn!(limit = max_transcript_chars, "Transcript truncated for summarization");
    }

    let context = match request.context.as_deref().map(str::trim) {
        Some(conversation) if !conversation.is_empty() => {
            let mut vars = HashMap::new();
            vars.insert("conversation".to_string(), conversation.to_string());
            Prompts::render(&prompts.summary.context, &vars)
        }
        _ => String::new(),
    };

    let mut vars = HashMap::new();
    vars.insert(
        "title".to_string(),
        request.video_title.clone().unwrap_or_else(|| "Unknown".to_string()),
    );
    vars.insert("transcript".to_string(), transcript.to_string());
    vars.insert("context".to_string(), context);
    vars.insert("prompt".to_string(), request.prompt.trim().to_string());

    debug!(vars = vars.len(), "Rendering summary prompt");
    prompts.render_with_custom(&prompts.summary.user, &vars)
}

/// Longest prefix of at most `max` characters, cut on a char boundary.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(transcript: &str, context: Option<&str>) -> SummaryRequest {
        SummaryRequest {
            transcript: transcript.to_string(),
            prompt: " Summarize the key points ".to_string(),
            context: context.map(|c| c.to_string()),
            video_title: Some("Rust in 100 Seconds".to_string()),
        }
    }

    #[test]
    fn test_user_message_embeds_transcript_and_prompt() {
        let msg = render_user_message(&Prompts::default(), &request("memory safety without gc", None), 1000);
        assert!(msg.starts_with("Video title: Rust in 100 Seconds"));
        assert!(msg.contains("Transcript:\nmemory safety without gc"));
        assert!(msg.ends_with("Request: Summarize the key points"));
        assert!(!msg.contains("Earlier conversation"));
        assert!(!msg.contains("{{"));
    }

    #[test]
    fn test_context_included_when_present() {
        let msg = render_user_message(
            &Prompts::default(),
            &request("text", Some("Q: what is it?\nA: a language")),
            1000,
        );
        assert!(msg.contains("Earlier conversation about this video:\nQ: what is it?\nA: a language"));

        let blank = render_user_message(&Prompts::default(), &request("text", Some("   ")), 1000);
        assert!(!blank.contains("Earlier conversation"));
    }

    #[test]
    fn test_placeholders_in_transcript_stay_literal() {
        let req = request("speaker says {{prompt}} and {{context}} literally", None);

        for _ in 0..20 {
            let msg = render_user_message(&Prompts::default(), &req, 1000);
            assert!(msg.contains("Transcript:\nspeaker says {{prompt}} and {{context}} literally\n"));
            assert!(msg.ends_with("Request: Summarize the key points"));
        }
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 100), "short");

        let msg = render_user_message(&Prompts::default(), &request("ééééé", None), 3);
        assert!(msg.contains("Transcript:\nééé\n"));
    }

    #[test]
    fn test_requires_api_key() {
        let err = OpenAiSummarizer::new(
            &SummarizationSettings::default(),
            &HttpSettings::default(),
            Prompts::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, RecapError::ConfigurationMissing(_)));
    }
}
