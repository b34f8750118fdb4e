//! Public timed-text endpoint strategy.

use super::{Candidate, ChainContext, TranscriptStrategy, DEFAULT_MIN_CHARS};
use crate::captions::parse_caption_xml;
use crate::error::{RecapError, Result};
use crate::http::{HttpFetcher, HttpRequest};
use crate::reference::VideoReference;
use crate::transcript::SourceStrategy;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use url::Url;

const TIMEDTEXT_URL: &str = "https://www.youtube.com/api/timedtext";

/// Queries the timed-text endpoint for each configured language in turn.
pub struct TimedTextStrategy {
    fetcher: Arc<dyn HttpFetcher>,
    languages: Vec<String>,
    auto_generated: bool,
    min_chars: usize,
}

impl TimedTextStrategy {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, languages: Vec<String>) -> Self {
        Self {
            fetcher,
            languages,
            auto_generated: false,
            min_chars: DEFAULT_MIN_CHARS,
        }
    }

    /// Also try the auto-generated track after each language's manual track.
    pub fn with_auto_generated(mut self, enabled: bool) -> Self {
        self.auto_generated = enabled;
        self
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Candidate URLs in the order they are tried.
    fn candidate_urls(&self, video_id: &str) -> Result<Vec<String>> {
        let mut urls = Vec::new();
        for lang in &self.languages {
            urls.push(timedtext_url(&[("lang", lang), ("v", video_id)])?);
            if self.auto_generated {
                urls.push(timedtext_url(&[("lang", lang), ("v", video_id), ("kind", "asr")])?);
            }
        }
        Ok(urls)
    }
}

fn timedtext_url(params: &[(&str, &str)]) -> Result<String> {
    Url::parse_with_params(TIMEDTEXT_URL, params)
        .map(String::from)
        .map_err(|e| RecapError::Config(format!("Invalid timed-text URL: {}", e)))
}

#[async_trait]
impl TranscriptStrategy for TimedTextStrategy {
    fn source(&self) -> SourceStrategy {
        SourceStrategy::DirectTimedText
    }

    async fn attempt(
        &self,
        reference: &VideoReference,
        _ctx: &ChainContext,
    ) -> Result<Option<Candidate>> {
        for url in self.candidate_urls(&reference.id)? {
            let response = match self.fetcher.execute(HttpRequest::get(&url)).await {
                Ok(response) => response,
                Err(e) => {
                    debug!(error = %e, %url, "Timed-text request failed");
                    continue;
                }
            };
            if !response.is_success() {
                debug!(status = response.status, %url, "Timed-text request rejected");
                continue;
            }

            let text = parse_caption_xml(&response.text());
            if text.chars().count() > self.min_chars {
                return Ok(Some(Candidate::new(text, None)));
            }
            debug!(%url, "No caption text in timed-text response");
        }

        Ok(None)
    }

    fn min_chars(&self) -> usize {
        self.min_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::FakeFetcher;
    use crate::reference::resolve;

    const CAPTIONS: &str = r#"<transcript><text start="0">Welcome to the show</text><text start="2">today we talk Rust</text></transcript>"#;

    fn strategy(fetcher: Arc<FakeFetcher>, auto: bool) -> TimedTextStrategy {
        TimedTextStrategy::new(
            fetcher,
            vec!["en".to_string(), "en-US".to_string(), "en-GB".to_string()],
        )
        .with_auto_generated(auto)
    }

    #[tokio::test]
    async fn test_falls_back_through_languages() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .respond("lang=en&v=", 200, "")
                .respond("lang=en-US&v=", 404, "not found")
                .respond("lang=en-GB&v=", 200, CAPTIONS),
        );
        let reference = resolve("https://youtu.be/abc123XYZ").unwrap();

        let candidate = strategy(fetcher.clone(), false)
            .attempt(&reference, &ChainContext::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(candidate.text, "Welcome to the show today we talk Rust");
        assert_eq!(fetcher.requests().len(), 3);
        assert!(fetcher.requests()[2].url.ends_with("lang=en-GB&v=abc123XYZ"));
    }

    #[tokio::test]
    async fn test_transport_error_moves_to_next_language() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .fail("lang=en&v=", "connection reset")
                .respond("lang=en-US&v=", 200, CAPTIONS),
        );
        let reference = resolve("https://youtu.be/abc123XYZ").unwrap();

        let candidate = strategy(fetcher.clone(), false)
            .attempt(&reference, &ChainContext::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(candidate.text, "Welcome to the show today we talk Rust");
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_auto_generated_track_tried_after_manual() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .respond("kind=asr", 200, CAPTIONS)
                .respond("lang=en&v=", 200, "<transcript/>"),
        );
        let reference = resolve("https://youtu.be/abc123XYZ").unwrap();

        let candidate = strategy(fetcher.clone(), true)
            .attempt(&reference, &ChainContext::new())
            .await
            .unwrap();

        assert!(candidate.is_some());
        let urls: Vec<String> = fetcher.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls.len(), 2);
        assert!(urls[1].contains("lang=en&v=abc123XYZ&kind=asr"));
    }

    #[tokio::test]
    async fn test_body_without_text_tags_yields_nothing() {
        let fetcher = Arc::new(FakeFetcher::new().respond("api/timedtext", 200, "<html>consent</html>"));
        let reference = resolve("https://youtu.be/abc123XYZ").unwrap();

        let result = strategy(fetcher, false)
            .attempt(&reference, &ChainContext::new())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
