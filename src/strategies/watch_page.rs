//! Watch page scraping strategies.
//!
//! Both strategies read the same downloaded page (cached in the
//! [`ChainContext`]). The first parses the embedded player response; the
//! second only looks for the caption track array and is the fallback when the
//! player object is missing or does not parse.

use super::{Candidate, ChainContext, TranscriptStrategy, DEFAULT_MIN_CHARS};
use crate::captions::{
    extract_player_response, extract_raw_track_list, parse_caption_xml, select_track,
    title_from_html, title_from_player_response, tracks_from_player_response, CaptionTrack,
};
use crate::error::Result;
use crate::http::{HttpFetcher, HttpRequest};
use crate::reference::VideoReference;
use crate::transcript::SourceStrategy;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Downloads watch pages and caption documents with browser-like headers.
#[derive(Clone)]
pub struct WatchPage {
    fetcher: Arc<dyn HttpFetcher>,
    user_agent: String,
    accept_language: String,
}

impl WatchPage {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, user_agent: &str, accept_language: &str) -> Self {
        Self {
            fetcher,
            user_agent: user_agent.to_string(),
            accept_language: accept_language.to_string(),
        }
    }

    fn request(&self, url: &str) -> HttpRequest {
        HttpRequest::get(url)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept-Language", self.accept_language.as_str())
    }

    /// Fetch the canonical watch page HTML.
    #[instrument(skip(self), fields(video_id = %reference.id))]
    pub async fn load(&self, reference: &VideoReference) -> Result<String> {
        let response = self
            .fetcher
            .execute(self.request(&reference.canonical_url()))
            .await?
            .error_for_status()?;
        Ok(response.text())
    }

    /// Fetch a track's caption document and flatten it to text.
    pub async fn track_text(&self, track: &CaptionTrack) -> Result<String> {
        debug!(language = %track.language_code, "Fetching caption track");
        let response = self
            .fetcher
            .execute(self.request(&track.document_url()))
            .await?
            .error_for_status()?;
        Ok(parse_caption_xml(&response.text()))
    }
}

/// Reads caption tracks from the embedded `ytInitialPlayerResponse`.
pub struct PlayerResponseStrategy {
    page: WatchPage,
    min_chars: usize,
}

impl PlayerResponseStrategy {
    pub fn new(page: WatchPage) -> Self {
        Self {
            page,
            min_chars: DEFAULT_MIN_CHARS,
        }
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }
}

#[async_trait]
impl TranscriptStrategy for PlayerResponseStrategy {
    fn source(&self) -> SourceStrategy {
        SourceStrategy::PlayerResponse
    }

    async fn attempt(
        &self,
        reference: &VideoReference,
        ctx: &ChainContext,
    ) -> Result<Option<Candidate>> {
        let html = ctx.watch_page(|| self.page.load(reference)).await?;

        let Some(player) = extract_player_response(html) else {
            debug!("Player response missing or unparsable");
            return Ok(None);
        };

        let tracks = tracks_from_player_response(&player);
        let Some(track) = select_track(&tracks) else {
            debug!("Player response lists no caption tracks");
            return Ok(None);
        };

        let text = self.page.track_text(track).await?;
        Ok(Some(Candidate::new(text, title_from_player_response(&player))))
    }

    fn min_chars(&self) -> usize {
        self.min_chars
    }
}

/// Matches the `"captionTracks": [...]` literal directly in the page text.
pub struct RawTrackListStrategy {
    page: WatchPage,
    min_chars: usize,
}

impl RawTrackListStrategy {
    pub fn new(page: WatchPage) -> Self {
        Self {
            page,
            min_chars: DEFAULT_MIN_CHARS,
        }
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }
}

#[async_trait]
impl TranscriptStrategy for RawTrackListStrategy {
    fn source(&self) -> SourceStrategy {
        SourceStrategy::RawTrackList
    }

    async fn attempt(
        &self,
        reference: &VideoReference,
        ctx: &ChainContext,
    ) -> Result<Option<Candidate>> {
        let html = ctx.watch_page(|| self.page.load(reference)).await?;

        let Some(tracks) = extract_raw_track_list(html) else {
            debug!("No caption track list in page");
            return Ok(None);
        };
        let Some(track) = select_track(&tracks) else {
            return Ok(None);
        };

        let text = self.page.track_text(track).await?;
        Ok(Some(Candidate::new(text, title_from_html(html))))
    }

    fn min_chars(&self) -> usize {
        self.min_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecapError;
    use crate::http::fake::FakeFetcher;
    use crate::reference::resolve;
    use crate::strategies::StrategyChain;

    const TRACK_XML: &str = "<transcript><text>Structured captions from the player</text></transcript>";

    const PLAYER_PAGE: &str = r#"<html><title>Demo - YouTube</title><script>var ytInitialPlayerResponse = {"videoDetails":{"title":"Demo Video"},"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://captions.test/track-fr","languageCode":"fr"},{"baseUrl":"https://captions.test/track-en","languageCode":"en"}]}}};</script></html>"#;

    // Player object is cut short, but the track array survives intact.
    const BROKEN_PLAYER_PAGE: &str = r#"<html><title>Raw Demo - YouTube</title><script>var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://captions.test/track-en","languageCode":"en"}]</script></html>"#;

    fn page(fetcher: Arc<FakeFetcher>) -> WatchPage {
        WatchPage::new(fetcher, "test-agent", "en-US")
    }

    fn reference() -> VideoReference {
        resolve("https://www.youtube.com/watch?v=abc123XYZ").unwrap()
    }

    #[tokio::test]
    async fn test_player_response_selects_english_track() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .respond("watch?v=abc123XYZ", 200, PLAYER_PAGE)
                .respond("track-en", 200, TRACK_XML),
        );

        let candidate = PlayerResponseStrategy::new(page(fetcher.clone()))
            .attempt(&reference(), &ChainContext::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(candidate.text, "Structured captions from the player");
        assert_eq!(candidate.title.as_deref(), Some("Demo Video"));
        assert_eq!(fetcher.request_count("track-fr"), 0);

        let page_request = &fetcher.requests()[0];
        assert!(page_request
            .headers
            .contains(&("Accept-Language".to_string(), "en-US".to_string())));
        assert!(page_request
            .headers
            .contains(&("User-Agent".to_string(), "test-agent".to_string())));
    }

    #[tokio::test]
    async fn test_raw_fallback_when_player_object_is_broken() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .respond("watch?v=abc123XYZ", 200, BROKEN_PLAYER_PAGE)
                .respond("track-en", 200, TRACK_XML),
        );
        let ctx = ChainContext::new();

        let structured = PlayerResponseStrategy::new(page(fetcher.clone()))
            .attempt(&reference(), &ctx)
            .await
            .unwrap();
        assert!(structured.is_none());

        let raw = RawTrackListStrategy::new(page(fetcher.clone()))
            .attempt(&reference(), &ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw.text, "Structured captions from the player");
        assert_eq!(raw.title.as_deref(), Some("Raw Demo"));

        // Both strategies shared one page download.
        assert_eq!(fetcher.request_count("watch?v="), 1);
    }

    #[tokio::test]
    async fn test_page_error_is_reported() {
        let fetcher = Arc::new(FakeFetcher::new().respond("watch?v=", 429, "slow down"));

        let err = RawTrackListStrategy::new(page(fetcher))
            .attempt(&reference(), &ChainContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RecapError::UpstreamService { status: Some(429), .. }));
    }

    #[tokio::test]
    async fn test_chain_moves_from_empty_timed_text_to_page() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .respond("api/timedtext", 200, "")
                .respond("watch?v=abc123XYZ", 200, PLAYER_PAGE)
                .respond("track-en", 200, TRACK_XML),
        );
        let settings = crate::config::Settings::default();

        let transcript = StrategyChain::youtube(&settings, fetcher)
            .fetch_transcript(&reference())
            .await
            .unwrap();

        assert_eq!(transcript.source_strategy, SourceStrategy::PlayerResponse);
        assert_eq!(transcript.video_title.as_deref(), Some("Demo Video"));
    }

    #[tokio::test]
    async fn test_chain_without_captions_anywhere() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .fail("api/timedtext", "connection reset")
                .respond("watch?v=", 200, "<html><title>No captions - YouTube</title></html>"),
        );
        let settings = crate::config::Settings::default();

        let err = StrategyChain::youtube(&settings, fetcher)
            .fetch_transcript(&reference())
            .await
            .unwrap_err();
        assert!(matches!(err, RecapError::NoCaptionsAvailable(_)));
    }

    #[tokio::test]
    async fn test_rate_limited_page_reports_no_captions() {
        let fetcher = Arc::new(
            FakeFetcher::new()
                .respond("api/timedtext", 200, "")
                .respond("watch?v=", 429, "Too Many Requests"),
        );
        let settings = crate::config::Settings::default();
        let chain = StrategyChain::youtube(&settings, fetcher);
        assert_eq!(chain.sources().last(), Some(&SourceStrategy::RawTrackList));

        let err = chain.fetch_transcript(&reference()).await.unwrap_err();
        assert!(matches!(err, RecapError::NoCaptionsAvailable(_)));
    }
}
