//! Transcript extraction strategies.
//!
//! YouTube references go through a fixed-order [`StrategyChain`]: the public
//! timed-text endpoint, the watch page's player response, a raw scan of the
//! page for a caption track list, and finally (when a key is configured) a
//! paid third-party API. Strategies run one at a time and the first usable
//! transcript wins, so cheap sources short-circuit the billed one.
//!
//! Other platforms go through [`GenericMediaPath`], which resolves a direct
//! media URL for speech-to-text.

mod delegated;
mod generic;
mod timedtext;
mod watch_page;

pub use delegated::DelegatedApiStrategy;
pub use generic::{
    DownloadedMedia, GenericMediaPath, MediaResolver, ResolvedMedia, SocialDownloaderResolver,
    VideoInfoResolver,
};
pub use timedtext::TimedTextStrategy;
pub use watch_page::{PlayerResponseStrategy, RawTrackListStrategy, WatchPage};

use crate::config::Settings;
use crate::error::{RecapError, Result};
use crate::http::HttpFetcher;
use crate::reference::VideoReference;
use crate::transcript::{SourceStrategy, Transcript};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// Caption transcripts must be longer than this many characters by default.
pub const DEFAULT_MIN_CHARS: usize = 10;

/// Text produced by a strategy, before the chain's usability check.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub title: Option<String>,
}

impl Candidate {
    pub fn new(text: String, title: Option<String>) -> Self {
        Self { text, title }
    }
}

/// State shared by the strategies of one chain run. Created per
/// invocation and dropped with it.
#[derive(Default)]
pub struct ChainContext {
    watch_page: OnceCell<String>,
}

impl ChainContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The watch page HTML, downloaded at most once per run. A failed load is
    /// not cached, so a later strategy retries it.
    pub async fn watch_page<F, Fut>(&self, load: F) -> Result<&str>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        self.watch_page.get_or_try_init(load).await.map(|s| s.as_str())
    }
}

/// Trait for a single transcript extraction method.
#[async_trait]
pub trait TranscriptStrategy: Send + Sync {
    /// Identifies the strategy in transcripts and logs.
    fn source(&self) -> SourceStrategy;

    /// Try to produce text for the reference. `Ok(None)` means the source had
    /// nothing to offer; `Err` means a request failed.
    async fn attempt(
        &self,
        reference: &VideoReference,
        ctx: &ChainContext,
    ) -> Result<Option<Candidate>>;

    /// Trimmed text must be longer than this to count as a transcript.
    fn min_chars(&self) -> usize {
        DEFAULT_MIN_CHARS
    }

    /// Whether a failure of this strategy ends the chain with that error.
    /// Failures of other strategies are logged and the chain moves on.
    fn surfaces_errors(&self) -> bool {
        false
    }
}

/// Ordered list of strategies evaluated until one succeeds.
#[derive(Default)]
pub struct StrategyChain {
    strategies: Vec<Box<dyn TranscriptStrategy>>,
}

impl StrategyChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// The YouTube caption chain described by the settings.
    pub fn youtube(settings: &Settings, fetcher: Arc<dyn HttpFetcher>) -> Self {
        let page = WatchPage::new(
            fetcher.clone(),
            &settings.http.user_agent,
            &settings.captions.accept_language,
        );
        let min_chars = settings.captions.min_chars;

        let mut chain = Self::new()
            .register(Box::new(
                TimedTextStrategy::new(fetcher.clone(), settings.captions.languages.clone())
                    .with_auto_generated(settings.captions.include_auto_generated)
                    .with_min_chars(min_chars),
            ))
            .register(Box::new(
                PlayerResponseStrategy::new(page.clone()).with_min_chars(min_chars),
            ))
            .register(Box::new(RawTrackListStrategy::new(page).with_min_chars(min_chars)));

        if let Some(key) = settings.delegated.api_key.as_deref().filter(|k| !k.is_empty()) {
            chain = chain.register(Box::new(DelegatedApiStrategy::new(
                fetcher,
                &settings.delegated.endpoint,
                key,
            )));
        }

        chain
    }

    /// Append a strategy; it runs after every strategy registered before it.
    pub fn register(mut self, strategy: Box<dyn TranscriptStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Sources of the registered strategies, in evaluation order.
    pub fn sources(&self) -> Vec<SourceStrategy> {
        self.strategies.iter().map(|s| s.source()).collect()
    }

    /// Run the strategies in order and return the first usable transcript.
    ///
    /// Failures are logged and skipped, except from a strategy that
    /// [surfaces its errors](TranscriptStrategy::surfaces_errors), whose
    /// failure is returned as is. When nothing usable comes back the result
    /// is [`RecapError::NoCaptionsAvailable`].
    #[instrument(skip(self, reference), fields(video_id = %reference.id))]
    pub async fn fetch_transcript(&self, reference: &VideoReference) -> Result<Transcript> {
        let ctx = ChainContext::new();

        for strategy in &self.strategies {
            let source = strategy.source();
            debug!(strategy = %source, "Trying strategy");

            match strategy.attempt(reference, &ctx).await {
                Ok(Some(candidate)) => {
                    let text = candidate.text.trim();
                    if text.chars().count() > strategy.min_chars() {
                        info!(strategy = %source, chars = text.len(), "Transcript acquired");
                        return Ok(Transcript::new(text.to_string(), source, candidate.title));
                    }
                    debug!(strategy = %source, chars = text.len(), "Transcript too short, continuing");
                }
                Ok(None) => debug!(strategy = %source, "No transcript from strategy"),
                Err(e) if strategy.surfaces_errors() => return Err(e),
                Err(e) => warn!(strategy = %source, error = %e, "Strategy failed, trying next"),
            }
        }

        Err(RecapError::NoCaptionsAvailable(format!(
            "video {} (tried {} strategies)",
            reference.id,
            self.strategies.len()
        )))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scripted strategies for chain and pipeline tests.

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub enum Script {
        Text(&'static str),
        Nothing,
        Fail(u16),
    }

    pub struct ScriptedStrategy {
        pub source: SourceStrategy,
        pub script: Script,
        pub calls: Arc<AtomicUsize>,
    }

    impl ScriptedStrategy {
        pub fn new(source: SourceStrategy, script: Script) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    source,
                    script,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl TranscriptStrategy for ScriptedStrategy {
        fn source(&self) -> SourceStrategy {
            self.source
        }

        async fn attempt(
            &self,
            _reference: &VideoReference,
            _ctx: &ChainContext,
        ) -> Result<Option<Candidate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                Script::Text(text) => Ok(Some(Candidate::new(text.to_string(), None))),
                Script::Nothing => Ok(None),
                Script::Fail(status) => Err(RecapError::upstream(status, "scripted failure")),
            }
        }

        fn surfaces_errors(&self) -> bool {
            self.source == SourceStrategy::DelegatedApi
        }
    }
}
