//! Third-party transcript API strategy.

use super::{Candidate, ChainContext, TranscriptStrategy};
use crate::captions::clean_caption_text;
use crate::error::{RecapError, Result};
use crate::http::{HttpFetcher, HttpRequest};
use crate::reference::VideoReference;
use crate::transcript::SourceStrategy;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

/// Keys under which providers return a list of segments.
const SEGMENT_KEYS: &[&str] = &["segments", "transcript", "content", "data"];

/// Keys under which providers return the whole transcript as one string.
const TEXT_KEYS: &[&str] = &["transcript", "text"];

/// Fetches a transcript from a paid transcript API.
///
/// Registered last in the YouTube chain. Its failures end the chain, so
/// callers see them when every free source came up empty.
pub struct DelegatedApiStrategy {
    fetcher: Arc<dyn HttpFetcher>,
    endpoint: String,
    api_key: String,
}

impl DelegatedApiStrategy {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, endpoint: &str, api_key: &str) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn request_url(&self, video_id: &str) -> Result<String> {
        Url::parse_with_params(&self.endpoint, &[("video_id", video_id)])
            .map(String::from)
            .map_err(|e| RecapError::Config(format!("Invalid transcript API endpoint: {}", e)))
    }
}

#[async_trait]
impl TranscriptStrategy for DelegatedApiStrategy {
    fn source(&self) -> SourceStrategy {
        SourceStrategy::DelegatedApi
    }

    #[instrument(skip(self, reference, _ctx), fields(video_id = %reference.id))]
    async fn attempt(
        &self,
        reference: &VideoReference,
        _ctx: &ChainContext,
    ) -> Result<Option<Candidate>> {
        let request = HttpRequest::get(self.request_url(&reference.id)?)
            .header("x-api-key", self.api_key.as_str())
            .header("Accept", "application/json");

        let response = self.fetcher.execute(request).await?.error_for_status()?;
        let body: Value = serde_json::from_slice(&response.body).map_err(|e| {
            RecapError::transport(format!("Transcript API returned invalid JSON: {}", e))
        })?;

        let Some(text) = normalize_transcript(&body) else {
            debug!("Transcript API response had no recognizable transcript");
            return Ok(None);
        };

        let title = body
            .get("title")
            .and_then(Value::as_str)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Some(Candidate::new(text, title)))
    }

    /// Any non-empty text from the paid source is accepted.
    fn min_chars(&self) -> usize {
        0
    }

    fn surfaces_errors(&self) -> bool {
        true
    }
}

/// Flatten the provider's response into plain text.
///
/// Accepts a bare array of segments, an object holding a segment array under
/// one of [`SEGMENT_KEYS`], or an object with the whole transcript as a string.
/// Segments may be strings or objects with a `text` field.
pub fn normalize_transcript(body: &Value) -> Option<String> {
    let text = match body {
        Value::Array(segments) => join_segments(segments),
        Value::Object(map) => {
            let from_segments = SEGMENT_KEYS
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(|value| match value {
                    Value::Array(segments) => Some(join_segments(segments)),
                    // Some providers nest the payload one level down.
                    Value::Object(_) => normalize_transcript(value),
                    _ => None,
                })
                .filter(|t| !t.is_empty());

            from_segments.or_else(|| {
                TEXT_KEYS
                    .iter()
                    .filter_map(|key| map.get(*key).and_then(Value::as_str))
                    .map(clean_caption_text)
                    .find(|t| !t.is_empty())
            })?
        }
        Value::String(s) => clean_caption_text(s),
        _ => return None,
    };

    (!text.is_empty()).then_some(text)
}

fn join_segments(segments: &[Value]) -> String {
    segments
        .iter()
        .filter_map(|segment| match segment {
            Value::String(s) => Some(s.as_str()),
            Value::Object(o) => o.get("text").and_then(Value::as_str),
            _ => None,
        })
        .map(clean_caption_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
