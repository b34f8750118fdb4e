//! Media resolution for platforms without a caption chain.
//!
//! A non-YouTube reference is turned into a downloadable media URL, either
//! directly (links to media files) or through a resolver API, and the media
//! is downloaded for speech-to-text.

use crate::config::{HttpSettings, MediaResolverSettings};
use crate::error::{RecapError, Result};
use crate::http::{HttpFetcher, HttpRequest};
use crate::reference::{Platform, VideoReference};
use crate::transcription::{extension_for_mime, mime_for_extension, MediaFormat};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Keys that hold a direct media URL in resolver responses.
const MEDIA_URL_KEYS: &[&str] = &["url", "download_url", "media_url", "video_url", "audio_url"];

/// Keys that hold a list of downloadable variants.
const VARIANT_KEYS: &[&str] = &["medias", "links", "formats"];

/// A resolved direct media link.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMedia {
    pub media_url: String,
    pub title: Option<String>,
}

/// Downloaded media, ready for transcription.
#[derive(Debug, Clone)]
pub struct DownloadedMedia {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    pub title: Option<String>,
}

/// Trait for services that turn a video page URL into a media URL.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// `Ok(None)` when the provider answered but had no usable link.
    async fn resolve(&self, reference: &VideoReference) -> Result<Option<ResolvedMedia>>;
}

fn rapidapi_host(endpoint: &str) -> String {
    Url::parse(endpoint)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_default()
}

/// Primary video-info API, queried with `?url=`.
pub struct VideoInfoResolver {
    fetcher: Arc<dyn HttpFetcher>,
    endpoint: String,
    api_key: String,
}

impl VideoInfoResolver {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, endpoint: &str, api_key: &str) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl MediaResolver for VideoInfoResolver {
    fn name(&self) -> &'static str {
        "video-info"
    }

    async fn resolve(&self, reference: &VideoReference) -> Result<Option<ResolvedMedia>> {
        let url = Url::parse_with_params(&self.endpoint, &[("url", reference.canonical_url())])
            .map_err(|e| RecapError::Config(format!("Invalid media resolver endpoint: {}", e)))?;

        let request = HttpRequest::get(url.as_str())
            .header("x-rapidapi-key", self.api_key.as_str())
            .header("x-rapidapi-host", rapidapi_host(&self.endpoint));

        let body = json_body(self.fetcher.execute(request).await?.error_for_status()?.body)?;
        Ok(find_media(&body))
    }
}

/// Alternative social-media downloader API, called with a JSON body.
pub struct SocialDownloaderResolver {
    fetcher: Arc<dyn HttpFetcher>,
    endpoint: String,
    api_key: String,
}

impl SocialDownloaderResolver {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, endpoint: &str, api_key: &str) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl MediaResolver for SocialDownloaderResolver {
    fn name(&self) -> &'static str {
        "social-downloader"
    }

    async fn resolve(&self, reference: &VideoReference) -> Result<Option<ResolvedMedia>> {
        let request = HttpRequest::post_json(&self.endpoint, json!({ "url": reference.canonical_url() }))
            .header("x-rapidapi-key", self.api_key.as_str())
            .header("x-rapidapi-host", rapidapi_host(&self.endpoint));

        let body = json_body(self.fetcher.execute(request).await?.error_for_status()?.body)?;
        Ok(find_media(&body))
    }
}

fn json_body(body: Vec<u8>) -> Result<Value> {
    serde_json::from_slice(&body)
        .map_err(|e| RecapError::transport(format!("Media resolver returned invalid JSON: {}", e)))
}

/// Pull a media URL and title out of a resolver response.
///
/// Looks for a direct URL field first, then a list of variants (preferring
/// audio-only entries), then the same under a `data` or `result` wrapper.
pub fn find_media(body: &Value) -> Option<ResolvedMedia> {
    let title = body
        .get("title")
        .and_then(Value::as_str)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let direct = MEDIA_URL_KEYS
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find(|u| is_http_url(u))
        .map(|u| u.to_string());

    let media_url = direct.or_else(|| {
        VARIANT_KEYS
            .iter()
            .filter_map(|key| body.get(*key).and_then(Value::as_array))
            .find_map(|variants| pick_variant(variants))
    });

    match media_url {
        Some(media_url) => Some(ResolvedMedia { media_url, title }),
        None => ["data", "result"]
            .iter()
            .filter_map(|key| body.get(*key))
            .filter(|inner| inner.is_object())
            .find_map(find_media)
            .map(|mut inner| {
                inner.title = inner.title.or(title.clone());
                inner
            }),
    }
}

fn pick_variant(variants: &[Value]) -> Option<String> {
    let url_of = |v: &Value| {
        v.get("url")
            .and_then(Value::as_str)
            .filter(|u| is_http_url(u))
            .map(|u| u.to_string())
    };
    let is_audio = |v: &Value| {
        ["type", "mime_type", "mimeType"]
            .iter()
            .filter_map(|k| v.get(*k).and_then(Value::as_str))
            .any(|t| t.to_lowercase().contains("audio"))
    };

    variants
        .iter()
        .filter(|v| is_audio(*v))
        .find_map(url_of)
        .or_else(|| variants.iter().find_map(url_of))
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://")
}

/// Resolves and downloads media for non-YouTube references.
pub struct GenericMediaPath {
    fetcher: Arc<dyn HttpFetcher>,
    resolvers: Vec<Box<dyn MediaResolver>>,
    user_agent: String,
    max_bytes: u64,
}

impl GenericMediaPath {
    pub fn new(fetcher: Arc<dyn HttpFetcher>, user_agent: &str, max_bytes: u64) -> Self {
        Self {
            fetcher,
            resolvers: Vec::new(),
            user_agent: user_agent.to_string(),
            max_bytes,
        }
    }

    /// Path with the configured resolver APIs, primary first.
    pub fn from_settings(
        media: &MediaResolverSettings,
        http: &HttpSettings,
        max_bytes: u64,
        fetcher: Arc<dyn HttpFetcher>,
    ) -> Self {
        let mut path = Self::new(fetcher.clone(), &http.user_agent, max_bytes);
        if let Some(key) = media.api_key.as_deref().filter(|k| !k.is_empty()) {
            path = path
                .with_resolver(Box::new(VideoInfoResolver::new(
                    fetcher.clone(),
                    &media.primary_endpoint,
                    key,
                )))
                .with_resolver(Box::new(SocialDownloaderResolver::new(
                    fetcher,
                    &media.alternative_endpoint,
                    key,
                )));
        }
        path
    }

    /// Append a resolver; resolvers are tried in registration order.
    pub fn with_resolver(mut self, resolver: Box<dyn MediaResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Find a direct media URL for the reference.
    #[instrument(skip(self, reference), fields(platform = %reference.platform))]
    pub async fn resolve_media(&self, reference: &VideoReference) -> Result<ResolvedMedia> {
        if reference.platform == Platform::YouTube {
            return Err(RecapError::InvalidReference(
                "YouTube videos are handled by the caption chain; media download is only for other platforms"
                    .to_string(),
            ));
        }

        if reference.platform == Platform::Generic {
            return Ok(ResolvedMedia {
                media_url: reference.canonical_url(),
                title: None,
            });
        }

        if self.resolvers.is_empty() {
            return Err(RecapError::ConfigurationMissing("media.api_key".to_string()));
        }

        let last = self.resolvers.len() - 1;
        for (idx, resolver) in self.resolvers.iter().enumerate() {
            match resolver.resolve(reference).await {
                Ok(Some(media)) => {
                    info!(resolver = resolver.name(), "Media URL resolved");
                    return Ok(media);
                }
                Ok(None) => debug!(resolver = resolver.name(), "Resolver had no media URL"),
                Err(e) if idx == last => return Err(e),
                Err(e) => warn!(resolver = resolver.name(), error = %e, "Resolver failed, trying next"),
            }
        }

        Err(RecapError::NoCaptionsAvailable(format!(
            "no downloadable media found for {}",
            reference.raw_url
        )))
    }

    /// Resolve and download the reference's media.
    pub async fn fetch_media(&self, reference: &VideoReference) -> Result<DownloadedMedia> {
        let resolved = self.resolve_media(reference).await?;
        let request = HttpRequest::get(&resolved.media_url)
            .header("User-Agent", self.user_agent.as_str())
            .max_body(self.max_bytes);
        let response = self.fetcher.execute(request).await?.error_for_status()?;

        let size = response.body.len() as u64;
        if size > self.max_bytes {
            return Err(RecapError::FileTooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        let (file_name, mime_type) =
            media_file_identity(&resolved.media_url, response.content_type.as_deref());
        debug!(%file_name, %mime_type, bytes = size, "Media downloaded");

        Ok(DownloadedMedia {
            bytes: response.body,
            file_name,
            mime_type,
            title: resolved.title,
        })
    }
}

/// File name and MIME type for downloaded media, from the URL's extension
/// when it names a supported format, else from the response content type.
fn media_file_identity(media_url: &str, content_type: Option<&str>) -> (String, String) {
    let url_name = Url::parse(media_url)
        .ok()
        .and_then(|u| u.path_segments()?.last().map(|s| s.to_string()))
        .filter(|name| MediaFormat::from_file_name(name).is_some());

    if let Some(name) = url_name {
        let mime = MediaFormat::from_file_name(&name)
            .map(|f| f.mime_type().to_string())
            .unwrap_or_default();
        return (name, mime);
    }

    let ext = content_type.and_then(extension_for_mime).unwrap_or("mp4");
    let mime = mime_for_extension(ext).unwrap_or("video/mp4");
    (format!("media.{}", ext), mime.to_string())
}
