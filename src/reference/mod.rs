//! Video reference resolution.
//!
//! Turns a user-supplied URL into a [`VideoReference`]: the hosting platform
//! plus the platform-specific video id.

mod platform;

pub use platform::Platform;

use crate::error::{RecapError, Result};
use platform::{host_matches, ID_PATTERNS, MEDIA_EXTENSIONS, PLATFORM_MARKERS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// A resolved video reference. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    pub platform: Platform,
    pub id: String,
    pub raw_url: String,
}

impl VideoReference {
    /// Canonical watch page URL for YouTube references, the raw URL (with a
    /// scheme) otherwise.
    pub fn canonical_url(&self) -> String {
        match self.platform {
            Platform::YouTube => format!("https://www.youtube.com/watch?v={}", self.id),
            _ if self.raw_url.contains("://") => self.raw_url.clone(),
            _ => format!("https://{}", self.raw_url),
        }
    }
}

/// Resolves URLs into video references.
pub struct VideoReferenceResolver {
    patterns: Vec<(Platform, Vec<Regex>)>,
}

impl VideoReferenceResolver {
    pub fn new() -> Self {
        let patterns = ID_PATTERNS
            .iter()
            .map(|(platform, sources)| {
                let compiled = sources
                    .iter()
                    .map(|src| Regex::new(src).expect("Invalid regex"))
                    .collect();
                (*platform, compiled)
            })
            .collect();

        Self { patterns }
    }

    /// Resolve a URL into a platform and id.
    pub fn resolve(&self, input: &str) -> Result<VideoReference> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RecapError::InvalidReference("empty URL".to_string()));
        }

        let url = parse_url(trimmed)?;
        let platform = detect_platform(&url).ok_or_else(|| {
            RecapError::InvalidReference(format!("Unsupported platform or URL: {}", trimmed))
        })?;

        let id = self.extract_id(platform, url.as_str()).ok_or_else(|| {
            RecapError::InvalidReference(format!(
                "Could not find a {} video id in {}",
                platform, trimmed
            ))
        })?;

        Ok(VideoReference {
            platform,
            id,
            raw_url: trimmed.to_string(),
        })
    }

    /// Apply the platform's id patterns in priority order.
    fn extract_id(&self, platform: Platform, url: &str) -> Option<String> {
        let (_, patterns) = self.patterns.iter().find(|(p, _)| *p == platform)?;

        patterns.iter().find_map(|re| {
            re.captures(url)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .filter(|id| !id.is_empty())
                .map(|id| id.to_string())
        })
    }
}

impl Default for VideoReferenceResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve with a freshly built resolver.
pub fn resolve(input: &str) -> Result<VideoReference> {
    VideoReferenceResolver::new().resolve(input)
}

/// Parse input as an http(s) URL, adding a scheme when the user left it off.
fn parse_url(input: &str) -> Result<Url> {
    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    let url = Url::parse(&candidate)
        .map_err(|_| RecapError::InvalidReference(format!("Invalid URL format: {}", input)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(RecapError::InvalidReference(
            "URL must use HTTP or HTTPS protocol".to_string(),
        ));
    }
    if url.host_str().map_or(true, |h| !h.contains('.')) {
        return Err(RecapError::InvalidReference(format!("URL has no valid host: {}", input)));
    }

    Ok(url)
}

/// First platform whose marker matches the host; direct media links fall
/// back to [`Platform::Generic`].
fn detect_platform(url: &Url) -> Option<Platform> {
    let host = url.host_str()?.to_lowercase();

    let known = PLATFORM_MARKERS.iter().find_map(|(platform, markers)| {
        markers
            .iter()
            .any(|marker| host_matches(&host, marker))
            .then_some(*platform)
    });

    known.or_else(|| is_media_path(url.path()).then_some(Platform::Generic))
}

fn is_media_path(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| MEDIA_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(url: &str) -> (Platform, String) {
        let r = resolve(url).unwrap();
        (r.platform, r.id)
    }

    #[test]
    fn test_youtube_formats() {
        assert_eq!(
            resolved("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            (Platform::YouTube, "dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            resolved("https://youtu.be/abc123XYZ"),
            (Platform::YouTube, "abc123XYZ".to_string())
        );
        assert_eq!(
            resolved("https://www.youtube.com/embed/dQw4w9WgXcQ?start=10"),
            (Platform::YouTube, "dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            resolved("https://youtube.com/shorts/aBcDeFgHiJk"),
            (Platform::YouTube, "aBcDeFgHiJk".to_string())
        );
        assert_eq!(
            resolved("https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            (Platform::YouTube, "dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            resolved("youtu.be/dQw4w9WgXcQ"),
            (Platform::YouTube, "dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_parameter_beats_embed_path() {
        // Both patterns present: the higher priority matcher wins.
        assert_eq!(
            resolved("https://www.youtube.com/embed/first?v=second"),
            (Platform::YouTube, "second".to_string())
        );
    }

    #[test]
    fn test_other_platforms() {
        assert_eq!(resolved("https://vimeo.com/76979871"), (Platform::Vimeo, "76979871".into()));
        assert_eq!(
            resolved("https://www.tiktok.com/@someone/video/7212345678901234567"),
            (Platform::TikTok, "7212345678901234567".into())
        );
        assert_eq!(
            resolved("https://www.instagram.com/reel/CxYz123_ab/"),
            (Platform::Instagram, "CxYz123_ab".into())
        );
        assert_eq!(
            resolved("https://x.com/someone/status/1712345678901234567"),
            (Platform::Twitter, "1712345678901234567".into())
        );
        assert_eq!(
            resolved("https://www.facebook.com/watch/?v=1234567890"),
            (Platform::Facebook, "1234567890".into())
        );
        assert_eq!(
            resolved("https://www.dailymotion.com/video/x8abcd1"),
            (Platform::Dailymotion, "x8abcd1".into())
        );
        assert_eq!(
            resolved("https://www.twitch.tv/videos/1987654321"),
            (Platform::Twitch, "1987654321".into())
        );
    }

    #[test]
    fn test_direct_media_link_is_generic() {
        assert_eq!(
            resolved("https://cdn.example.com/talks/keynote.MP4?token=1"),
            (Platform::Generic, "keynote".into())
        );
    }

    #[test]
    fn test_unsupported_domain_is_invalid() {
        let err = resolve("https://www.netflix.com/title/80100172").unwrap_err();
        assert!(matches!(err, RecapError::InvalidReference(_)));
    }

    #[test]
    fn test_non_matching_strings_are_invalid() {
        for input in [
            "",
            "   ",
            "not a url",
            "ftp://youtube.com/watch?v=abc",
            "https://www.youtube.com/",
            "https://www.youtube.com/watch?v=",
            "https://vimeo.com/about",
            "https://example.com/page.html",
        ] {
            assert!(
                matches!(resolve(input), Err(RecapError::InvalidReference(_))),
                "expected InvalidReference for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_canonical_url() {
        let r = resolve("https://youtu.be/abc123XYZ").unwrap();
        assert_eq!(r.canonical_url(), "https://www.youtube.com/watch?v=abc123XYZ");
        assert_eq!(r.raw_url, "https://youtu.be/abc123XYZ");
    }
}
