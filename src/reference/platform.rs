//! Video platforms and the markers used to recognise them.

use serde::{Deserialize, Serialize};

/// Video hosting platform a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    YouTube,
    Vimeo,
    TikTok,
    Instagram,
    Twitter,
    Facebook,
    Dailymotion,
    Twitch,
    /// Direct link to an audio or video file.
    Generic,
}

impl Platform {
    /// Whether the dedicated caption chain handles this platform.
    pub fn has_caption_chain(&self) -> bool {
        matches!(self, Platform::YouTube)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Vimeo => "vimeo",
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::Facebook => "facebook",
            Platform::Dailymotion => "dailymotion",
            Platform::Twitch => "twitch",
            Platform::Generic => "generic",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Host markers in detection order. YouTube comes first so its short and
/// embed domains are never claimed by a later entry.
pub(crate) const PLATFORM_MARKERS: &[(Platform, &[&str])] = &[
    (Platform::YouTube, &["youtube.com", "youtu.be", "youtube-nocookie.com"]),
    (Platform::Vimeo, &["vimeo.com"]),
    (Platform::TikTok, &["tiktok.com"]),
    (Platform::Instagram, &["instagram.com"]),
    (Platform::Twitter, &["twitter.com", "x.com"]),
    (Platform::Facebook, &["facebook.com", "fb.watch"]),
    (Platform::Dailymotion, &["dailymotion.com", "dai.ly"]),
    (Platform::Twitch, &["twitch.tv"]),
];

/// Id patterns per platform, highest priority first. Each has exactly one
/// capture group holding the id.
pub(crate) const ID_PATTERNS: &[(Platform, &[&str])] = &[
    (
        Platform::YouTube,
        &[
            r"[?&]v=([A-Za-z0-9_-]+)",
            r"youtu\.be/([A-Za-z0-9_-]+)",
            r"/embed/([A-Za-z0-9_-]+)",
            r"/shorts/([A-Za-z0-9_-]+)",
            r"/live/([A-Za-z0-9_-]+)",
            r"/v/([A-Za-z0-9_-]+)",
        ],
    ),
    (
        Platform::Vimeo,
        &[r"vimeo\.com/(?:video/|channels/[^/]+/|groups/[^/]+/videos/)?(\d+)"],
    ),
    (
        Platform::TikTok,
        &[r"/video/(\d+)", r"(?:vm|vt)\.tiktok\.com/([A-Za-z0-9]+)"],
    ),
    (Platform::Instagram, &[r"/(?:p|reel|reels|tv)/([A-Za-z0-9_-]+)"]),
    (Platform::Twitter, &[r"/status(?:es)?/(\d+)"]),
    (
        Platform::Facebook,
        &[
            r"/videos/(?:[^/?#]+/)?(\d+)",
            r"[?&]v=(\d+)",
            r"/reel/(\d+)",
            r"fb\.watch/([A-Za-z0-9_-]+)",
        ],
    ),
    (
        Platform::Dailymotion,
        &[r"dailymotion\.com/video/([A-Za-z0-9]+)", r"dai\.ly/([A-Za-z0-9]+)"],
    ),
    (
        Platform::Twitch,
        &[
            r"/videos/(\d+)",
            r"clips\.twitch\.tv/([A-Za-z0-9_-]+)",
            r"/clip/([A-Za-z0-9_-]+)",
        ],
    ),
    (
        Platform::Generic,
        &[r"/([^/?#]+)\.(?i:mp3|wav|m4a|mp4|mov|avi|webm)(?:[?#]|$)"],
    ),
];

/// File extensions that mark a URL as a direct media link.
pub(crate) const MEDIA_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "mp4", "mov", "avi", "webm"];

/// Whether `host` is `marker` or one of its subdomains.
pub(crate) fn host_matches(host: &str, marker: &str) -> bool {
    host == marker
        || host
            .strip_suffix(marker)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_matches() {
        assert!(host_matches("x.com", "x.com"));
        assert!(host_matches("mobile.x.com", "x.com"));
        assert!(!host_matches("netflix.com", "x.com"));
        assert!(host_matches("www.youtube.com", "youtube.com"));
    }

    #[test]
    fn test_every_platform_has_patterns() {
        for (platform, _) in PLATFORM_MARKERS {
            assert!(ID_PATTERNS.iter().any(|(p, pats)| p == platform && !pats.is_empty()));
        }
    }
}
