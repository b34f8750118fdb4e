//! Caption track discovery in YouTube watch pages.

use super::clean_caption_text;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static PLAYER_RESPONSE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ytInitialPlayerResponse\s*=\s*\{").expect("Invalid regex")
});

static CAPTION_TRACKS_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""captionTracks"\s*:\s*\["#).expect("Invalid regex"));

static PAGE_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title>(.*?)</title>").expect("Invalid regex"));

/// A timed-text track advertised by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub language_code: String,
    pub base_url: String,
    /// `asr` for auto-generated tracks.
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    /// Absolute URL of the track's caption document.
    pub fn document_url(&self) -> String {
        if self.base_url.starts_with('/') {
            format!("https://www.youtube.com{}", self.base_url)
        } else {
            self.base_url.clone()
        }
    }
}

/// Pick the first English track, else the first track.
pub fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code.to_lowercase().starts_with("en"))
        .or_else(|| tracks.first())
}

/// Locate and parse the embedded `ytInitialPlayerResponse` object.
pub fn extract_player_response(html: &str) -> Option<serde_json::Value> {
    let m = PLAYER_RESPONSE_START.find(html)?;
    // The match ends just past the opening brace.
    let object = balanced_json(&html[m.end() - 1..])?;
    serde_json::from_str(object).ok()
}

/// Caption tracks listed in a parsed player response.
pub fn tracks_from_player_response(player: &serde_json::Value) -> Vec<CaptionTrack> {
    player
        .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")
        .cloned()
        .and_then(|tracks| serde_json::from_value(tracks).ok())
        .unwrap_or_default()
}

/// Video title from a parsed player response.
pub fn title_from_player_response(player: &serde_json::Value) -> Option<String> {
    player
        .pointer("/videoDetails/title")
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
}

/// Find a `"captionTracks": [...]` literal anywhere in the page and parse it
/// on its own, without the surrounding player object.
pub fn extract_raw_track_list(html: &str) -> Option<Vec<CaptionTrack>> {
    let m = CAPTION_TRACKS_START.find(html)?;
    let array = balanced_json(&html[m.end() - 1..])?;
    serde_json::from_str(array).ok()
}

/// Title from the page's `<title>` element, without the site suffix.
pub fn title_from_html(html: &str) -> Option<String> {
    let raw = PAGE_TITLE.captures(html)?.get(1)?.as_str();
    let title = clean_caption_text(raw);
    let title = title.strip_suffix(" - YouTube").unwrap_or(&title).trim().to_string();
    (!title.is_empty() && title != "YouTube").then_some(title)
}

/// Return the JSON object or array at the start of `s`, matched by bracket
/// depth with string literals and escapes skipped.
fn balanced_json(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if !matches!(bytes.first(), Some(b'{') | Some(b'[')) {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}
