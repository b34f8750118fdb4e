//! Speech-to-text request and accepted media formats.

use crate::error::{RecapError, Result};
use std::path::Path;

/// Media formats accepted by the speech-to-text endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Mp3,
    Wav,
    M4a,
    Mp4,
    Mov,
    Avi,
    Webm,
}

impl MediaFormat {
    pub const ALL: [MediaFormat; 7] = [
        MediaFormat::Mp3,
        MediaFormat::Wav,
        MediaFormat::M4a,
        MediaFormat::Mp4,
        MediaFormat::Mov,
        MediaFormat::Avi,
        MediaFormat::Webm,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Wav => "wav",
            MediaFormat::M4a => "m4a",
            MediaFormat::Mp4 => "mp4",
            MediaFormat::Mov => "mov",
            MediaFormat::Avi => "avi",
            MediaFormat::Webm => "webm",
        }
    }

    /// MIME type submitted for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "audio/mpeg",
            MediaFormat::Wav => "audio/wav",
            MediaFormat::M4a => "audio/mp4",
            MediaFormat::Mp4 => "video/mp4",
            MediaFormat::Mov => "video/quicktime",
            MediaFormat::Avi => "video/x-msvideo",
            MediaFormat::Webm => "video/webm",
        }
    }

    /// Other labels clients send for the same format.
    fn mime_aliases(&self) -> &'static [&'static str] {
        match self {
            MediaFormat::Mp3 => &["audio/mp3", "audio/mpeg3"],
            MediaFormat::Wav => &["audio/x-wav", "audio/wave", "audio/vnd.wave"],
            MediaFormat::M4a => &["audio/x-m4a", "audio/m4a"],
            MediaFormat::Mp4 => &[],
            MediaFormat::Mov => &[],
            MediaFormat::Avi => &["video/avi", "video/msvideo"],
            MediaFormat::Webm => &["audio/webm"],
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// Match a MIME type, ignoring case and parameters such as `; codecs=`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.mime_type() == essence || f.mime_aliases().contains(&essence.as_str()))
    }

    /// Format implied by a file name's extension.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// MIME type for a file extension, if the extension is supported.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    MediaFormat::from_extension(ext).map(|f| f.mime_type())
}

/// File extension for a MIME type, if the type is supported.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    MediaFormat::from_mime(mime).map(|f| f.extension())
}

/// A validated upload ready for the speech-to-text endpoint.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub file_bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl TranscriptionRequest {
    /// Validate and normalize an upload.
    ///
    /// Size is checked before type. The format is taken from the declared
    /// MIME type, falling back to the file extension. M4A audio is always
    /// submitted as `audio/mp4`, whatever label it arrived with.
    pub fn new(file_bytes: Vec<u8>, file_name: &str, mime_type: &str, max_bytes: u64) -> Result<Self> {
        let size_bytes = file_bytes.len() as u64;
        if size_bytes > max_bytes {
            return Err(RecapError::FileTooLarge {
                size: size_bytes,
                limit: max_bytes,
            });
        }

        let by_name = MediaFormat::from_file_name(file_name);
        let format = match (MediaFormat::from_mime(mime_type), by_name) {
            (_, Some(MediaFormat::M4a)) => MediaFormat::M4a,
            (Some(format), _) => format,
            (None, Some(format)) => format,
            (None, None) => {
                return Err(RecapError::UnsupportedFileType(format!(
                    "{} ({}); supported: {}",
                    file_name,
                    if mime_type.is_empty() { "no type" } else { mime_type },
                    MediaFormat::ALL.map(|f| f.extension()).join(", ")
                )))
            }
        };

        let file_name = if by_name.is_some() {
            file_name.to_string()
        } else {
            format!("{}.{}", file_stem(file_name), format.extension())
        };

        Ok(Self {
            file_bytes,
            file_name,
            mime_type: format.mime_type().to_string(),
            size_bytes,
        })
    }
}

fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload")
}
