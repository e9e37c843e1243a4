use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Content not found or inaccessible: {0}")]
    NotFound(String),
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("No download URL in provider response")]
    NoDownloadUrl,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Tool error: {0}")]
    Tool(String),
}

/// Platforms recognised by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    YouTube,
    TikTok,
    Instagram,
    Snapchat,
    SoundCloud,
    Unsupported,
}

impl SourceKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::TikTok => "TikTok",
            Self::Instagram => "Instagram",
            Self::Snapchat => "Snapchat",
            Self::SoundCloud => "SoundCloud",
            Self::Unsupported => "Unsupported",
        }
    }

    /// Recognised platforms that have no downloader yet.
    pub fn is_coming_soon(&self) -> bool {
        matches!(self, Self::Instagram | Self::Snapchat | Self::SoundCloud)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    pub raw_url: String,
    pub source_kind: SourceKind,
}

impl MediaRequest {
    pub fn new(raw_url: &str) -> Self {
        let raw_url = raw_url.trim().to_string();
        let source_kind = super::classify(&raw_url);
        Self {
            raw_url,
            source_kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl MediaMetadata {
    /// Provider label if present, otherwise formatted from the seconds count.
    pub fn duration_text(&self) -> Option<String> {
        self.duration_label
            .clone()
            .filter(|label| !label.is_empty())
            .or_else(|| self.duration_seconds.map(format_duration))
    }
}

/// Where the bytes for a resolved media item come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaHandle {
    /// Piped from `yt-dlp -o -` at the given format selector.
    YtDlp { url: String, format: String },
    /// A direct-download URL fetched with a plain GET.
    Direct { url: String },
}

#[derive(Debug, Clone)]
pub struct ExtractedMedia {
    pub metadata: MediaMetadata,
    pub handle: MediaHandle,
}

/// `m:ss` below an hour, `h:mm:ss` above.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(601), "10:01");
        assert_eq!(format_duration(3725), "1:02:05");
    }

    #[test]
    fn test_duration_text_prefers_provider_label() {
        let meta = MediaMetadata {
            title: "clip".into(),
            duration_seconds: Some(90),
            duration_label: Some("01:30".into()),
            ..Default::default()
        };
        assert_eq!(meta.duration_text().as_deref(), Some("01:30"));

        let meta = MediaMetadata {
            duration_label: Some(String::new()),
            ..meta
        };
        assert_eq!(meta.duration_text().as_deref(), Some("1:30"));
    }

    #[test]
    fn test_media_request_trims_and_classifies() {
        let req = MediaRequest::new("  https://youtu.be/abc  ");
        assert_eq!(req.raw_url, "https://youtu.be/abc");
        assert_eq!(req.source_kind, SourceKind::YouTube);
    }
}
