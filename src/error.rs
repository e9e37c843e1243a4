use crate::delivery::{Card, DeliveryError, ReplyBody};
use crate::downloader::TransferError;
use crate::extractor::{ExtractError, MediaMetadata, SourceKind};
use crate::policy::{format_size, DurationRejection, SizeRejection, MIB};
use std::time::Duration;
use thiserror::Error;

const RED: u32 = 0xFF0000;

/// Everything that can end a download request early.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Media not found: {0}")]
    NotFound(String),
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("Unsupported source: {}", .0.display_name())]
    UnsupportedSource(SourceKind),
    #[error("Duration {}s exceeds {}s", .rejection.duration_seconds, .rejection.limit_seconds)]
    DurationExceeded {
        url: String,
        metadata: MediaMetadata,
        rejection: DurationRejection,
    },
    #[error("File size {} exceeds {}", format_size(.0.size_bytes), format_size(.0.limit_bytes))]
    SizeExceeded(SizeRejection),
    #[error("No download URL available")]
    NoDownloadUrl,
    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),
    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
    #[error("Resolver failed: {0}")]
    Resolver(String),
    #[error("Request timed out after {0:?}")]
    TimedOut(Duration),
}

impl From<ExtractError> for MediaError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::NotFound(msg) => Self::NotFound(msg),
            ExtractError::UnsupportedContentType(msg) => Self::UnsupportedContentType(msg),
            ExtractError::NoDownloadUrl => Self::NoDownloadUrl,
            ExtractError::Network(e) => Self::Resolver(e.to_string()),
            ExtractError::Tool(msg) => Self::Resolver(msg),
        }
    }
}

impl MediaError {
    /// Outcomes the user caused or the platform forbids; the rest are faults.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::UnsupportedContentType(_)
                | Self::UnsupportedSource(_)
                | Self::DurationExceeded { .. }
                | Self::SizeExceeded(_)
        )
    }

    /// The single edit shown to the user for this outcome.
    pub fn reply_body(&self) -> ReplyBody {
        match self {
            Self::NotFound(_) => {
                ReplyBody::Text("❌ Invalid link or the video is not accessible.".into())
            }
            Self::UnsupportedContentType(_) => ReplyBody::Text(
                "⚠️ This post contains images. Only video posts can be downloaded for now.".into(),
            ),
            Self::UnsupportedSource(kind) if kind.is_coming_soon() => ReplyBody::Text(format!(
                "⚠️ Downloading from {} is under development and will be added soon!",
                kind.display_name()
            )),
            Self::UnsupportedSource(_) => ReplyBody::Text(
                "❌ Unsupported link. Please use a link from YouTube, TikTok, Instagram, Snapchat or SoundCloud."
                    .into(),
            ),
            Self::DurationExceeded {
                url,
                metadata,
                rejection,
            } => ReplyBody::Card(duration_card(url, metadata, rejection)),
            Self::SizeExceeded(rejection) => ReplyBody::Text(format!(
                "❌ The video is too large ({}). The maximum is {} MB.",
                format_size(rejection.size_bytes),
                rejection.limit_bytes / MIB
            )),
            Self::NoDownloadUrl => {
                ReplyBody::Text("❌ Could not get a download link. Please try again.".into())
            }
            Self::TimedOut(_) => ReplyBody::Text(
                "❌ The download took too long and was stopped. Please try again later.".into(),
            ),
            Self::Transfer(_) | Self::Delivery(_) | Self::Resolver(_) => ReplyBody::Text(
                "❌ Something went wrong while downloading. Check the link and try again.".into(),
            ),
        }
    }
}

fn duration_card(url: &str, metadata: &MediaMetadata, rejection: &DurationRejection) -> Card {
    let duration = metadata
        .duration_text()
        .unwrap_or_else(|| rejection.duration_seconds.to_string());
    let limit_minutes = rejection.limit_seconds / 60;
    let mut card = Card::new(
        "📺 Video too long",
        format!(
            "**{}**\n\n⚠️ The video is longer than {} minutes ({}) and cannot be downloaded.",
            metadata.title, limit_minutes, duration
        ),
        RED,
    )
    .field("⏱️ Duration", duration, true)
    .field(
        "📺 Channel",
        metadata.author_name.as_deref().unwrap_or("Not available"),
        true,
    )
    .field("🔗 Link", format!("[Watch on YouTube]({})", url), false);
    card.thumbnail_url = metadata.thumbnail_url.clone();
    card
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(err: MediaError) -> String {
        match err.reply_body() {
            ReplyBody::Text(t) => t,
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_coming_soon_names_platform() {
        let msg = text(MediaError::UnsupportedSource(SourceKind::Snapchat));
        assert!(msg.contains("Snapchat"));
        assert!(msg.contains("under development"));
    }

    #[test]
    fn test_unsupported_lists_platforms() {
        let msg = text(MediaError::UnsupportedSource(SourceKind::Unsupported));
        assert!(msg.starts_with("❌ Unsupported link"));
        assert!(msg.contains("YouTube, TikTok"));
    }

    #[test]
    fn test_size_exceeded_message() {
        let msg = text(MediaError::SizeExceeded(SizeRejection {
            size_bytes: 520 * MIB,
            limit_bytes: 500 * MIB,
        }));
        assert_eq!(msg, "❌ The video is too large (520.00 MB). The maximum is 500 MB.");
    }

    #[test]
    fn test_duration_card() {
        let err = MediaError::DurationExceeded {
            url: "https://youtu.be/x".into(),
            metadata: MediaMetadata {
                title: "Long talk".into(),
                duration_seconds: Some(3725),
                duration_label: Some("1:02:05".into()),
                author_name: Some("Chan".into()),
                thumbnail_url: Some("https://i.ytimg.com/x.jpg".into()),
            },
            rejection: DurationRejection {
                duration_seconds: 3725,
                limit_seconds: 600,
            },
        };
        let ReplyBody::Card(card) = err.reply_body() else {
            panic!("expected card");
        };
        assert_eq!(card.color, RED);
        assert!(card.description.contains("**Long talk**"));
        assert!(card.description.contains("10 minutes (1:02:05)"));
        assert_eq!(card.fields[1].value, "Chan");
        assert_eq!(card.fields[2].value, "[Watch on YouTube](https://youtu.be/x)");
        assert_eq!(card.thumbnail_url.as_deref(), Some("https://i.ytimg.com/x.jpg"));
    }

    #[test]
    fn test_extract_error_mapping() {
        assert!(matches!(
            MediaError::from(ExtractError::NotFound("x".into())),
            MediaError::NotFound(_)
        ));
        assert!(matches!(
            MediaError::from(ExtractError::Tool("spawn".into())),
            MediaError::Resolver(_)
        ));
        assert!(matches!(
            MediaError::from(ExtractError::NoDownloadUrl),
            MediaError::NoDownloadUrl
        ));
    }

    #[test]
    fn test_expected_vs_fault() {
        assert!(MediaError::NotFound("x".into()).is_expected());
        assert!(!MediaError::Resolver("x".into()).is_expected());
        assert!(!MediaError::TimedOut(Duration::from_secs(1)).is_expected());
    }
}
