mod tiktok;
mod types;
mod youtube;

pub use tiktok::{select_download_url, TikTokExtractor, TikTokPost, VideoVariant, VARIANT_PREFERENCE};
pub use types::*;
pub use youtube::YouTubeExtractor;

use crate::downloader::{MediaStream, TransferError};
use async_trait::async_trait;

/// Domain substrings checked in priority order; first match wins.
const SOURCE_DOMAINS: &[(&str, SourceKind)] = &[
    ("youtube.com", SourceKind::YouTube),
    ("youtu.be", SourceKind::YouTube),
    ("tiktok.com", SourceKind::TikTok),
    ("instagram.com", SourceKind::Instagram),
    ("snapchat.com", SourceKind::Snapchat),
    ("soundcloud.com", SourceKind::SoundCloud),
];

/// Classify a submitted URL by the platform domain it mentions.
pub fn classify(url: &str) -> SourceKind {
    let url = url.to_lowercase();
    SOURCE_DOMAINS
        .iter()
        .find(|(domain, _)| url.contains(domain))
        .map(|(_, kind)| *kind)
        .unwrap_or(SourceKind::Unsupported)
}

/// A source-specific metadata resolver that can also open the media stream.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Resolve metadata and a stream handle without transferring the payload.
    async fn extract(&self, url: &str) -> Result<ExtractedMedia, ExtractError>;

    /// Open the remote byte stream for a previously extracted item.
    async fn open(&self, media: &ExtractedMedia) -> Result<MediaStream, TransferError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_youtube() {
        assert_eq!(classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), SourceKind::YouTube);
        assert_eq!(classify("https://youtu.be/dQw4w9WgXcQ"), SourceKind::YouTube);
        assert_eq!(classify("https://m.youtube.com/shorts/abc"), SourceKind::YouTube);
        assert_eq!(classify("HTTPS://WWW.YOUTUBE.COM/watch?v=x"), SourceKind::YouTube);
    }

    #[test]
    fn test_classify_tiktok() {
        assert_eq!(classify("https://www.tiktok.com/@user/video/123"), SourceKind::TikTok);
        assert_eq!(classify("https://vm.tiktok.com/ZMabc/"), SourceKind::TikTok);
    }

    #[test]
    fn test_classify_coming_soon_platforms() {
        assert_eq!(classify("https://www.instagram.com/reel/xyz/"), SourceKind::Instagram);
        assert_eq!(classify("https://www.snapchat.com/spotlight/abc"), SourceKind::Snapchat);
        assert_eq!(classify("https://soundcloud.com/artist/track"), SourceKind::SoundCloud);
        assert!(SourceKind::Instagram.is_coming_soon());
        assert!(SourceKind::SoundCloud.is_coming_soon());
        assert!(!SourceKind::TikTok.is_coming_soon());
    }

    #[test]
    fn test_classify_unsupported() {
        assert_eq!(classify("https://vimeo.com/12345"), SourceKind::Unsupported);
        assert_eq!(classify("not a url"), SourceKind::Unsupported);
        assert_eq!(classify(""), SourceKind::Unsupported);
    }

    #[test]
    fn test_classify_first_match_wins() {
        let crafted = "https://www.tiktok.com/redirect?to=https://youtube.com/watch";
        assert_eq!(classify(crafted), SourceKind::YouTube);
        let crafted = "https://soundcloud.com/x?ref=instagram.com";
        assert_eq!(classify(crafted), SourceKind::Instagram);
    }
}
