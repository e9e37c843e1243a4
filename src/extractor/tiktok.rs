use super::types::*;
use super::Extractor;
use crate::downloader::{MediaStream, SimpleDownloader, TransferError};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Candidate download fields, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoVariant {
    Sd,
    Hd,
    Watermarked,
    Generic,
}

pub const VARIANT_PREFERENCE: [VideoVariant; 4] = [
    VideoVariant::Sd,
    VideoVariant::Hd,
    VideoVariant::Watermarked,
    VideoVariant::Generic,
];

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<TikTokPost>,
}

/// A post as returned by the resolver API.
#[derive(Debug, Default, Deserialize)]
pub struct TikTokPost {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub play: Option<String>,
    #[serde(default)]
    pub hdplay: Option<String>,
    #[serde(default)]
    pub wmplay: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub author: Option<TikTokAuthor>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TikTokAuthor {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub unique_id: Option<String>,
}

impl TikTokPost {
    fn variant(&self, variant: VideoVariant) -> Option<&str> {
        let field = match variant {
            VideoVariant::Sd => &self.play,
            VideoVariant::Hd => &self.hdplay,
            VideoVariant::Watermarked => &self.wmplay,
            VideoVariant::Generic => &self.video,
        };
        field.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    fn is_image_post(&self) -> bool {
        !self.images.is_empty() || self.kind.as_deref() == Some("image")
    }
}

/// First variant in `order` with a non-empty URL wins.
pub fn select_download_url<'a>(
    post: &'a TikTokPost,
    order: &[VideoVariant],
) -> Option<(VideoVariant, &'a str)> {
    order
        .iter()
        .find_map(|v| post.variant(*v).map(|url| (*v, url)))
}

/// Resolves TikTok posts through a tikwm-compatible API.
pub struct TikTokExtractor {
    client: reqwest::Client,
    api_url: String,
    downloader: Arc<SimpleDownloader>,
}

impl TikTokExtractor {
    pub fn new(api_url: impl Into<String>, downloader: Arc<SimpleDownloader>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_url: api_url.into(),
            downloader,
        }
    }

    /// Providers sometimes return paths relative to their own host.
    fn absolute(&self, candidate: &str) -> String {
        if candidate.starts_with("http://") || candidate.starts_with("https://") {
            return candidate.to_string();
        }
        Url::parse(&self.api_url)
            .and_then(|base| base.join(candidate))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| candidate.to_string())
    }
}

#[async_trait]
impl Extractor for TikTokExtractor {
    fn name(&self) -> &'static str {
        "tiktok"
    }

    async fn extract(&self, url: &str) -> Result<ExtractedMedia, ExtractError> {
        let resp = self
            .client
            .get(&self.api_url)
            .query(&[("url", url), ("hd", "1")])
            .header("Accept", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            debug!("TikTok API answered {} for {}", resp.status(), url);
            return Err(ExtractError::NotFound(url.to_string()));
        }

        let body = resp.text().await?;
        let parsed: ApiResponse = serde_json::from_str(&body)
            .map_err(|_| ExtractError::NotFound(url.to_string()))?;

        if parsed.code != 0 {
            debug!(
                "TikTok API rejected {}: code {} ({})",
                url,
                parsed.code,
                parsed.msg.as_deref().unwrap_or("no message")
            );
            return Err(ExtractError::NotFound(url.to_string()));
        }

        let post = parsed
            .data
            .ok_or_else(|| ExtractError::NotFound(url.to_string()))?;

        if post.is_image_post() {
            return Err(ExtractError::UnsupportedContentType("image post".into()));
        }

        let (variant, download_url) =
            select_download_url(&post, &VARIANT_PREFERENCE).ok_or(ExtractError::NoDownloadUrl)?;
        debug!("TikTok {} resolved to {:?} variant", url, variant);
        let download_url = self.absolute(download_url);

        let metadata = MediaMetadata {
            title: post
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "TikTok video".to_string()),
            duration_seconds: post.duration.filter(|d| *d > 0),
            duration_label: None,
            author_name: post
                .author
                .as_ref()
                .and_then(|a| a.nickname.clone().or_else(|| a.unique_id.clone())),
            thumbnail_url: post.cover.clone(),
        };

        Ok(ExtractedMedia {
            metadata,
            handle: MediaHandle::Direct { url: download_url },
        })
    }

    async fn open(&self, media: &ExtractedMedia) -> Result<MediaStream, TransferError> {
        match &media.handle {
            MediaHandle::Direct { url } => self.downloader.fetch(url).await,
            MediaHandle::YtDlp { url, .. } => {
                Err(TransferError::Open(format!("Not a direct handle: {}", url)))
            }
        }
    }
}
