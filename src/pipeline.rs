//! Classify, resolve, gate, transfer, deliver, clean up.

use crate::config::Config;
use crate::delivery::{self, Reply, ReplyBody, TransferResult};
use crate::downloader::SimpleDownloader;
use crate::error::MediaError;
use crate::extractor::{Extractor, MediaRequest, SourceKind, TikTokExtractor, YouTubeExtractor};
use crate::policy::{Policy, SizeTier};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Outcome of a request that ended with an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivered {
    pub size_bytes: u64,
    pub size_tier: SizeTier,
}

pub struct MediaPipeline {
    youtube: Arc<dyn Extractor>,
    tiktok: Arc<dyn Extractor>,
    downloader: Arc<SimpleDownloader>,
    policy: Policy,
    request_timeout: Duration,
}

impl MediaPipeline {
    pub fn new(
        youtube: Arc<dyn Extractor>,
        tiktok: Arc<dyn Extractor>,
        downloader: Arc<SimpleDownloader>,
        policy: Policy,
        request_timeout: Duration,
    ) -> Self {
        Self {
            youtube,
            tiktok,
            downloader,
            policy,
            request_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let downloader = Arc::new(SimpleDownloader::new(
            &config.storage.work_dir,
            config.download_timeout(),
        ));
        let youtube = Arc::new(YouTubeExtractor::new(
            &config.youtube.ytdlp_path,
            &config.youtube.format,
        ));
        let tiktok = Arc::new(TikTokExtractor::new(
            &config.tiktok.api_url,
            downloader.clone(),
        ));
        Self::new(
            youtube,
            tiktok,
            downloader,
            Policy::from(&config.limits),
            config.request_timeout(),
        )
    }

    /// Run one download request and render whatever happens into `reply`.
    pub async fn handle(&self, raw_url: &str, reply: &dyn Reply) {
        let request = MediaRequest::new(raw_url);
        info!(
            "Download requested: {} ({})",
            request.raw_url,
            request.source_kind.display_name()
        );

        let outcome = match tokio::time::timeout(self.request_timeout, self.run(&request, reply)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(MediaError::TimedOut(self.request_timeout)),
        };

        let err = match outcome {
            Ok(_) => return,
            Err(err) => err,
        };
        if err.is_expected() {
            info!("Download of {} refused: {}", request.raw_url, err);
        } else {
            error!("Download of {} failed: {}", request.raw_url, err);
        }
        if let Err(e) = reply.edit(err.reply_body()).await {
            warn!("Could not report failure to user: {}", e);
        }
    }

    /// The ordered stages of one request; the temp file never outlives this call.
    pub async fn run(
        &self,
        request: &MediaRequest,
        reply: &dyn Reply,
    ) -> Result<Delivered, MediaError> {
        let (extractor, prefix) = match request.source_kind {
            SourceKind::YouTube => (&self.youtube, "video"),
            SourceKind::TikTok => (&self.tiktok, "tiktok"),
            kind @ (SourceKind::Instagram
            | SourceKind::Snapchat
            | SourceKind::SoundCloud
            | SourceKind::Unsupported) => return Err(MediaError::UnsupportedSource(kind)),
        };

        if request.source_kind == SourceKind::TikTok {
            status(reply, "⏬ Downloading video from TikTok...\n\nPlease wait...").await;
        }

        debug!("[{}] resolving {}", extractor.name(), request.raw_url);
        let media = extractor.extract(&request.raw_url).await?;

        if request.source_kind == SourceKind::YouTube {
            if let Err(rejection) = self.policy.check_duration(&media.metadata) {
                return Err(MediaError::DurationExceeded {
                    url: request.raw_url.clone(),
                    metadata: media.metadata,
                    rejection,
                });
            }
            let duration = media
                .metadata
                .duration_text()
                .unwrap_or_else(|| "Not available".into());
            status(
                reply,
                &format!(
                    "⏬ Downloading: **{}**\n⏱️ Duration: {}\n\nPlease wait...",
                    media.metadata.title, duration
                ),
            )
            .await;
        } else {
            status(
                reply,
                "⏬ Fetching from server...\n\nThis may take a minute or two for large files...",
            )
            .await;
        }

        debug!("[{}] transferring {}", extractor.name(), request.raw_url);
        let stream = extractor.open(&media).await?;
        let transferred = self.downloader.save(stream, prefix).await?;

        let size_tier = match self.policy.check_size(transferred.size_bytes) {
            Ok(tier) => tier,
            Err(rejection) => {
                transferred.file.discard().await;
                return Err(MediaError::SizeExceeded(rejection));
            }
        };

        status(reply, "📤 Uploading file to Discord...\n\nPlease wait...").await;

        let size_bytes = transferred.size_bytes;
        let result = TransferResult {
            file: transferred.file,
            size_bytes,
            size_tier,
        };
        delivery::deliver(result, request.source_kind, &media.metadata, reply).await?;

        Ok(Delivered {
            size_bytes,
            size_tier,
        })
    }
}

/// Progress edits are best effort.
async fn status(reply: &dyn Reply, text: &str) {
    if let Err(e) = reply.edit(ReplyBody::Text(text.to_string())).await {
        warn!("Status update failed: {}", e);
    }
}
