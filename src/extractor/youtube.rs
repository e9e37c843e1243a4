use super::types::*;
use super::Extractor;
use crate::downloader::{MediaStream, TransferError};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Resolves YouTube links through the `yt-dlp` executable.
pub struct YouTubeExtractor {
    ytdlp_path: String,
    format: String,
}

impl YouTubeExtractor {
    pub fn new(ytdlp_path: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            format: format.into(),
        }
    }
}

#[async_trait]
impl Extractor for YouTubeExtractor {
    fn name(&self) -> &'static str {
        "youtube"
    }

    async fn extract(&self, url: &str) -> Result<ExtractedMedia, ExtractError> {
        let output = Command::new(&self.ytdlp_path)
            .args(["--dump-single-json", "--no-playlist", "--no-warnings", "--", url])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ExtractError::Tool(format!("Failed to run {}: {}", self.ytdlp_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp metadata lookup failed for {}: {}", url, stderr.trim());
            return Err(ExtractError::NotFound(url.to_string()));
        }

        let metadata = parse_video_json(&output.stdout)
            .ok_or_else(|| ExtractError::NotFound(url.to_string()))?;

        Ok(ExtractedMedia {
            metadata,
            handle: MediaHandle::YtDlp {
                url: url.to_string(),
                format: self.format.clone(),
            },
        })
    }

    async fn open(&self, media: &ExtractedMedia) -> Result<MediaStream, TransferError> {
        let (url, format) = match &media.handle {
            MediaHandle::YtDlp { url, format } => (url, format),
            MediaHandle::Direct { url } => {
                return Err(TransferError::Open(format!("Not a yt-dlp handle: {}", url)))
            }
        };

        let mut child = Command::new(&self.ytdlp_path)
            .args(["--no-playlist", "--quiet", "--no-warnings", "-f"])
            .arg(format)
            .args(["-o", "-", "--"])
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TransferError::Open(format!("Failed to spawn {}: {}", self.ytdlp_path, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransferError::Open("yt-dlp stdout not captured".into()))?;

        // After EOF, surface a failed exit as a stream error.
        let exit = futures::stream::once(async move {
            let failure: Option<std::io::Result<Bytes>> = match child.wait().await {
                Ok(status) if status.success() => None,
                Ok(status) => {
                    warn!("yt-dlp exited with {}", status);
                    Some(Err(std::io::Error::other(format!("yt-dlp exited with {}", status))))
                }
                Err(e) => Some(Err(e)),
            };
            failure
        })
        .filter_map(futures::future::ready);

        Ok(Box::pin(ReaderStream::new(stdout).chain(exit)))
    }
}

#[derive(Debug, Deserialize)]
struct YtDlpVideo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    duration_string: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    thumbnails: Vec<YtDlpThumbnail>,
}

#[derive(Debug, Deserialize)]
struct YtDlpThumbnail {
    url: String,
}

fn parse_video_json(raw: &[u8]) -> Option<MediaMetadata> {
    let video: YtDlpVideo = serde_json::from_slice(raw).ok()?;
    let title = video.title.filter(|t| !t.is_empty())?;

    Some(MediaMetadata {
        title,
        duration_seconds: video.duration.filter(|d| *d >= 0.0).map(|d| d.round() as u64),
        duration_label: video.duration_string,
        author_name: video.channel.or(video.uploader),
        thumbnail_url: video
            .thumbnail
            .or_else(|| video.thumbnails.into_iter().next().map(|t| t.url)),
    })
}
