use super::{MediaStream, TempFile, TransferError, Transferred};
use futures::StreamExt;
use reqwest::Client;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Streams remote payloads into uniquely named files under `work_dir`.
pub struct SimpleDownloader {
    client: Client,
    work_dir: PathBuf,
}

impl SimpleDownloader {
    pub fn new(work_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            work_dir: work_dir.into(),
        }
    }

    /// Open a streaming GET; the body length is not capped.
    pub async fn fetch(&self, url: &str) -> Result<MediaStream, TransferError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransferError::Open(format!("Failed to fetch: {}", e)))?;

        if !response.status().is_success() {
            return Err(TransferError::Status(response.status()));
        }

        debug!(
            "Opened {} ({} bytes announced)",
            url,
            response
                .content_length()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "unknown".into())
        );

        Ok(Box::pin(
            response.bytes_stream().map(|chunk| chunk.map_err(std::io::Error::other)),
        ))
    }

    /// Copy `stream` into a fresh file named after `prefix`.
    ///
    /// Returns only after the file is flushed. On any read or write error the
    /// partial file is removed before the error is returned.
    pub async fn save(&self, stream: MediaStream, prefix: &str) -> Result<Transferred, TransferError> {
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(TransferError::Write)?;

        let path = TempFile::unique_path(&self.work_dir, prefix, "mp4");
        let (temp, file) = TempFile::create(path).await.map_err(TransferError::Write)?;

        match copy_to_file(stream, file).await {
            Ok(size_bytes) => Ok(Transferred {
                file: temp,
                size_bytes,
            }),
            Err(e) => {
                warn!("Transfer into {} failed: {}", temp.path().display(), e);
                temp.discard().await;
                Err(e)
            }
        }
    }
}

async fn copy_to_file(mut stream: MediaStream, mut file: tokio::fs::File) -> Result<u64, TransferError> {
    let started = Instant::now();
    let mut written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(TransferError::Read)?;
        file.write_all(&chunk).await.map_err(TransferError::Write)?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(TransferError::Write)?;
    file.sync_all().await.map_err(TransferError::Write)?;

    // Size is measured on disk, not from the byte count.
    let size = file.metadata().await.map_err(TransferError::Write)?.len();
    if size != written {
        warn!("Wrote {} bytes but file reports {}", written, size);
    }

    info!(
        "Transfer finished: {} bytes in {:.1}s",
        size,
        started.elapsed().as_secs_f64()
    );
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn stream_of(chunks: Vec<std::io::Result<Bytes>>) -> MediaStream {
        Box::pin(futures::stream::iter(chunks))
    }

    fn files_in(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_save_writes_all_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = SimpleDownloader::new(dir.path(), Duration::from_secs(5));

        let stream = stream_of(vec![
            Ok(Bytes::from_static(b"hello ")),
            Ok(Bytes::from_static(b"world")),
        ]);
        let transferred = downloader.save(stream, "video").await.unwrap();

        assert_eq!(transferred.size_bytes, 11);
        let contents = std::fs::read(transferred.file.path()).unwrap();
        assert_eq!(contents, b"hello world");
        assert!(transferred.file.file_name().starts_with("video_"));

        transferred.file.discard().await;
        assert_eq!(files_in(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_save_removes_partial_file_on_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = SimpleDownloader::new(dir.path(), Duration::from_secs(5));

        let stream = stream_of(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ]);
        let err = downloader.save(stream, "tiktok").await.unwrap_err();

        assert!(matches!(err, TransferError::Read(_)));
        assert_eq!(files_in(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_concurrent_saves_use_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = SimpleDownloader::new(dir.path(), Duration::from_secs(5));

        let (a, b) = tokio::join!(
            downloader.save(stream_of(vec![Ok(Bytes::from_static(b"a"))]), "video"),
            downloader.save(stream_of(vec![Ok(Bytes::from_static(b"bb"))]), "video"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.file.path(), b.file.path());
        assert_eq!(a.size_bytes, 1);
        assert_eq!(b.size_bytes, 2);
    }

    #[tokio::test]
    async fn test_fetch_streams_http_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/video.mp4")
            .with_status(200)
            .with_body(vec![7u8; 4096])
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = SimpleDownloader::new(dir.path(), Duration::from_secs(5));
        let stream = downloader
            .fetch(&format!("{}/video.mp4", server.url()))
            .await
            .unwrap();
        let transferred = downloader.save(stream, "tiktok").await.unwrap();

        mock.assert_async().await;
        assert_eq!(transferred.size_bytes, 4096);
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone.mp4")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = SimpleDownloader::new(dir.path(), Duration::from_secs(5));
        let result = downloader.fetch(&format!("{}/gone.mp4", server.url())).await;

        assert!(matches!(result, Err(TransferError::Status(s)) if s.as_u16() == 404));
        assert_eq!(files_in(dir.path()), 0);
    }
}
