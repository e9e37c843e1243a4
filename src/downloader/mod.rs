mod simple;
mod temp;

pub use simple::SimpleDownloader;
pub use temp::TempFile;

use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// A remote payload as a stream of byte chunks.
pub type MediaStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Failed to open stream: {0}")]
    Open(String),
    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),
    #[error("Stream error: {0}")]
    Read(std::io::Error),
    #[error("Write error: {0}")]
    Write(std::io::Error),
}

/// A completed copy: the local file plus its measured size.
#[derive(Debug)]
pub struct Transferred {
    pub file: TempFile,
    pub size_bytes: u64,
}
