//! Outbound replies and the deliver-then-clean-up step.

use crate::downloader::TempFile;
use crate::extractor::{MediaMetadata, SourceKind};
use crate::policy::SizeTier;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
#[error("Failed to send reply: {0}")]
pub struct DeliveryError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Platform-neutral rich message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<CardField>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub footer: Option<String>,
}

impl Card {
    pub fn new(title: impl Into<String>, description: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color,
            ..Default::default()
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(CardField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody {
    Text(String),
    Card(Card),
    File {
        content: String,
        path: PathBuf,
        filename: String,
    },
}

/// A deferred reply bound to one interaction; every call replaces its content.
#[async_trait]
pub trait Reply: Send + Sync {
    async fn edit(&self, body: ReplyBody) -> Result<(), DeliveryError>;
}

/// A transferred file that passed the size check.
#[derive(Debug)]
pub struct TransferResult {
    pub file: TempFile,
    pub size_bytes: u64,
    pub size_tier: SizeTier,
}

impl TransferResult {
    pub fn local_path(&self) -> &Path {
        self.file.path()
    }
}

pub fn success_message(
    source: SourceKind,
    metadata: &MediaMetadata,
    size_bytes: u64,
    tier: SizeTier,
) -> String {
    let unknown = "Not available";
    let mut message = match source {
        SourceKind::TikTok => format!(
            "✅ Downloaded: **{}**\n👤 User: {}",
            metadata.title,
            metadata.author_name.as_deref().unwrap_or(unknown)
        ),
        _ => format!(
            "✅ Downloaded: **{}**\n📺 Channel: {}",
            metadata.title,
            metadata.author_name.as_deref().unwrap_or(unknown)
        ),
    };
    if let Some(advisory) = tier.advisory(size_bytes) {
        message.push_str("\n\n");
        message.push_str(&advisory);
    }
    message
}

/// Send the file in a single reply, then delete it whatever the send result.
pub async fn deliver(
    result: TransferResult,
    source: SourceKind,
    metadata: &MediaMetadata,
    reply: &dyn Reply,
) -> Result<(), DeliveryError> {
    let content = success_message(source, metadata, result.size_bytes, result.size_tier);
    let body = ReplyBody::File {
        content,
        path: result.local_path().to_path_buf(),
        filename: result.file.file_name(),
    };

    let sent = reply.edit(body).await;
    if sent.is_ok() {
        info!(
            "Delivered {} ({} bytes, {:?})",
            result.file.file_name(),
            result.size_bytes,
            result.size_tier
        );
    }
    result.file.discard().await;
    sent
}
