//! Append-only record of posted control panel messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Registry encode error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPanelRecord {
    pub message_id: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ControlPanelRecord {
    pub fn new(message_id: u64, channel_id: u64, guild_id: Option<u64>) -> Self {
        Self {
            message_id: message_id.to_string(),
            channel_id: channel_id.to_string(),
            guild_id: guild_id.map(|g| g.to_string()),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryData {
    #[serde(default)]
    control_panels: Vec<ControlPanelRecord>,
}

pub struct ControlPanelRegistry {
    path: PathBuf,
    // Serialises read-modify-write within this process.
    lock: Mutex<()>,
}

impl ControlPanelRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files load as an empty registry.
    pub async fn load(&self) -> Vec<ControlPanelRecord> {
        read_data(&self.path).await.control_panels
    }

    pub async fn append(&self, record: ControlPanelRecord) -> Result<(), RegistryError> {
        let _guard = self.lock.lock().await;

        let mut data = read_data(&self.path).await;
        info!(
            "Registering control panel {} in channel {}",
            record.message_id, record.channel_id
        );
        data.control_panels.push(record);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_string_pretty(&data)?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }
}

async fn read_data(path: &Path) -> RegistryData {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return RegistryData::default(),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return RegistryData::default();
        }
    };
    serde_json::from_str(&contents).unwrap_or_else(|e| {
        warn!("Ignoring malformed registry {}: {}", path.display(), e);
        RegistryData::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ControlPanelRegistry::new(dir.path().join("panels.json"));
        assert!(registry.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panels.json");
        std::fs::write(&path, "{ not json").unwrap();
        let registry = ControlPanelRegistry::new(&path);
        assert!(registry.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_append_writes_camel_case_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panels.json");
        let registry = ControlPanelRegistry::new(&path);

        registry
            .append(ControlPanelRecord::new(111, 222, Some(333)))
            .await
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let panel = &raw["controlPanels"][0];
        assert_eq!(panel["messageId"], "111");
        assert_eq!(panel["channelId"], "222");
        assert_eq!(panel["guildId"], "333");
        assert!(panel["createdAt"].as_str().unwrap().contains('T'));
    }

    #[tokio::test]
    async fn test_append_preserves_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panels.json");
        std::fs::write(
            &path,
            r#"{"controlPanels":[{"messageId":"1","channelId":"2","guildId":null,"createdAt":"2024-01-01T00:00:00Z"}]}"#,
        )
        .unwrap();
        let registry = ControlPanelRegistry::new(&path);

        registry
            .append(ControlPanelRecord::new(3, 4, None))
            .await
            .unwrap();

        let records = registry.load().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message_id, "1");
        assert_eq!(records[1].message_id, "3");
        assert_eq!(records[1].guild_id, None);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ControlPanelRegistry::new(dir.path().join("panels.json"));

        let (a, b, c) = tokio::join!(
            registry.append(ControlPanelRecord::new(1, 10, None)),
            registry.append(ControlPanelRecord::new(2, 10, None)),
            registry.append(ControlPanelRecord::new(3, 10, None)),
        );
        a.unwrap();
        b.unwrap();
        c.unwrap();

        assert_eq!(registry.load().await.len(), 3);
    }
}
