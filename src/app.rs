use crate::config::Config;
use crate::pipeline::MediaPipeline;
use crate::registry::ControlPanelRegistry;
use tracing::info;

/// Long-lived services shared by every interaction.
pub struct AppContext {
    pub config: Config,
    pub pipeline: MediaPipeline,
    pub registry: ControlPanelRegistry,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let pipeline = MediaPipeline::from_config(&config);
        let registry = ControlPanelRegistry::new(&config.storage.data_file);
        Self {
            config,
            pipeline,
            registry,
        }
    }

    /// Read the panel registry at startup; returns how many panels are on record.
    pub async fn restore_panels(&self) -> usize {
        let panels = self.registry.load().await;
        info!(
            "{} control panel(s) on record in {}",
            panels.len(),
            self.registry.path().display()
        );
        panels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_uses_configured_file() {
        let mut config = Config::default();
        config.storage.data_file = "/tmp/haven/panels.json".into();
        let app = AppContext::new(config);
        assert_eq!(
            app.registry.path(),
            std::path::Path::new("/tmp/haven/panels.json")
        );
    }

    #[tokio::test]
    async fn test_restore_panels_reads_registry() {
        let dir = tempfile::tempdir().unwrap();
        let data_file = dir.path().join("panels.json");
        std::fs::write(
            &data_file,
            r#"{"controlPanels":[{"messageId":"1","channelId":"2","guildId":"3","createdAt":"2024-05-01T12:00:00Z"}]}"#,
        )
        .unwrap();
        let mut config = Config::default();
        config.storage.data_file = data_file.to_string_lossy().to_string();

        let app = AppContext::new(config);
        assert_eq!(app.restore_panels().await, 1);
    }

    #[tokio::test]
    async fn test_restore_panels_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.data_file = dir.path().join("absent.json").to_string_lossy().to_string();

        let app = AppContext::new(config);
        assert_eq!(app.restore_panels().await, 0);
    }
}
