use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Owns a temporary file on disk and removes it when released or dropped.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    armed: bool,
}

impl TempFile {
    /// Build a collision-free name: `<prefix>_<unix millis>_<random>.<ext>`.
    pub fn unique_path(dir: &Path, prefix: &str, ext: &str) -> PathBuf {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        dir.join(format!("{}_{}_{}.{}", prefix, millis, &suffix[..8], ext))
    }

    /// Create the file exclusively; fails if the path already exists.
    pub async fn create(path: PathBuf) -> std::io::Result<(Self, tokio::fs::File)> {
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        Ok((Self { path, armed: true }, file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "video.mp4".to_string())
    }

    /// Delete the file; failures are logged and swallowed.
    pub async fn discard(mut self) {
        self.armed = false;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!("Removed temporary file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Could not remove temporary file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Could not remove temporary file {} on drop: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_path_shape() {
        let dir = Path::new("/tmp/work");
        let a = TempFile::unique_path(dir, "tiktok", "mp4");
        let b = TempFile::unique_path(dir, "tiktok", "mp4");
        assert_ne!(a, b);
        let name = a.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("tiktok_"));
        assert!(name.ends_with(".mp4"));
        assert_eq!(a.parent(), Some(dir));
    }

    #[tokio::test]
    async fn test_discard_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = TempFile::unique_path(dir.path(), "video", "mp4");
        let (temp, _file) = TempFile::create(path.clone()).await.unwrap();
        assert!(path.exists());
        temp.discard().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = TempFile::unique_path(dir.path(), "video", "mp4");
        {
            let (_temp, _file) = TempFile::create(path.clone()).await.unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_create_refuses_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taken.mp4");
        std::fs::write(&path, b"x").unwrap();
        assert!(TempFile::create(path.clone()).await.is_err());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_discard_missing_file_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let path = TempFile::unique_path(dir.path(), "video", "mp4");
        let (temp, file) = TempFile::create(path.clone()).await.unwrap();
        drop(file);
        std::fs::remove_file(&path).unwrap();
        temp.discard().await;
        assert!(!path.exists());
    }
}
