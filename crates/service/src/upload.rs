//! Disk storage for uploaded point images.
//!
//! Files are stored as opaque blobs under `<dir>/<12 hex>-<sanitized name>`;
//! only the resulting filename travels further into the create workflow.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::ServiceError;

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }

    /// Write `bytes` to a fresh file and return its stored filename.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ServiceError::Upload(format!("cannot create {}: {e}", self.dir.display())))?;
        let filename = stored_name(original_name);
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ServiceError::Upload(format!("cannot write {}: {e}", path.display())))?;
        debug!(%filename, size = bytes.len(), "upload_stored");
        Ok(filename)
    }

    /// Best-effort removal of a stored file; missing files are not an error.
    pub async fn remove(&self, filename: &str) {
        let path = self.dir.join(sanitize(filename));
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(%filename, "upload_removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(%filename, error = %e, "upload_remove_failed"),
        }
    }
}

fn stored_name(original_name: &str) -> String {
    let prefix: [u8; 6] = rand::random();
    let hex: String = prefix.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}-{}", hex, sanitize(original_name))
}

/// Last path component with anything outside `[A-Za-z0-9._-]` replaced.
fn sanitize(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() { "image".to_string() } else { cleaned }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> UploadStore {
        let n: u64 = rand::random();
        UploadStore::new(std::env::temp_dir().join(format!("ecoleta-uploads-{n:x}")))
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize("../../etc/passwd"), "passwd");
        assert_eq!(sanitize("C:\\photos\\me.jpg"), "me.jpg");
        assert_eq!(sanitize("foto praia.png"), "foto_praia.png");
        assert_eq!(sanitize(".."), "image");
        assert_eq!(sanitize(""), "image");
    }

    #[test]
    fn stored_name_has_hex_prefix() {
        let name = stored_name("photo.jpg");
        let (prefix, rest) = name.split_at(12);
        assert!(prefix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(rest, "-photo.jpg");
    }

    #[tokio::test]
    async fn save_then_remove() -> anyhow::Result<()> {
        let store = temp_store();
        let filename = store.save("photo.jpg", b"jpeg-bytes").await?;
        let on_disk = tokio::fs::read(store.dir().join(&filename)).await?;
        assert_eq!(on_disk, b"jpeg-bytes");

        store.remove(&filename).await;
        assert!(tokio::fs::metadata(store.dir().join(&filename)).await.is_err());
        // 重复删除不报错
        store.remove(&filename).await;
        Ok(())
    }

    #[tokio::test]
    async fn same_original_name_does_not_collide() -> anyhow::Result<()> {
        let store = temp_store();
        let a = store.save("photo.jpg", b"a").await?;
        let b = store.save("photo.jpg", b"b").await?;
        assert_ne!(a, b);
        Ok(())
    }
}
