//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{debug, info};

/// Item category icons bundled into the binary, keyed by the filename the
/// item seed stores in `items.image`.
pub const ITEM_ASSETS: [(&str, &[u8]); 6] = [
    ("lampadas.svg", include_bytes!("../assets/items/lampadas.svg")),
    ("baterias.svg", include_bytes!("../assets/items/baterias.svg")),
    ("papeis-papelao.svg", include_bytes!("../assets/items/papeis-papelao.svg")),
    ("eletronicos.svg", include_bytes!("../assets/items/eletronicos.svg")),
    ("organicos.svg", include_bytes!("../assets/items/organicos.svg")),
    ("oleo.svg", include_bytes!("../assets/items/oleo.svg")),
];

/// Ensure the uploads directory exists and holds the item icons.
///
/// Icons already present are left untouched so operators can replace them.
pub async fn ensure_uploads_dir(uploads_dir: impl AsRef<Path>) -> anyhow::Result<()> {
    let dir = uploads_dir.as_ref();
    if tokio::fs::metadata(dir).await.is_err() {
        info!(uploads_dir = %dir.display(), "uploads directory not found; creating it");
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;

    let mut installed = 0;
    for (name, bytes) in ITEM_ASSETS {
        let path = dir.join(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            continue;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| anyhow::anyhow!("cannot write {}: {e}", path.display()))?;
        installed += 1;
    }
    debug!(uploads_dir = %dir.display(), installed, "item assets ready");
    Ok(())
}
