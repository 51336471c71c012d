//! Filesystem implementation of the `ObjectStore` port.
//!
//! Maps object keys onto paths under a root directory — a shared mount in
//! production, a temp directory in tests. Writes are atomic (temp file +
//! rename) so a concurrently polling reader never observes a half-written
//! record. Async methods bridge to sync I/O via `tokio::task::spawn_blocking`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ObjectStore;

/// Object store rooted at a local directory.
#[derive(Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn fetch_sync(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.object_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes =
            std::fs::read(&path).with_context(|| format!("reading object '{key}'"))?;
        Ok(Some(bytes))
    }

    fn store_sync(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.object_path(key);
        write_atomic(&path, |tmp| {
            std::fs::write(tmp, bytes).with_context(|| format!("writing object '{key}'"))
        })
    }

    fn download_sync(&self, key: &str, dest: &Path) -> Result<()> {
        let path = self.object_path(key);
        if !path.exists() {
            anyhow::bail!("no object at '{key}'");
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::copy(&path, dest)
            .with_context(|| format!("downloading '{key}' to {}", dest.display()))?;
        Ok(())
    }

    fn upload_sync(&self, src: &Path, key: &str) -> Result<()> {
        let path = self.object_path(key);
        write_atomic(&path, |tmp| {
            std::fs::copy(src, tmp)
                .with_context(|| format!("uploading {} to '{key}'", src.display()))?;
            Ok(())
        })
    }
}

/// Write through a temp file in the same directory, then rename into place.
fn write_atomic(path: &Path, write: impl FnOnce(&Path) -> Result<()>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let tmp = {
        let mut s = path.as_os_str().to_owned();
        s.push(".tmp");
        PathBuf::from(s)
    };
    write(&tmp)?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("finalizing {}", path.display()))?;
    Ok(())
}

impl ObjectStore for FsObjectStore {
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let store = self.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || store.fetch_sync(&key))
            .await
            .context("object fetch task panicked")?
    }

    async fn store(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let store = self.clone();
        let key = key.to_string();
        let bytes = bytes.to_vec();
        tokio::task::spawn_blocking(move || store.store_sync(&key, &bytes))
            .await
            .context("object store task panicked")?
    }

    async fn download(&self, key: &str, dest: &Path) -> Result<()> {
        let store = self.clone();
        let key = key.to_string();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || store.download_sync(&key, &dest))
            .await
            .context("object download task panicked")?
    }

    async fn upload(&self, src: &Path, key: &str) -> Result<()> {
        let store = self.clone();
        let key = key.to_string();
        let src = src.to_path_buf();
        tokio::task::spawn_blocking(move || store.upload_sync(&src, &key))
            .await
            .context("object upload task panicked")?
    }
}
