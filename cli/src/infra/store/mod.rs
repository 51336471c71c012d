//! Object store backends and locator-based selection.

pub mod fs;
pub mod http;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::application::ports::ObjectStore;
pub use fs::FsObjectStore;
pub use http::HttpObjectStore;

/// Store backend selected from a `--bucket` locator.
///
/// `http://` and `https://` locators select the HTTP backend; anything else
/// is treated as a local directory path (`file://` prefix accepted).
#[derive(Clone)]
pub enum StoreClient {
    Fs(FsObjectStore),
    Http(HttpObjectStore),
}

impl StoreClient {
    /// Build the backend a locator names.
    #[must_use]
    pub fn from_locator(locator: &str) -> Self {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            Self::Http(HttpObjectStore::new(locator))
        } else {
            let path = locator.strip_prefix("file://").unwrap_or(locator);
            Self::Fs(FsObjectStore::new(PathBuf::from(path)))
        }
    }
}

impl ObjectStore for StoreClient {
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self {
            Self::Fs(store) => store.fetch(key).await,
            Self::Http(store) => store.fetch(key).await,
        }
    }

    async fn store(&self, key: &str, bytes: &[u8]) -> Result<()> {
        match self {
            Self::Fs(store) => store.store(key, bytes).await,
            Self::Http(store) => store.store(key, bytes).await,
        }
    }

    async fn download(&self, key: &str, dest: &Path) -> Result<()> {
        match self {
            Self::Fs(store) => store.download(key, dest).await,
            Self::Http(store) => store.download(key, dest).await,
        }
    }

    async fn upload(&self, src: &Path, key: &str) -> Result<()> {
        match self {
            Self::Fs(store) => store.upload(src, key).await,
            Self::Http(store) => store.upload(src, key).await,
        }
    }
}
