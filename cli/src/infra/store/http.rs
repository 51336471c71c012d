//! HTTP implementation of the `ObjectStore` port.
//!
//! Objects live at `{base_url}/{key}`, fetched with `GET` and written with
//! `PUT` — the shape any blob gateway or presigned-URL frontend exposes.
//! ureq is synchronous, so every call is bridged through
//! `tokio::task::spawn_blocking`.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ObjectStore;

/// Object store speaking plain HTTP GET/PUT.
#[derive(Clone)]
pub struct HttpObjectStore {
    base_url: String,
}

impl HttpObjectStore {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url)
    }

    fn fetch_sync(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let url = self.object_url(key);
        let response = match ureq::get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(ureq::Error::Status(code, _)) => {
                anyhow::bail!("fetching '{key}': HTTP {code}")
            }
            Err(err) => return Err(err).with_context(|| format!("fetching '{key}'")),
        };

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .with_context(|| format!("reading '{key}'"))?;
        Ok(Some(bytes))
    }

    fn store_sync(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let url = self.object_url(key);
        match ureq::put(&url).send_bytes(bytes) {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, _)) => {
                anyhow::bail!("storing '{key}': HTTP {code}")
            }
            Err(err) => Err(err).with_context(|| format!("storing '{key}'")),
        }
    }

    fn download_sync(&self, key: &str, dest: &Path) -> Result<()> {
        let url = self.object_url(key);
        let response = match ureq::get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => anyhow::bail!("no object at '{key}'"),
            Err(ureq::Error::Status(code, _)) => {
                anyhow::bail!("downloading '{key}': HTTP {code}")
            }
            Err(err) => return Err(err).with_context(|| format!("downloading '{key}'")),
        };

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        // Stream to a partial file and rename, so an interrupted download
        // never leaves a truncated artifact at the final path.
        let partial = {
            let mut s = dest.as_os_str().to_owned();
            s.push(".partial");
            PathBuf::from(s)
        };
        let mut file = std::fs::File::create(&partial)
            .with_context(|| format!("creating {}", partial.display()))?;
        let mut reader = response.into_reader();
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = reader
                .read(&mut buf)
                .with_context(|| format!("downloading '{key}'"))?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])
                .with_context(|| format!("writing {}", partial.display()))?;
        }
        drop(file);
        std::fs::rename(&partial, dest)
            .with_context(|| format!("finalizing {}", dest.display()))?;
        Ok(())
    }

    fn upload_sync(&self, src: &Path, key: &str) -> Result<()> {
        let url = self.object_url(key);
        let file =
            std::fs::File::open(src).with_context(|| format!("opening {}", src.display()))?;
        match ureq::put(&url).send(file) {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, _)) => {
                anyhow::bail!("uploading '{key}': HTTP {code}")
            }
            Err(err) => Err(err).with_context(|| format!("uploading '{key}'")),
        }
    }
}

impl ObjectStore for HttpObjectStore {
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
