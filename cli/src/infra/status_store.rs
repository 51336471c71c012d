//! Infrastructure implementation of the `StatusStore` port.
//!
//! Status records live in the object store as pretty-printed JSON under
//! `status_key`. When constructed with an instance log path, every publish
//! also ships the log file to `log_key` — best-effort, so a log hiccup never
//! blocks the status protocol.

use std::path::PathBuf;

use anyhow::{Context, Result};
use flotilla_common::InstanceStatus;
use flotilla_common::keys::{log_key, status_key};

use crate::application::ports::{ObjectStore, StatusStore};

/// Status store persisting records through the blob port.
pub struct ObjectStatusStore<S> {
    store: S,
    log_file: Option<PathBuf>,
}

impl<S: ObjectStore> ObjectStatusStore<S> {
    /// Read/write status records only. The orchestrator side.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            log_file: None,
        }
    }

    /// Also ship the given log file with every publish. The instance side.
    #[must_use]
    pub fn with_log_file(store: S, log_file: PathBuf) -> Self {
        Self {
            store,
            log_file: Some(log_file),
        }
    }
}

impl<S: ObjectStore> StatusStore for ObjectStatusStore<S> {
    async fn read(&self, prefix: &str, instance_id: u32) -> Result<Option<InstanceStatus>> {
        let key = status_key(prefix, instance_id);
        let Some(bytes) = self.store.fetch(&key).await? else {
            return Ok(None);
        };
        let status = InstanceStatus::from_slice(&bytes)
            .with_context(|| format!("parsing status record '{key}'"))?;
        Ok(Some(status))
    }

    async fn write(&self, prefix: &str, status: &InstanceStatus) -> Result<()> {
        let key = status_key(prefix, status.instance_id);
        let bytes = status.to_bytes().context("serializing status record")?;
        self.store
            .store(&key, &bytes)
            .await
            .with_context(|| format!("publishing status record '{key}'"))?;

        if let Some(log_file) = &self.log_file {
            let log_dest = log_key(prefix, status.instance_id);
            if let Err(err) = self.store.upload(log_file, &log_dest).await {
                tracing::warn!("could not ship instance log to '{log_dest}': {err:#}");
            }
        }
        Ok(())
    }
}
