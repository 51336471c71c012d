//! Infrastructure implementation of the `DocumentTransfer` port.
//!
//! `ArchivingTransfer` stages every document as a `.tar.gz` artifact in a
//! scratch directory: uploads pack the local tree first, downloads pull the
//! artifact first and extract it. Staged artifacts are deleted after use;
//! a failed deletion is logged and otherwise ignored.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flotilla_common::keys::{document_key, sanitize_artifact_name};
use flotilla_common::{ARCHIVE_EXT, DocumentSpec};

use crate::application::ports::{DocumentTransfer, ObjectStore};
use crate::infra::archive;

/// Document transfer that round-trips artifacts through a staging directory.
pub struct ArchivingTransfer<S> {
    store: S,
    scratch: PathBuf,
}

impl<S: ObjectStore> ArchivingTransfer<S> {
    #[must_use]
    pub fn new(store: S, scratch: PathBuf) -> Self {
        Self { store, scratch }
    }

    /// Where a document's artifact sits while staged locally.
    ///
    /// Nested document names are flattened so they stay valid file names.
    fn staging_path(&self, name: &str) -> PathBuf {
        self.scratch
            .join(format!("{}.{ARCHIVE_EXT}", sanitize_artifact_name(name)))
    }

    fn discard_staged(staged: &Path) {
        if let Err(err) = std::fs::remove_file(staged) {
            tracing::warn!(
                "could not remove staged artifact {}: {err}",
                staged.display()
            );
        }
    }
}

impl<S: ObjectStore> DocumentTransfer for ArchivingTransfer<S> {
    async fn download(&self, prefix: &str, doc: &DocumentSpec) -> Result<()> {
        self.download_to(prefix, doc, &doc.local_path).await
    }

    async fn download_to(&self, prefix: &str, doc: &DocumentSpec, dest: &Path) -> Result<()> {
        let key = document_key(prefix, &doc.name);
        let staged = self.staging_path(&doc.name);
        tracing::info!("downloading '{key}' to {}", dest.display());

        self.store
            .download(&key, &staged)
            .await
            .with_context(|| format!("downloading document '{}'", doc.name))?;

        let archive_path = staged.clone();
        let target = dest.to_path_buf();
        tokio::task::spawn_blocking(move || archive::unpack(&archive_path, &target))
            .await
            .context("unpack task panicked")?
            .with_context(|| format!("extracting document '{}'", doc.name))?;

        Self::discard_staged(&staged);
        Ok(())
    }

    async fn upload(&self, prefix: &str, doc: &DocumentSpec) -> Result<()> {
        let key = document_key(prefix, &doc.name);
        let staged = self.staging_path(&doc.name);
        tracing::info!("uploading {} to '{key}'", doc.local_path.display());

        let scratch = self.scratch.clone();
        let src = doc.local_path.clone();
        let archive_path = staged.clone();
        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&scratch)
                .with_context(|| format!("creating {}", scratch.display()))?;
            archive::pack(&src, &archive_path)
        })
        .await
        .context("pack task panicked")?
        .with_context(|| format!("archiving document '{}'", doc.name))?;

        let result = self
            .store
            .upload(&staged, &key)
            .await
            .with_context(|| format!("uploading document '{}'", doc.name));

        Self::discard_staged(&staged);
        result
    }
}
