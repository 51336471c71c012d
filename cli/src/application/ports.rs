//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `flotilla_common` — never
//! from `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;

use anyhow::Result;
use flotilla_common::{CommandSpec, DocumentSpec, InstanceStatus};

// ── Object Store Port ─────────────────────────────────────────────────────────

/// Blob get/put against the shared object store.
///
/// Keys are flat strings built by `flotilla_common::keys`; the core never
/// lists or deletes remote objects.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// Fetch an object's bytes, returning `None` if the key does not exist.
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>>;
    /// Store bytes under a key, overwriting any existing object.
    async fn store(&self, key: &str, bytes: &[u8]) -> Result<()>;
    /// Download an object to a local file.
    ///
    /// # Errors
    ///
    /// Returns an error naming the key if the object does not exist.
    async fn download(&self, key: &str, dest: &Path) -> Result<()>;
    /// Upload a local file under a key.
    async fn upload(&self, src: &Path, key: &str) -> Result<()>;
}

// ── Document Transfer Port ────────────────────────────────────────────────────

/// Moves manifest documents between local disk and the store.
///
/// Implementations own the archive format and key naming; callers hand over
/// the document spec and a key prefix and get the document's tree placed at
/// its `local_path` (or a caller-chosen destination).
#[allow(async_fn_in_trait)]
pub trait DocumentTransfer {
    /// Download a document's artifact and extract it to the spec's `local_path`.
    async fn download(&self, prefix: &str, doc: &DocumentSpec) -> Result<()>;
    /// Download a document's artifact and extract it to `dest` instead of the
    /// spec's `local_path`.
    async fn download_to(&self, prefix: &str, doc: &DocumentSpec, dest: &Path) -> Result<()>;
    /// Archive the tree at the spec's `local_path` and upload it.
    async fn upload(&self, prefix: &str, doc: &DocumentSpec) -> Result<()>;
}

// ── Status Store Port ─────────────────────────────────────────────────────────

/// Reads and writes per-instance status records in the store.
#[allow(async_fn_in_trait)]
pub trait StatusStore {
    /// Read an instance's status record, returning `None` if it was never
    /// published.
    async fn read(&self, prefix: &str, instance_id: u32) -> Result<Option<InstanceStatus>>;
    /// Publish an instance's status record, replacing any previous one.
    async fn write(&self, prefix: &str, status: &InstanceStatus) -> Result<()>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a manifest command to completion and capture its output.
    ///
    /// A non-zero exit is a successful run with a failing status; the caller
    /// decides fatality. No timeout is applied — manifest commands are the
    /// long-running payload, not housekeeping.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    async fn run(&self, command: &CommandSpec) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
