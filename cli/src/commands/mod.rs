//! Command implementations

pub mod bootstrap;
pub mod publish;
pub mod status;
pub mod version;
pub mod wait;

use anyhow::{Context, Result};
use flotilla_common::Manifest;

use crate::application::ports::ObjectStore;

/// Fetch and validate the run's manifest from the store.
///
/// Every orchestrator command starts here; the bootstrap command goes
/// through its own copy-to-disk variant so the manifest survives on the
/// instance for debugging.
pub(crate) async fn fetch_manifest(store: &impl ObjectStore, key: &str) -> Result<Manifest> {
    let bytes = store
        .fetch(key)
        .await?
        .with_context(|| format!("no manifest at '{key}' — was it published?"))?;
    Manifest::from_slice(&bytes).with_context(|| format!("parsing manifest '{key}'"))
}
