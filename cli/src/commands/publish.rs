//! Publish command — upload a manifest and seed the status records.
//!
//! The orchestrator runs this before launching any instance. Seeding every
//! job's initial record means the completion barrier never has to guess
//! whether a missing record is "not started yet" or "wrong prefix" — a
//! missing record after publish is always a configuration error.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use flotilla_common::{InstanceStatus, Manifest};

use crate::application::ports::{ObjectStore as _, StatusStore as _};
use crate::infra::store::StoreClient;
use crate::infra::ObjectStatusStore;
use crate::output::OutputContext;

/// Arguments for the publish command.
#[derive(Args)]
pub struct PublishArgs {
    /// Object store locator (directory path or http(s) base URL)
    #[arg(long)]
    pub bucket: String,

    /// Local manifest file to upload
    #[arg(long)]
    pub manifest: PathBuf,

    /// Key to publish the manifest under
    #[arg(long)]
    pub manifest_key: String,
}

/// Validate, upload, and seed.
///
/// # Errors
///
/// Returns an error if the manifest is unreadable or invalid, or any store
/// write fails.
pub async fn run(ctx: &OutputContext, args: &PublishArgs) -> Result<()> {
    let bytes = std::fs::read(&args.manifest)
        .with_context(|| format!("reading manifest {}", args.manifest.display()))?;
    let manifest = Manifest::from_slice(&bytes)
        .with_context(|| format!("validating manifest {}", args.manifest.display()))?;

    let store = StoreClient::from_locator(&args.bucket);
    store
        .store(&args.manifest_key, &bytes)
        .await
        .with_context(|| format!("publishing manifest to '{}'", args.manifest_key))?;
    ctx.success(&format!(
        "Published manifest to '{}' ({} jobs)",
        args.manifest_key,
        manifest.jobs.len()
    ));

    let statuses = ObjectStatusStore::new(store);
    for job in &manifest.jobs {
        let status = InstanceStatus::for_job(&manifest, job)?;
        statuses.write(&manifest.key_prefix, &status).await?;
    }
    ctx.success(&format!(
        "Seeded {} status record(s) under '{}'",
        manifest.jobs.len(),
        manifest.key_prefix
    ));
    Ok(())
}
