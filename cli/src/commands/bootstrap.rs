//! Bootstrap command — the instance-side entry point.
//!
//! Runs headless on a freshly launched instance: no output context, no
//! colors. Everything it says goes through the tracing context, whose log
//! file is shipped to the store with every status publish.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use flotilla_common::Manifest;

use crate::application::services::bootstrap;
use crate::infra::logging::{LogContext, TracingReporter};
use crate::infra::store::StoreClient;
use crate::infra::{ArchivingTransfer, ObjectStatusStore, TokioCommandRunner};

/// Arguments for the bootstrap command.
#[derive(Args)]
pub struct BootstrapArgs {
    /// Object store locator (directory path or http(s) base URL)
    #[arg(long)]
    pub bucket: String,

    /// Key of the run manifest inside the store
    #[arg(long)]
    pub manifest_key: String,

    /// Instance id of the job to run
    #[arg(long)]
    pub instance_id: u32,

    /// Local working directory for documents, logs, and staging
    #[arg(long)]
    pub work_dir: PathBuf,
}

/// Run this instance's job end to end.
///
/// # Errors
///
/// Returns an error on any transfer, command, or publish failure; the
/// failure status has already been published best-effort by the time the
/// error reaches the caller.
pub async fn run(args: &BootstrapArgs) -> Result<()> {
    std::fs::create_dir_all(&args.work_dir)
        .with_context(|| format!("creating work dir {}", args.work_dir.display()))?;
    let log_ctx = LogContext::init(&args.work_dir, args.instance_id)?;
    tracing::info!(
        "bootstrap starting: instance {} against '{}'",
        args.instance_id,
        args.bucket
    );

    let store = StoreClient::from_locator(&args.bucket);
    let manifest = fetch_manifest_to_disk(&store, args).await?;

    let scratch = args.work_dir.join("staging");
    std::fs::create_dir_all(&scratch)
        .with_context(|| format!("creating staging dir {}", scratch.display()))?;

    let transfer = ArchivingTransfer::new(store.clone(), scratch);
    let statuses = ObjectStatusStore::with_log_file(store, log_ctx.path().to_path_buf());
    let runner = TokioCommandRunner;
    let reporter = TracingReporter;

    match bootstrap::execute(
        &manifest,
        args.instance_id,
        &transfer,
        &statuses,
        &runner,
        &reporter,
    )
    .await
    {
        Ok(status) => {
            tracing::info!(
                "bootstrap finished: {} downloads, {} commands, {} uploads",
                status.downloads_finished,
                status.commands_finished,
                status.uploads_finished
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!("bootstrap failed: {err:#}");
            Err(err)
        }
    }
}

/// Download the manifest next to the job's other artifacts and parse it.
///
/// The on-disk copy is purely for post-mortem inspection of a dead
/// instance; the parsed manifest is what drives the run.
async fn fetch_manifest_to_disk(store: &StoreClient, args: &BootstrapArgs) -> Result<Manifest> {
    use crate::application::ports::ObjectStore as _;

    let bytes = store
        .fetch(&args.manifest_key)
        .await?
        .with_context(|| format!("no manifest at '{}' — was it published?", args.manifest_key))?;

    let local_copy = args.work_dir.join("manifest.json");
    if let Err(err) = std::fs::write(&local_copy, &bytes) {
        tracing::warn!("could not keep manifest copy at {}: {err}", local_copy.display());
    }

    Manifest::from_slice(&bytes).with_context(|| format!("parsing manifest '{}'", args.manifest_key))
}
