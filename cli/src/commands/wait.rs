//! Wait command — the orchestrator's completion barrier.
//!
//! Polls every still-active instance's status record until the whole fleet
//! reports completion, then optionally fetches the result documents that
//! became available along the way. No timeout lives here: callers that need
//! one wrap the process (`timeout(1)`, CI step limits, supervisor policy).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use flotilla_common::Manifest;

use crate::application::ports::DocumentTransfer as _;
use crate::application::services::barrier::CompletionBarrier;
use crate::infra::store::StoreClient;
use crate::infra::{ArchivingTransfer, ObjectStatusStore};
use crate::output::reporter::{SpinnerReporter, TerminalReporter};
use crate::output::{progress, OutputContext};

/// Arguments for the wait command.
#[derive(Args)]
pub struct WaitArgs {
    /// Object store locator (directory path or http(s) base URL)
    #[arg(long)]
    pub bucket: String,

    /// Key of the run manifest inside the store
    #[arg(long)]
    pub manifest_key: String,

    /// Seconds to sleep between poll passes
    #[arg(long, default_value_t = 10)]
    pub interval_secs: u64,

    /// Download completed result documents into this directory
    #[arg(long)]
    pub fetch_dir: Option<PathBuf>,
}

/// Block until the fleet is done, then fetch results if asked.
///
/// # Errors
///
/// Returns an error if a status read fails, an active instance has no
/// record, or a result download fails.
pub async fn run(ctx: &OutputContext, args: &WaitArgs) -> Result<()> {
    let store = StoreClient::from_locator(&args.bucket);
    let manifest = super::fetch_manifest(&store, &args.manifest_key).await?;
    let statuses = ObjectStatusStore::new(store.clone());
    let interval = Duration::from_secs(args.interval_secs);

    let mut barrier = CompletionBarrier::new(&manifest);
    ctx.info(&format!(
        "Waiting for {} instance(s) under '{}'",
        barrier.remaining(),
        manifest.key_prefix
    ));

    let available = if ctx.show_progress() {
        let pb = progress::spinner("Polling instance status…");
        let reporter = SpinnerReporter::new(&pb);
        let result = barrier.wait_all(&statuses, &reporter, interval).await;
        match &result {
            Ok(_) => progress::finish_ok(&pb, "All instances finished"),
            Err(_) => pb.finish_and_clear(),
        }
        result?
    } else {
        let reporter = TerminalReporter::new(ctx);
        let available = barrier.wait_all(&statuses, &reporter, interval).await?;
        ctx.success("All instances finished");
        available
    };

    if let Some(fetch_dir) = &args.fetch_dir {
        fetch_results(ctx, &store, &manifest, &available, fetch_dir).await?;
    }
    Ok(())
}

/// Download every collected result document into `fetch_dir`.
///
/// Jobs may share a result document; each name is fetched once.
async fn fetch_results(
    ctx: &OutputContext,
    store: &StoreClient,
    manifest: &Manifest,
    available: &[String],
    fetch_dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(fetch_dir)
        .with_context(|| format!("creating {}", fetch_dir.display()))?;
    let scratch = fetch_dir.join(".staging");
    std::fs::create_dir_all(&scratch)
        .with_context(|| format!("creating {}", scratch.display()))?;
    let transfer = ArchivingTransfer::new(store.clone(), scratch.clone());

    let mut fetched: Vec<&str> = Vec::new();
    for name in available {
        if fetched.contains(&name.as_str()) {
            continue;
        }
        let doc = manifest.document(name)?;
        let dest = fetch_dir.join(flotilla_common::sanitize_artifact_name(name));
        transfer.download_to(&manifest.key_prefix, doc, &dest).await?;
        ctx.success(&format!("Fetched '{name}' to {}", dest.display()));
        fetched.push(name);
    }

    if let Err(err) = std::fs::remove_dir_all(&scratch) {
        ctx.warn(&format!("Could not clean up {}: {err}", scratch.display()));
    }
    Ok(())
}
