//! Status command — one-shot read of the fleet's progress records.

use anyhow::Result;
use clap::Args;
use flotilla_common::InstanceStatus;

use crate::application::ports::StatusStore as _;
use crate::infra::store::StoreClient;
use crate::infra::ObjectStatusStore;
use crate::output::OutputContext;

/// Arguments for the status command.
#[derive(Args)]
pub struct StatusArgs {
    /// Object store locator (directory path or http(s) base URL)
    #[arg(long)]
    pub bucket: String,

    /// Key of the run manifest inside the store
    #[arg(long)]
    pub manifest_key: String,

    /// Show only this instance
    #[arg(long)]
    pub instance_id: Option<u32>,
}

/// Print each requested instance's record, or note its absence.
///
/// A missing record is reported, not fatal: a one-shot inspection of a
/// half-launched fleet is a legitimate use.
///
/// # Errors
///
/// Returns an error if the manifest is missing or a store read fails.
pub async fn run(ctx: &OutputContext, args: &StatusArgs) -> Result<()> {
    let store = StoreClient::from_locator(&args.bucket);
    let manifest = super::fetch_manifest(&store, &args.manifest_key).await?;
    let statuses = ObjectStatusStore::new(store);

    let ids: Vec<u32> = match args.instance_id {
        Some(id) => {
            manifest.job(id)?;
            vec![id]
        }
        None => manifest.jobs.iter().map(|job| job.instance_id).collect(),
    };

    for id in ids {
        match statuses.read(&manifest.key_prefix, id).await? {
            Some(record) => print_record(ctx, &record),
            None => ctx.warn(&format!("Instance {id}: no status record published")),
        }
    }
    Ok(())
}

fn print_record(ctx: &OutputContext, record: &InstanceStatus) {
    ctx.header(&format!("Instance {}", record.instance_id));
    ctx.kv("activity ", &record.message);
    ctx.kv(
        "downloads",
        &format!("{}/{}", record.downloads_finished, record.totals.downloads),
    );
    ctx.kv(
        "commands ",
        &format!("{}/{}", record.commands_finished, record.totals.commands),
    );
    ctx.kv(
        "uploads  ",
        &format!("{}/{}", record.uploads_finished, record.totals.uploads),
    );
    ctx.kv(
        "finished ",
        if record.all_tasks_finished() { "yes" } else { "no" },
    );
    ctx.kv("updated  ", &record.updated_at.to_rfc3339());
}
