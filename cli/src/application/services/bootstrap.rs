//! Application service — instance bootstrap use-case.
//!
//! Drives one instance's job from manifest to completion: pull required
//! documents, run the job's commands in order, push produced documents back.
//! Imports only from `crate::domain`, `crate::application::ports`, and
//! `flotilla_common`. All I/O is routed through injected port traits.

use anyhow::Result;
use flotilla_common::{Direction, InstanceStatus, Job, Manifest};

use crate::application::ports::{CommandRunner, DocumentTransfer, ProgressReporter, StatusStore};
use crate::domain::{BootstrapStage, CommandError};

/// Run the full bootstrap sequence for one instance.
///
/// Builds a fresh status record from the manifest (a re-run restarts the
/// counters from zero), publishes it, and advances through the lifecycle
/// stages. Every transition and every per-item step is published before and
/// after the work, so an orchestrator watching the store always sees where
/// the instance is.
///
/// On any failure the record's message becomes `failed: <cause>` and one
/// best-effort publish runs before the error propagates; progress already
/// published stays visible.
///
/// # Errors
///
/// Returns an error if the manifest has no job for `instance_id`, a
/// transfer or publish fails, a command cannot be spawned, or a command
/// exits non-zero ([`CommandError::Failed`] with the captured output).
pub async fn execute(
    manifest: &Manifest,
    instance_id: u32,
    transfer: &impl DocumentTransfer,
    statuses: &impl StatusStore,
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
) -> Result<InstanceStatus> {
    let job = manifest.job(instance_id)?;
    let mut status = InstanceStatus::for_job(manifest, job)?;
    let prefix = manifest.key_prefix.as_str();

    statuses.write(prefix, &status).await?;
    reporter.step(&format!(
        "Instance {instance_id}: {}",
        BootstrapStage::Initialized.message()
    ));

    match run_stages(manifest, job, &mut status, transfer, statuses, runner, reporter).await {
        Ok(()) => Ok(status),
        Err(err) => {
            status.update_message(format!("{}: {err:#}", BootstrapStage::Failed.message()));
            if let Err(publish_err) = statuses.write(prefix, &status).await {
                reporter.warn(&format!("Could not publish failure status: {publish_err:#}"));
            }
            Err(err)
        }
    }
}

/// Walk the happy-path stages, publishing on every transition.
async fn run_stages(
    manifest: &Manifest,
    job: &Job,
    status: &mut InstanceStatus,
    transfer: &impl DocumentTransfer,
    statuses: &impl StatusStore,
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let prefix = manifest.key_prefix.as_str();
    let documents = manifest.documents_for(job)?;
    let mut stage = BootstrapStage::Initialized;

    stage = stage.next();
    enter_stage(prefix, stage, status, statuses).await?;
    for doc in &documents {
        match doc.direction {
            // Static inputs are pulled up front too: commands may rely on
            // prestaged data being on disk before the first one runs.
            Direction::LocalToAws | Direction::Static => {
                let step = format!("Downloading '{}'", doc.name);
                status.update_message(step.clone());
                statuses.write(prefix, status).await?;
                reporter.step(&step);

                transfer.download(prefix, doc).await?;
                status.record_download();
                statuses.write(prefix, status).await?;
            }
            Direction::AwsToLocal => {}
        }
    }

    stage = stage.next();
    enter_stage(prefix, stage, status, statuses).await?;

    stage = stage.next();
    enter_stage(prefix, stage, status, statuses).await?;
    for command in &job.commands {
        let line = command.display_line();
        let step = format!("Running command '{line}'");
        status.update_message(step.clone());
        statuses.write(prefix, status).await?;
        reporter.step(&step);

        let output = runner.run(command).await?;
        if !output.status.success() {
            return Err(CommandError::Failed {
                command_line: line,
                status: output.status.to_string(),
                output: combined_output(&output),
            }
            .into());
        }
        status.record_command();
        statuses.write(prefix, status).await?;
    }

    stage = stage.next();
    enter_stage(prefix, stage, status, statuses).await?;

    stage = stage.next();
    enter_stage(prefix, stage, status, statuses).await?;
    for doc in &documents {
        match doc.direction {
            Direction::AwsToLocal => {
                let step = format!("Uploading '{}'", doc.name);
                status.update_message(step.clone());
                statuses.write(prefix, status).await?;
                reporter.step(&step);

                transfer.upload(prefix, doc).await?;
                status.record_upload();
                statuses.write(prefix, status).await?;
            }
            Direction::LocalToAws | Direction::Static => {}
        }
    }

    stage = stage.next();
    debug_assert!(stage.is_terminal());
    enter_stage(prefix, stage, status, statuses).await?;
    reporter.success(&format!("Instance {}: {}", job.instance_id, stage.message()));
    Ok(())
}

/// Publish the stage-entry message for a freshly entered stage.
async fn enter_stage(
    prefix: &str,
    stage: BootstrapStage,
    status: &mut InstanceStatus,
    statuses: &impl StatusStore,
) -> Result<()> {
    status.update_message(stage.message());
    statuses.write(prefix, status).await
}

/// Join captured stdout and stderr for error reporting.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut combined = String::new();
    if !stdout.trim().is_empty() {
        combined.push_str(stdout.trim_end());
    }
    if !stderr.trim().is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(stderr.trim_end());
    }
    combined
}
