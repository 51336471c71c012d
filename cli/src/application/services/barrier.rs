//! Application service — fleet completion barrier use-case.
//!
//! The orchestrator side of the status protocol: sweep every still-active
//! instance's status record and block until the whole fleet has finished.
//! Imports only from `crate::application::ports` and `flotilla_common`.
//! All I/O is routed through injected port traits.

use std::time::Duration;

use anyhow::{Context, Result};
use flotilla_common::Manifest;

use crate::application::ports::{ProgressReporter, StatusStore};

/// Result of one barrier sweep.
#[derive(Debug)]
pub struct PollOutcome {
    /// Names of result documents whose owning instance finished this pass.
    pub newly_available: Vec<String>,
    /// Instances still working after the pass.
    pub remaining: usize,
}

/// Tracks which instances have not yet finished their jobs.
///
/// The active set is seeded with every instance id in the manifest and only
/// ever shrinks: once an instance's record reports all tasks finished, the
/// id is removed and never polled again, even if a later (stale) read would
/// say otherwise.
pub struct CompletionBarrier<'a> {
    manifest: &'a Manifest,
    active: Vec<u32>,
}

impl<'a> CompletionBarrier<'a> {
    /// Seed the barrier with every job in the manifest.
    #[must_use]
    pub fn new(manifest: &'a Manifest) -> Self {
        Self {
            manifest,
            active: manifest.jobs.iter().map(|job| job.instance_id).collect(),
        }
    }

    /// Instances still being waited on.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.active.len()
    }

    /// Whether every instance has finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.active.is_empty()
    }

    /// Sweep the still-active instances once.
    ///
    /// Reads each active instance's status record; instances reporting all
    /// tasks finished leave the active set, and the names of their
    /// `AWSToLocal` documents are returned as newly available.
    ///
    /// # Errors
    ///
    /// Returns an error if a read fails or an active instance has no status
    /// record at all — records are seeded at publish time, so a missing one
    /// means the store or key prefix is wrong, and polling forever would
    /// never terminate.
    pub async fn poll_once(&mut self, statuses: &impl StatusStore) -> Result<PollOutcome> {
        let prefix = self.manifest.key_prefix.as_str();
        let mut newly_available = Vec::new();
        let mut still_active = Vec::with_capacity(self.active.len());

        for &instance_id in &self.active {
            let record = statuses
                .read(prefix, instance_id)
                .await?
                .with_context(|| {
                    format!(
                        "No status record for instance {instance_id} under '{prefix}'. \
Was the manifest published to this bucket?"
                    )
                })?;

            if record.all_tasks_finished() {
                let job = self.manifest.job(instance_id)?;
                for doc in self.manifest.documents_for(job)? {
                    if doc.direction.is_uploaded() {
                        newly_available.push(doc.name.clone());
                    }
                }
            } else {
                still_active.push(instance_id);
            }
        }

        self.active = still_active;
        Ok(PollOutcome {
            newly_available,
            remaining: self.active.len(),
        })
    }

    /// Block until every instance has finished, sweeping at `interval`.
    ///
    /// Returns the names of all result documents collected across passes,
    /// in the order their instances finished. Timeout policy belongs to the
    /// caller; this loops until the fleet is done or a sweep fails.
    ///
    /// # Errors
    ///
    /// Propagates the first [`poll_once`](Self::poll_once) failure.
    pub async fn wait_all(
        &mut self,
        statuses: &impl StatusStore,
        reporter: &impl ProgressReporter,
        interval: Duration,
    ) -> Result<Vec<String>> {
        let mut available = Vec::new();

        loop {
            let outcome = self.poll_once(statuses).await?;
            for name in &outcome.newly_available {
                reporter.success(&format!("Result document '{name}' is ready"));
            }
            available.extend(outcome.newly_available);

            if outcome.remaining == 0 {
                return Ok(available);
            }
            let plural = if outcome.remaining == 1 { "" } else { "s" };
            reporter.step(&format!("{} instance{plural} still working", outcome.remaining));
            tokio::time::sleep(interval).await;
        }
    }
}
