use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manifest::{Job, Manifest, ManifestError};

/// Expected task counts for one job, fixed at manifest-read time.
///
/// Downloads count every document the instance pulls (`LocalToAWS` and
/// `Static`); uploads count `AWSToLocal` documents only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskTotals {
    pub downloads: u32,
    pub commands: u32,
    pub uploads: u32,
}

/// Progress record one instance publishes to the object store.
///
/// # Ownership
///
/// Exactly one writer — the instance named by `instance_id` — ever updates
/// this record after bootstrap begins. Orchestrators only read it.
/// Last-writer-wins on the store is therefore a total order of one
/// instance's own writes, not a race.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceStatus {
    pub instance_id: u32,
    /// Human-readable description of what the instance is doing right now.
    pub message: String,
    pub downloads_finished: u32,
    pub commands_finished: u32,
    pub uploads_finished: u32,
    pub totals: TaskTotals,
    pub updated_at: DateTime<Utc>,
}

impl InstanceStatus {
    /// Build the initial record for a job, with totals derived from the
    /// manifest and all progress counters at zero.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::DocumentLookup`] when the job names a
    /// document the manifest does not define.
    pub fn for_job(manifest: &Manifest, job: &Job) -> Result<Self, ManifestError> {
        let docs = manifest.documents_for(job)?;
        let downloads = docs.iter().filter(|doc| doc.direction.is_downloaded()).count();
        let uploads = docs.iter().filter(|doc| doc.direction.is_uploaded()).count();
        Ok(Self {
            instance_id: job.instance_id,
            message: "initialized".to_string(),
            downloads_finished: 0,
            commands_finished: 0,
            uploads_finished: 0,
            totals: TaskTotals {
                downloads: u32::try_from(downloads).unwrap_or(u32::MAX),
                commands: u32::try_from(job.commands.len()).unwrap_or(u32::MAX),
                uploads: u32::try_from(uploads).unwrap_or(u32::MAX),
            },
            updated_at: Utc::now(),
        })
    }

    /// Replace the activity message and refresh the timestamp.
    pub fn update_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.touch();
    }

    /// Count one finished download. Counters only ever increment.
    pub fn record_download(&mut self) {
        self.downloads_finished += 1;
        self.touch();
    }

    /// Count one finished command.
    pub fn record_command(&mut self) {
        self.commands_finished += 1;
        self.touch();
    }

    /// Count one finished upload.
    pub fn record_upload(&mut self) {
        self.uploads_finished += 1;
        self.touch();
    }

    /// Whether every expected download, command, and upload has counted.
    #[must_use]
    pub fn all_tasks_finished(&self) -> bool {
        self.downloads_finished >= self.totals.downloads
            && self.commands_finished >= self.totals.commands
            && self.uploads_finished >= self.totals.uploads
    }

    /// Serialize for publication, pretty-printed so the record stays
    /// readable when pulled straight out of the store.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Parse a record previously written with [`InstanceStatus::to_bytes`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
