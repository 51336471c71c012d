//! Object-store key construction.
//!
//! Keys are POSIX-style strings namespaced under the manifest's key prefix.
//! Every layout decision lives here so instances and orchestrators cannot
//! drift apart on where artifacts land.

use crate::archive::ARCHIVE_EXT;

/// Key of a document artifact.
/// Format: {prefix}/{name}.tar.gz
#[must_use]
pub fn document_key(prefix: &str, name: &str) -> String {
    format!("{prefix}/{name}.{ARCHIVE_EXT}")
}

/// Key of one instance's status record.
/// Format: {prefix}/status/instance-{id}.json
/// Value: JSON-serialized InstanceStatus
#[must_use]
pub fn status_key(prefix: &str, instance_id: u32) -> String {
    format!("{prefix}/status/instance-{instance_id}.json")
}

/// Key of one instance's uploaded log.
/// Format: {prefix}/logs/instance-{id}.log
#[must_use]
pub fn log_key(prefix: &str, instance_id: u32) -> String {
    format!("{prefix}/logs/{}", instance_log_file_name(instance_id))
}

/// File name of the instance log inside the local working directory; the
/// same name is reused as the final path segment of [`log_key`].
#[must_use]
pub fn instance_log_file_name(instance_id: u32) -> String {
    format!("instance-{instance_id}.log")
}

/// Flatten a document name into something usable as one local file name.
///
/// Document names may themselves look like nested keys ("results/day1"),
/// but staged artifacts sit in a flat scratch directory.
#[must_use]
pub fn sanitize_artifact_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}
