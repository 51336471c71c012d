pub mod archive;
pub mod keys;
pub mod manifest;
pub mod status;

pub use archive::{ARCHIVE_EXT, ArchiveEnvelope, ENVELOPE_ENTRY, PAYLOAD_ROOT};
pub use keys::{document_key, instance_log_file_name, log_key, sanitize_artifact_name, status_key};
pub use manifest::{CommandSpec, Direction, DocumentSpec, Job, Manifest, ManifestError};
pub use status::{InstanceStatus, TaskTotals};
