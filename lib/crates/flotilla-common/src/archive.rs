//! Artifact format metadata.
//!
//! Every document travels as a gzipped tar with two disjoint namespaces:
//! an `envelope.json` entry describing what the archive holds, and a
//! `payload/` subtree holding the content itself. User files can never
//! collide with the envelope because content only ever lives under
//! `payload/`.

use serde::{Deserialize, Serialize};

/// Name of the metadata entry present in every artifact.
pub const ENVELOPE_ENTRY: &str = "envelope.json";

/// Root prefix of every content entry.
pub const PAYLOAD_ROOT: &str = "payload";

/// Extension carried by every artifact key and staging file.
pub const ARCHIVE_EXT: &str = "tar.gz";

/// Self-description of an artifact: a packed directory tree, or exactly
/// one file.
///
/// The distinction survives the round trip, so extraction restores a
/// single file as a file and a directory as a directory without guessing
/// from the entry list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArchiveEnvelope {
    /// The payload subtree mirrors a directory; extraction recreates it
    /// under the destination path.
    Directory,
    /// The payload holds one file named `original_name`; extraction writes
    /// it to exactly the destination path, whatever that path's file name.
    SingleFile { original_name: String },
}

impl ArchiveEnvelope {
    /// Encode for the `envelope.json` entry.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Decode an `envelope.json` entry.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
