//! Archival codec — `.tar.gz` document artifacts with a typed envelope.
//!
//! Every artifact starts with an `envelope.json` entry describing what the
//! payload is (a directory tree or a single file), followed by the payload
//! under `payload/`. Synchronous functions; async callers bridge through
//! `tokio::task::spawn_blocking`.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flotilla_common::{ArchiveEnvelope, ENVELOPE_ENTRY, PAYLOAD_ROOT};

use crate::domain::ArchiveError;

/// Archive the file or directory at `src` into a `.tar.gz` at `dest`.
///
/// Directories are packed recursively, empty subdirectories included. A
/// single file is packed as `payload/<file name>` with its original name
/// recorded in the envelope.
///
/// # Errors
///
/// Returns [`ArchiveError::UnsupportedSource`] if `src` is neither a file
/// nor a directory, or an I/O error from writing `dest`.
pub fn pack(src: &Path, dest: &Path) -> Result<ArchiveEnvelope> {
    let envelope = if src.is_dir() {
        ArchiveEnvelope::Directory
    } else if src.is_file() {
        let original_name = src
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ArchiveError::UnsupportedSource {
                path: src.display().to_string(),
            })?;
        ArchiveEnvelope::SingleFile { original_name }
    } else {
        return Err(ArchiveError::UnsupportedSource {
            path: src.display().to_string(),
        }
        .into());
    };

    let file =
        File::create(dest).with_context(|| format!("creating archive {}", dest.display()))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    append_envelope(&mut builder, &envelope)?;
    match &envelope {
        ArchiveEnvelope::Directory => {
            builder
                .append_dir_all(PAYLOAD_ROOT, src)
                .with_context(|| format!("archiving directory {}", src.display()))?;
        }
        ArchiveEnvelope::SingleFile { original_name } => {
            let mut payload =
                File::open(src).with_context(|| format!("opening {}", src.display()))?;
            builder
                .append_file(Path::new(PAYLOAD_ROOT).join(original_name), &mut payload)
                .with_context(|| format!("archiving file {}", src.display()))?;
        }
    }

    let encoder = builder.into_inner().context("finalizing archive")?;
    encoder.finish().context("compressing archive")?;
    Ok(envelope)
}

/// Extract the `.tar.gz` at `archive` to `dest`.
///
/// A `Directory` payload is extracted rooted at `dest` (created if absent).
/// A `SingleFile` payload lands at exactly `dest` — the full file path, not
/// a directory — regardless of the name it was archived under. The envelope
/// entry never touches the disk.
///
/// # Errors
///
/// Returns the corrupt-artifact [`ArchiveError`] variants when the envelope
/// is missing or unreadable, an entry sits outside `payload/` or contains
/// traversal components, or a single-file payload does not hold exactly one
/// file.
pub fn unpack(archive: &Path, dest: &Path) -> Result<ArchiveEnvelope> {
    let file =
        File::open(archive).with_context(|| format!("opening archive {}", archive.display()))?;
    let mut reader = tar::Archive::new(GzDecoder::new(file));
    let mut entries = reader
        .entries()
        .with_context(|| format!("reading archive {}", archive.display()))?;

    let Some(first) = entries.next() else {
        return Err(ArchiveError::MissingEnvelope.into());
    };
    let mut first = first.context("reading archive entry")?;
    if first.path().context("reading entry path")?.as_ref() != Path::new(ENVELOPE_ENTRY) {
        return Err(ArchiveError::MissingEnvelope.into());
    }
    let mut envelope_bytes = Vec::new();
    first
        .read_to_end(&mut envelope_bytes)
        .context("reading archive envelope")?;
    let envelope = ArchiveEnvelope::from_slice(&envelope_bytes)
        .map_err(|err| ArchiveError::UnreadableEnvelope(err.to_string()))?;

    match &envelope {
        ArchiveEnvelope::Directory => {
            std::fs::create_dir_all(dest)
                .with_context(|| format!("creating {}", dest.display()))?;
            for entry in entries {
                let mut entry = entry.context("reading archive entry")?;
                let path = entry.path().context("reading entry path")?.into_owned();
                let rel = payload_relative(&path)?;
                if rel.as_os_str().is_empty() {
                    continue;
                }
                let target = dest.join(&rel);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
                entry
                    .unpack(&target)
                    .with_context(|| format!("extracting {}", target.display()))?;
            }
        }
        ArchiveEnvelope::SingleFile { .. } => {
            let mut payload_files = 0usize;
            for entry in entries {
                let mut entry = entry.context("reading archive entry")?;
                let path = entry.path().context("reading entry path")?.into_owned();
                let rel = payload_relative(&path)?;
                if rel.as_os_str().is_empty() || entry.header().entry_type().is_dir() {
                    continue;
                }
                payload_files += 1;
                if payload_files == 1 {
                    if let Some(parent) = dest.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("creating {}", parent.display()))?;
                    }
                    entry
                        .unpack(dest)
                        .with_context(|| format!("extracting {}", dest.display()))?;
                }
            }
            if payload_files != 1 {
                return Err(ArchiveError::PayloadMismatch {
                    count: payload_files,
                }
                .into());
            }
        }
    }

    Ok(envelope)
}

/// Write the envelope as the archive's first entry.
fn append_envelope<W: Write>(
    builder: &mut tar::Builder<W>,
    envelope: &ArchiveEnvelope,
) -> Result<()> {
    let bytes = envelope.to_bytes().context("serializing envelope")?;
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, ENVELOPE_ENTRY, bytes.as_slice())
        .context("writing envelope entry")
}

/// Strip the payload root from an entry path, rejecting entries that live
/// outside it or try to traverse out of the extraction directory.
fn payload_relative(entry_path: &Path) -> Result<PathBuf, ArchiveError> {
    let mut components = entry_path.components();
    match components.next() {
        Some(Component::Normal(root)) if root == PAYLOAD_ROOT => {}
        _ => {
            return Err(ArchiveError::ForeignEntry {
                entry: entry_path.display().to_string(),
            });
        }
    }

    let mut rel = PathBuf::new();
    for component in components {
        match component {
            Component::Normal(part) => rel.push(part),
            Component::CurDir => {}
            _ => {
                return Err(ArchiveError::UnsafePath {
                    entry: entry_path.display().to_string(),
                });
            }
        }
    }
    Ok(rel)
}
