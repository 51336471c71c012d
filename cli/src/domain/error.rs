//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Archive errors ────────────────────────────────────────────────────────────

/// Errors raised while packing or unpacking document artifacts.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot archive '{path}': not a file or directory.")]
    UnsupportedSource { path: String },

    #[error("Archive has no envelope entry; refusing to unpack.")]
    MissingEnvelope,

    #[error("Archive envelope is not valid JSON: {0}")]
    UnreadableEnvelope(String),

    #[error("Archive entry '{entry}' is outside the payload root.")]
    ForeignEntry { entry: String },

    #[error("Archive entry '{entry}' escapes the extraction directory.")]
    UnsafePath { entry: String },

    #[error("Single-file archive holds {count} payload files, expected exactly 1.")]
    PayloadMismatch { count: usize },
}

// ── Command errors ────────────────────────────────────────────────────────────

/// Errors raised when a manifest command runs but does not succeed.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Command '{command_line}' failed with {status}.\n{output}")]
    Failed {
        command_line: String,
        status: String,
        output: String,
    },
}
