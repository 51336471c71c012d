//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: object store access,
//! archive packing, process execution, status publication, and logging.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod archive;
pub mod command_runner;
pub mod logging;
pub mod status_store;
pub mod store;
pub mod transfer;

pub use command_runner::TokioCommandRunner;
pub use logging::{LogContext, TracingReporter};
pub use status_store::ObjectStatusStore;
pub use store::{FsObjectStore, HttpObjectStore, StoreClient};
pub use transfer::ArchivingTransfer;
