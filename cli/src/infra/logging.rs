//! Instance-side logging — tracing to a shippable log file plus stderr.
//!
//! Only the bootstrap command installs a subscriber; orchestrator commands
//! speak through the output layer and never touch global logging state. The
//! log file is the artifact `ObjectStatusStore` ships with every status
//! publish, so everything logged here becomes visible in the store.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use flotilla_common::keys::instance_log_file_name;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::ports::ProgressReporter;

/// Handle to the installed subscriber's log file.
pub struct LogContext {
    path: PathBuf,
}

impl LogContext {
    /// Install the global subscriber: an env-filtered pair of layers writing
    /// to `{work_dir}/instance-{id}.log` (plain text, truncated per run) and
    /// to stderr.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be created or a global
    /// subscriber is already installed.
    pub fn init(work_dir: &Path, instance_id: u32) -> Result<Self> {
        let path = work_dir.join(instance_log_file_name(instance_id));
        let file = File::create(&path)
            .with_context(|| format!("creating log file {}", path.display()))?;

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|err| anyhow::anyhow!("installing log subscriber: {err}"))?;

        Ok(Self { path })
    }

    /// The log file the subscriber writes to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Progress reporter for headless instances: events go to the tracing
/// subscriber, which lands them in the shipped log file and on stderr.
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn step(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn success(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}
