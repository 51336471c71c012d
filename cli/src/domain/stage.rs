//! Bootstrap lifecycle stages and their status messages.
//!
//! This module is intentionally free of I/O, async, and external layer imports.
//! All functions take data in and return data out.

/// Lifecycle stage of a bootstrap run on one instance.
///
/// Stages advance linearly from `Initialized` to `Completed`. `Failed` is
/// absorbing: any error moves the run there and it never leaves. The stage
/// itself is not persisted; its [`message`](BootstrapStage::message) is what
/// lands in the published status record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    /// Manifest parsed, status record created, nothing transferred yet.
    Initialized,
    /// Pulling required documents from the store.
    Downloading,
    /// Every required document is on local disk.
    Downloaded,
    /// Executing manifest commands.
    Running,
    /// Every command exited successfully.
    Commanded,
    /// Pushing produced documents back to the store.
    Uploading,
    /// All downloads, commands, and uploads finished.
    Completed,
    /// An error occurred; the run will not continue.
    Failed,
}

impl BootstrapStage {
    /// The stage that follows this one on the happy path.
    ///
    /// Terminal stages return themselves.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Initialized => Self::Downloading,
            Self::Downloading => Self::Downloaded,
            Self::Downloaded => Self::Running,
            Self::Running => Self::Commanded,
            Self::Commanded => Self::Uploading,
            Self::Uploading => Self::Completed,
            Self::Completed => Self::Completed,
            Self::Failed => Self::Failed,
        }
    }

    /// Status message published when the run enters this stage.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Downloading => "downloading documents",
            Self::Downloaded => "documents downloaded",
            Self::Running => "running commands",
            Self::Commanded => "commands finished",
            Self::Uploading => "uploading documents",
            Self::Completed => "completed all tasks",
            Self::Failed => "failed",
        }
    }

    /// Whether the run can make no further progress from this stage.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}
