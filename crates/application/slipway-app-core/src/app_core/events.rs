use std::time::Duration;

use camino::Utf8PathBuf;

use crate::domain::AppSettings;

pub type BuildRunId = uuid::Uuid;

#[derive(Debug, Clone)]
pub enum BuildRunEvent {
    Started,

    // Streamed script output
    OutputLine(String),
    ErrorLine(String),

    // Build terminal states
    BuildSucceeded { elapsed: Duration, copying: bool },
    BuildTimedOut { elapsed: Duration },
    BuildFailed { message: String },

    // Copy stage
    CopyStarted,
    CopyScanned { bin_dirs: usize, files: usize },
    CopyingFile { from: Utf8PathBuf, to: Utf8PathBuf },
    CopySucceeded { files: usize },
    CopyFailed { message: String },
}

#[derive(Debug, Clone)]
pub enum DomainEvent {
    SettingsLoaded(AppSettings),

    BuildEvent {
        run_id: BuildRunId,
        ev: BuildRunEvent,
    },

    // User-visible errors
    UserError(String),
}
