use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

pub mod patterns;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Solution path must not be empty")]
    EmptySolutionPath,
    #[error("Timeout must be a positive duration")]
    ZeroTimeout,
    #[error("Destination directory must not be empty")]
    EmptyDestination,
}

/// One build trigger. Immutable once created; a fresh request is built for
/// every trigger, nothing is reused across invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub solution_path: Utf8PathBuf,
    pub script_runner_path: Utf8PathBuf,
    pub build_script_path: Utf8PathBuf,
    pub timeout: Duration,
}

impl BuildRequest {
    pub fn new(
        solution_path: impl Into<Utf8PathBuf>,
        script_runner_path: impl Into<Utf8PathBuf>,
        build_script_path: impl Into<Utf8PathBuf>,
        timeout: Duration,
    ) -> Result<Self, RequestError> {
        let solution_path = solution_path.into();
        if solution_path.as_str().trim().is_empty() {
            return Err(RequestError::EmptySolutionPath);
        }
        if timeout.is_zero() {
            return Err(RequestError::ZeroTimeout);
        }
        Ok(Self {
            solution_path,
            script_runner_path: script_runner_path.into(),
            build_script_path: build_script_path.into(),
            timeout,
        })
    }

    /// Root of the artifact scan: the directory containing the solution file.
    pub fn source_root(&self) -> Utf8PathBuf {
        self.solution_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| Utf8PathBuf::from("."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildStatus {
    Success,
    TimedOut,
    Failed(String),
}

impl BuildStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success)
    }
}

/// Result of one build run, consumed by the log and by the decision of
/// whether to proceed to the copy stage.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub status: BuildStatus,
    pub elapsed: Duration,
    pub output_lines: Vec<String>,
    pub error_lines: Vec<String>,
}

/// One copy pass over the solution's directory tree. Only constructed when
/// copying is enabled and the destination is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    pub source_root: Utf8PathBuf,
    pub destination_dir: Utf8PathBuf,
    pub patterns: Vec<String>,
}

impl CopyRequest {
    pub fn new(
        source_root: impl Into<Utf8PathBuf>,
        destination_dir: impl Into<Utf8PathBuf>,
        patterns: Vec<String>,
    ) -> Result<Self, RequestError> {
        let destination_dir = destination_dir.into();
        if destination_dir.as_str().trim().is_empty() {
            return Err(RequestError::EmptyDestination);
        }
        Ok(Self {
            source_root: source_root.into(),
            destination_dir,
            patterns,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedFile {
    pub from: Utf8PathBuf,
    pub to: Utf8PathBuf,
}

#[derive(Debug, Clone)]
pub struct CopyResult {
    pub copied: Vec<CopiedFile>,
    pub succeeded: bool,
    pub failure_reason: Option<String>,
}

impl CopyResult {
    pub fn success(copied: Vec<CopiedFile>) -> Self {
        Self {
            copied,
            succeeded: true,
            failure_reason: None,
        }
    }

    pub fn failure(copied: Vec<CopiedFile>, reason: impl Into<String>) -> Self {
        Self {
            copied,
            succeeded: false,
            failure_reason: Some(reason.into()),
        }
    }
}
