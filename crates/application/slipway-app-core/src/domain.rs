use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slipway_core::BuildStatus;

fn default_extension_patterns() -> String {
    slipway_config::DEFAULT_EXTENSION_PATTERNS.to_string()
}

/// Persisted application settings. Covers the script host configuration
/// and the copy-stage defaults applied when a trigger does not override
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub execution_timeout_secs: u64,
    pub script_runner_path: String,
    pub build_script_path: String,
    pub copy_enabled: bool,
    pub destination_dir: String,
    #[serde(default = "default_extension_patterns")]
    pub extension_patterns: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            execution_timeout_secs: slipway_config::DEFAULT_EXECUTION_TIMEOUT_SECS,
            script_runner_path: String::new(),
            build_script_path: String::new(),
            copy_enabled: false,
            destination_dir: String::new(),
            extension_patterns: default_extension_patterns(),
        }
    }
}

impl AppSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(slipway_config::clamp_timeout_secs(
            self.execution_timeout_secs,
        ))
    }
}

/// Build lifecycle phase. A trigger is only accepted while `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Building,
    Copying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Info,
    Error,
}

/// One line of the append-only output panel.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub at: DateTime<Utc>,
    pub kind: LogKind,
    pub text: String,
}

impl LogLine {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            kind: LogKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            kind: LogKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: AppSettings,
    pub phase: Phase,
    pub run_id: Option<crate::app_core::BuildRunId>,
    pub log: Vec<LogLine>,
    pub last_status: Option<BuildStatus>,
    pub last_copy_succeeded: Option<bool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            settings: AppSettings::default(),
            phase: Phase::Idle,
            run_id: None,
            log: Vec::new(),
            last_status: None,
            last_copy_succeeded: None,
        }
    }
}

impl AppState {
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }
}
