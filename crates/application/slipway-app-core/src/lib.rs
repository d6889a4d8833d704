pub mod app_core;
mod async_runtime;
pub mod domain;
pub mod kernel;
pub mod orchestrator;
pub mod persistence;
pub mod ports;

pub use app_core::*;
pub use domain::{AppSettings, AppState, LogKind, LogLine, Phase};
pub use kernel::AppKernel;
pub use orchestrator::{BuildOrchestrator, CopyPlan};
pub use persistence::FilePersistence;
pub use ports::*;
