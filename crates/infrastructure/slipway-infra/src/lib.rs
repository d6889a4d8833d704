pub mod runner;

// Re-exports for convenience
pub use runner::{terminate, RunnerError, RunningBuild, ScriptHost};
