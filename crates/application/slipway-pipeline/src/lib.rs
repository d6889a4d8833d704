pub mod build;
pub mod copy;

// Re-export engine components
pub use build::{BuildError, BuildSupervisor, RunnerEvent};
pub use copy::{run_copy, CopyEvent};

// Re-export scanner types often needed by consumers
pub use slipway_scanner::ScanSummary;
