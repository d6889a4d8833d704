//! Central configuration constants for runtime limits and defaults.

/// Default build execution timeout in seconds.
pub const DEFAULT_EXECUTION_TIMEOUT_SECS: u64 = 300;

/// Minimum allowed build execution timeout in seconds.
pub const MIN_EXECUTION_TIMEOUT_SECS: u64 = 1;

/// Maximum allowed build execution timeout in seconds. 2 hours.
pub const MAX_EXECUTION_TIMEOUT_SECS: u64 = 2 * 60 * 60;

/// Delimiter between extension patterns in a single user-supplied string.
pub const EXTENSION_PATTERN_DELIMITER: char = ';';

/// Default extension pattern string for artifact copying.
pub const DEFAULT_EXTENSION_PATTERNS: &str = "*.dll;*.exe";

/// Directory name treated as a build output location during discovery.
pub const BIN_DIR_NAME: &str = "bin";

/// Capacity of the worker-to-consumer event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Convenience function to clamp a timeout value into allowed range.
pub fn clamp_timeout_secs(v: u64) -> u64 {
    v.clamp(MIN_EXECUTION_TIMEOUT_SECS, MAX_EXECUTION_TIMEOUT_SECS)
}
