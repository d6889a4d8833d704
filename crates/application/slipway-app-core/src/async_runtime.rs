//! Process-wide tokio runtime for the build worker.
//!
//! The worker is a plain named thread that `block_on`s the run's stage
//! future here. Creation happens once; a runtime that failed to start is
//! remembered so every later trigger reports the same error instead of
//! retrying the init.

use anyhow::Result;
use std::sync::OnceLock;

static RUNTIME: OnceLock<std::result::Result<tokio::runtime::Runtime, String>> = OnceLock::new();

pub(crate) fn runtime() -> Result<&'static tokio::runtime::Runtime> {
    match RUNTIME.get_or_init(|| tokio::runtime::Runtime::new().map_err(|e| e.to_string())) {
        Ok(rt) => Ok(rt),
        Err(message) => Err(anyhow::anyhow!(message.clone())),
    }
}
