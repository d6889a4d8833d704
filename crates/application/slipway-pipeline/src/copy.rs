//! Artifact copy pass.
//!
//! Validates the destination, discovers matching files under the source
//! tree's `bin` directories, and copies each one flattened (base name only)
//! into the destination, overwriting existing files. The first copy error
//! aborts the remaining pass; files copied before it stay in place.

use std::fs;

use camino::Utf8PathBuf;
use tracing::{info, warn};

use slipway_core::{CopiedFile, CopyRequest, CopyResult};
use slipway_scanner::{scan, ScanSummary};

/// Progress callbacks surfaced to the consumer's log while a copy pass
/// runs. `Copying` is emitted before the attempt, so a failing file still
/// gets its from/to line pair, matching the logged-pair contract.
#[derive(Debug, Clone)]
pub enum CopyEvent {
    Starting { summary: ScanSummary },
    Copying { from: Utf8PathBuf, to: Utf8PathBuf },
}

pub fn run_copy(req: &CopyRequest, mut on_event: impl FnMut(CopyEvent)) -> CopyResult {
    match fs::metadata(req.destination_dir.as_std_path()) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            warn!(dest = %req.destination_dir, "Destination path is not a directory");
            return CopyResult::failure(
                Vec::new(),
                "Destination path is not a valid directory",
            );
        }
        Err(_) => {
            warn!(dest = %req.destination_dir, "Destination path does not exist");
            return CopyResult::failure(
                Vec::new(),
                "Destination path is not a valid directory",
            );
        }
    }

    let (files, summary) = match scan(&req.source_root, &req.patterns) {
        Ok(v) => v,
        Err(e) => return CopyResult::failure(Vec::new(), e.to_string()),
    };

    info!(
        bin_dirs = summary.bin_dirs,
        files = summary.files_matched,
        "Starting artifact copy"
    );
    on_event(CopyEvent::Starting { summary });

    let mut copied = Vec::new();
    for from in files {
        let Some(name) = from.file_name() else {
            continue;
        };
        let to = req.destination_dir.join(name);

        on_event(CopyEvent::Copying {
            from: from.clone(),
            to: to.clone(),
        });

        if let Err(e) = fs::copy(from.as_std_path(), to.as_std_path()) {
            warn!(file = %from, "Copy aborted: {e}");
            return CopyResult::failure(copied, e.to_string());
        }
        copied.push(CopiedFile { from, to });
    }

    CopyResult::success(copied)
}
