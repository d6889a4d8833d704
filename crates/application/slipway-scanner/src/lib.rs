//! Build artifact discovery.
//!
//! Walks the solution's directory tree for directories literally named
//! `bin`, then collects files under each of them whose *file name* matches
//! one of the user's glob patterns. Ordering is bin directory outer,
//! pattern inner, sorted traversal innermost. Duplicate matches (one file
//! hit by several patterns or nested bin directories) are preserved.

use camino::{Utf8Path, Utf8PathBuf};
use globset::Glob;
use slipway_config::BIN_DIR_NAME;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("IO error while walking {path}: {source}")]
    Walk {
        path: Utf8PathBuf,
        source: walkdir::Error,
    },
    #[error("Invalid extension pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        source: globset::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub bin_dirs: usize,
    pub files_matched: usize,
}

/// Recursively find every directory named `bin` under `root`.
/// Case-sensitivity follows the host filesystem; traversal is sorted by
/// file name so discovery order is deterministic.
pub fn find_bin_dirs(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ScannerError> {
    let mut bin_dirs = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| ScannerError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name() != BIN_DIR_NAME {
            continue;
        }
        match Utf8PathBuf::from_path_buf(entry.path().to_path_buf()) {
            Ok(p) => bin_dirs.push(p),
            Err(p) => warn!("Skipping non-unicode bin directory {}", p.display()),
        }
    }

    debug!(root = %root, count = bin_dirs.len(), "bin directory discovery complete");
    Ok(bin_dirs)
}

/// Collect every file under the given bin directories whose file name
/// matches one of `patterns`. Empty pattern segments compile to a glob
/// matching nothing and so contribute no files.
pub fn collect_artifacts(
    bin_dirs: &[Utf8PathBuf],
    patterns: &[String],
) -> Result<Vec<Utf8PathBuf>, ScannerError> {
    let mut matchers = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ScannerError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        matchers.push(glob.compile_matcher());
    }

    let mut files = Vec::new();
    for bin in bin_dirs {
        for matcher in &matchers {
            for entry in WalkDir::new(bin).sort_by_file_name() {
                let entry = entry.map_err(|source| ScannerError::Walk {
                    path: bin.clone(),
                    source,
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if !matcher.is_match(entry.file_name()) {
                    continue;
                }
                match Utf8PathBuf::from_path_buf(entry.path().to_path_buf()) {
                    Ok(p) => files.push(p),
                    Err(p) => warn!("Skipping non-unicode artifact {}", p.display()),
                }
            }
        }
    }

    Ok(files)
}

/// Convenience wrapper: discover bin dirs under `root` and collect all
/// matching artifacts in one pass, returning a summary for logging.
pub fn scan(
    root: &Utf8Path,
    patterns: &[String],
) -> Result<(Vec<Utf8PathBuf>, ScanSummary), ScannerError> {
    let bin_dirs = find_bin_dirs(root)?;
    let files = collect_artifacts(&bin_dirs, patterns)?;
    let summary = ScanSummary {
        bin_dirs: bin_dirs.len(),
        files_matched: files.len(),
    };
    Ok((files, summary))
}
