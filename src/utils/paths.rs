//! Input and output path resolution
//!
//! Batch schedulers frequently mount datasets as directories rather than
//! files, so both ends of the pipeline accept either form.

use crate::error::{RecalibratorError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix a directory entry must carry to be picked up as the input dataset
pub const DATASET_SUFFIX: &str = ".csv";

/// File name used when the output location is a directory
pub const DEFAULT_OUTPUT_FILE: &str = "adjusted_predictions.csv";

/// Resolve a user-supplied input location to a concrete file.
///
/// A regular path is returned as is (the loader reports it if it cannot be
/// read). A directory is scanned, non-recursively, for the first file whose
/// name ends in [`DATASET_SUFFIX`], in the order the platform lists them.
pub fn resolve_input(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }

    let entries = fs::read_dir(path).map_err(|e| RecalibratorError::load(path, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RecalibratorError::load(path, e))?;
        let name = entry.file_name();
        if !name.to_string_lossy().ends_with(DATASET_SUFFIX) {
            continue;
        }
        if entry.path().is_file() {
            candidates.push(entry.path());
        }
    }

    if candidates.len() > 1 {
        warn!(
            dir = %path.display(),
            count = candidates.len(),
            "Several candidate input files found, using the first one listed"
        );
    }

    let resolved = candidates.into_iter().next().ok_or_else(|| {
        RecalibratorError::MissingInputError {
            dir: path.to_path_buf(),
            suffix: DATASET_SUFFIX.to_string(),
        }
    })?;

    debug!(input = %resolved.display(), "Resolved input file");
    Ok(resolved)
}

/// Resolve a user-supplied output location to a concrete file path.
///
/// Existing directories, and paths spelled with a trailing separator, get
/// [`DEFAULT_OUTPUT_FILE`] appended. Nothing is created here.
pub fn resolve_output(path: &Path) -> PathBuf {
    if path.is_dir() || has_trailing_separator(path) {
        path.join(DEFAULT_OUTPUT_FILE)
    } else {
        path.to_path_buf()
    }
}

/// Create the parent directory chain of `file` if it is missing.
pub fn ensure_parent_dir(file: &Path) -> Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| RecalibratorError::write(parent, e))
        }
        _ => Ok(()),
    }
}

fn has_trailing_separator(path: &Path) -> bool {
    let raw = path.as_os_str().to_string_lossy();
    raw.ends_with('/') || raw.ends_with(std::path::MAIN_SEPARATOR)
}
