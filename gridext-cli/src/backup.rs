use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Result of moving an input file out of the way before it is overwritten.
#[derive(Debug)]
pub enum BackupOutcome {
    Succeeded { backup: PathBuf },
    Failed { source: io::Error },
}

impl BackupOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Rename `file` to `old_<file name>` inside `in_dir`.
///
/// Failure is reported in the outcome rather than as an error, so the caller can decide to
/// skip the file and carry on.
///
pub fn backup<P: AsRef<Path>, Q: AsRef<Path>>(file: P, in_dir: Q) -> BackupOutcome {
    let file = file.as_ref();
    let name = match file.file_name() {
        Some(name) => name.to_string_lossy(),
        None => {
            return BackupOutcome::Failed {
                source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
            }
        }
    };
    let backup = in_dir.as_ref().join(format!("old_{}", name));

    match fs::rename(file, &backup) {
        Ok(()) => {
            debug!(file = %file.display(), backup = %backup.display(), "backed up input");
            BackupOutcome::Succeeded { backup }
        }
        Err(source) => {
            warn!(file = %file.display(), %source, "backup failed");
            BackupOutcome::Failed { source }
        }
    }
}
