use std::path::Path;

use tracing::{debug, info, warn};

use crate::backup::{backup, BackupOutcome};
use crate::config::ClassConfig;
use crate::discover::{discover, expand_vars};
use crate::errors::Result;
use crate::store::DatasetStore;
use crate::units::UnitsFixer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileOutcome {
    /// The extended dataset replaced the input file
    Written,

    /// The input file couldn't be backed up, so nothing was written
    Skipped,
}

/// Counts of what happened to the files of one input class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Extend a single file in place.
///
/// The file is read, extended, optionally verified, moved to `old_<name>` and then replaced by
/// the extended dataset. A verification failure is an error and nothing is written. A failed
/// backup only skips this file.
///
pub fn process_file<S, U>(
    path: &Path,
    class: &ClassConfig,
    store: &S,
    fixer: &U,
) -> Result<FileOutcome>
where
    S: DatasetStore + ?Sized,
    U: UnitsFixer + ?Sized,
{
    let options = class.extend_options()?;
    let dataset = store.open(path, options.decode_times)?;
    let extended = gridext::extend(&dataset, &options)?;
    debug!(
        file = %path.display(),
        before = ?dataset.dim_len(&options.time_axis),
        after = ?extended.dim_len(&options.time_axis),
        "extended time axis"
    );

    if class.debug {
        gridext::verify(&extended, options.cadence, &options.time_axis)?;
        info!(file = %path.display(), "extension verified");
    }

    let in_dir = expand_vars(&class.in_dir)?;
    match backup(path, &in_dir) {
        BackupOutcome::Succeeded { backup } => {
            debug!(backup = %backup.display(), "input moved aside")
        }
        BackupOutcome::Failed { source } => {
            warn!(file = %path.display(), %source, "renaming failed, not writing new file");
            return Ok(FileOutcome::Skipped);
        }
    }

    store.write(&extended, path)?;
    if let Some(units) = fixer.fix(path, &options.time_axis)? {
        debug!(file = %path.display(), %units, "time units fixed");
    }
    info!(file = %path.display(), "written");

    Ok(FileOutcome::Written)
}

/// Extend every file of the input class `name`.
///
pub fn process_class<S, U>(
    name: &str,
    class: &ClassConfig,
    store: &S,
    fixer: &U,
) -> Result<ClassSummary>
where
    S: DatasetStore + ?Sized,
    U: UnitsFixer + ?Sized,
{
    info!(class = name, "processing input class");
    let mut summary = ClassSummary::default();
    for file in discover(name, &class.in_dir)? {
        match process_file(&file, class, store, fixer)? {
            FileOutcome::Written => summary.written += 1,
            FileOutcome::Skipped => summary.skipped += 1,
        }
    }

    Ok(summary)
}
