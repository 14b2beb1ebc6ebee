use std::path::Path;

use gridext::Dataset;

use crate::errors::Result;

/// Where datasets are read from and written back to.
pub trait DatasetStore {
    /// Read the whole dataset at `path` into memory. With `decode_times`, variables with CF
    /// time units are decoded to dates.
    fn open(&self, path: &Path, decode_times: bool) -> Result<Dataset>;

    /// Write `dataset` to `path`, replacing anything already there.
    fn write(&self, dataset: &Dataset, path: &Path) -> Result<()>;
}
