use std::{fmt, str::FromStr};

use crate::{
    dataset::{Dataset, Variable},
    errors::{Error, Result},
    values::Selection,
};

/// Reporting frequency of a time series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    Monthly,
    Annual,
}

impl Cadence {
    /// Number of time steps in one reporting period
    pub fn period_length(&self) -> usize {
        match self {
            Self::Monthly => 12,
            Self::Annual => 1,
        }
    }

    /// Positions of the reporting period `offset` periods before the end of an axis of length
    /// `len`.
    ///
    fn selection(&self, len: usize, offset: usize) -> Result<Selection> {
        let needed = offset
            .checked_add(1)
            .and_then(|periods| periods.checked_mul(self.period_length()))
            .unwrap_or(usize::MAX);
        if needed > len {
            return Err(Error::PeriodOutOfRange {
                needed,
                available: len,
            });
        }

        let end = len - self.period_length() * offset;
        Ok(match self {
            Self::Monthly => Selection::Range(end - 12..end),
            Self::Annual => Selection::Index(end - 1),
        })
    }
}

impl FromStr for Cadence {
    type Err = Error;

    /// Anything mentioning "monthly" or "annual", eg "monthly_mean", is accepted.
    fn from_str(name: &str) -> Result<Self> {
        if name.contains("monthly") {
            Ok(Self::Monthly)
        } else if name.contains("annual") {
            Ok(Self::Annual)
        } else {
            Err(Error::InvalidCadence(name.to_string()))
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => f.write_str("monthly"),
            Self::Annual => f.write_str("annual"),
        }
    }
}

/// Select the reporting period `offset` periods before the end of the time series.
///
/// The time axis is the coordinate matching `time_axis` (see `Dataset::find_coordinate`).
/// Monthly cadence selects a window of 12 steps and keeps the time dimension. Annual cadence
/// selects a single step and drops it. Selection is by position, so a monthly series has to
/// be made of contiguous months.
///
pub fn select(
    dataset: &Dataset,
    cadence: Cadence,
    offset: usize,
    time_axis: &str,
) -> Result<Dataset> {
    let time = dataset.find_coordinate(time_axis)?;
    let selection = cadence.selection(time.len(), offset)?;

    dataset.isel(&time.name, &selection)
}

/// Same as `select`, for a single data variable.
///
pub fn select_variable(
    dataset: &Dataset,
    variable: &str,
    cadence: Cadence,
    offset: usize,
    time_axis: &str,
) -> Result<Variable> {
    let time = dataset.find_coordinate(time_axis)?;
    let selection = cadence.selection(time.len(), offset)?;

    dataset.variable(variable)?.isel(&time.name, &selection)
}
