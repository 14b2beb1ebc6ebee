use std::result;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cadence must be monthly or annual, got {0:?}")]
    InvalidCadence(String),

    #[error("no coordinate name contains {0:?}")]
    TimeAxisNotFound(String),

    #[error("more than one coordinate matches {pattern:?}: {candidates:?}")]
    AmbiguousTimeAxis {
        pattern: String,
        candidates: Vec<String>,
    },

    #[error("reporting period needs {needed} time steps but only {available} are available")]
    PeriodOutOfRange { needed: usize, available: usize },

    #[error("last period of {variable:?} differs from its source (max {max}, min {min})")]
    VerificationFailure {
        variable: String,
        max: f64,
        min: f64,
    },

    #[error("invalid date {year:04}-{month:02}-{day:02} in {calendar} calendar")]
    InvalidDate {
        year: i32,
        month: u32,
        day: u32,
        calendar: &'static str,
    },

    #[error("cannot shift undecoded times of {0:?} by whole years at monthly cadence")]
    UndecodedTimeShift(String),

    #[error("time coordinate {name:?} is {actual}, expected {expected}")]
    TimeRepresentation {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("dimension {dim:?} has length {expected} but {variable:?} has length {actual}")]
    ShapeMismatch {
        variable: String,
        dim: String,
        expected: usize,
        actual: usize,
    },

    #[error("cannot combine {left} values with {right} values")]
    DtypeMismatch {
        left: &'static str,
        right: &'static str,
    },

    #[error("no variable named {0:?}")]
    BadName(String),

    #[error("cannot parse time units {0:?}")]
    InvalidTimeUnits(String),

    #[error("unknown calendar {0:?}")]
    UnknownCalendar(String),

    #[error("time value {0} is outside the supported date range")]
    DateOutOfRange(f64),

    #[error("years to append must be at least 1")]
    NothingToAppend,

    #[error("shifting {value} by {amount} overflows")]
    ShiftOverflow { value: String, amount: i64 },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = result::Result<T, Error>;
