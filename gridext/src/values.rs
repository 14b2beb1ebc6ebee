use std::ops::Range;

use ndarray::{concatenate, ArrayD, Axis, ErrorKind, ShapeError, Slice};
use num_traits::{CheckedAdd, ToPrimitive};
use paste::paste;

use crate::{
    errors::{Error, Result},
    time::CfDatetime,
};

/// The contents of a variable: an n-dimensional array of one of the supported element types.
///
#[derive(Clone, Debug, PartialEq)]
pub enum Values {
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),

    /// Decoded calendar dates
    Time(ArrayD<CfDatetime>),
}

/// Position based selection along a single axis.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// A window of consecutive positions. The axis is kept.
    Range(Range<usize>),

    /// A single position. The axis is dropped.
    Index(usize),
}

impl Selection {
    /// One past the last position this selection touches
    fn end(&self) -> usize {
        match self {
            Self::Range(range) => range.end,
            Self::Index(index) => index + 1,
        }
    }
}

/// Apply the same expression to whichever array is inside `$values`, rewrapping the result in
/// the same variant.
///
macro_rules! map_array {
    ($values:expr, $array:ident => $body:expr) => {
        match $values {
            Values::F32($array) => Values::F32($body),
            Values::F64($array) => Values::F64($body),
            Values::I32($array) => Values::I32($body),
            Values::I64($array) => Values::I64($body),
            Values::Time($array) => Values::Time($body),
        }
    };
}

/// Same as `map_array` but for expressions that don't produce an array.
///
macro_rules! with_array {
    ($values:expr, $array:ident => $body:expr) => {
        match $values {
            Values::F32($array) => $body,
            Values::F64($array) => $body,
            Values::I32($array) => $body,
            Values::I64($array) => $body,
            Values::Time($array) => $body,
        }
    };
}

macro_rules! Values {
    ($variant:ident, $type:ty) => {
        paste! {
            impl From<ArrayD<$type>> for Values {
                fn from(array: ArrayD<$type>) -> Self {
                    Self::$variant(array)
                }
            }

            impl Values {
                pub fn [<as_ $variant:lower>](&self) -> Option<&ArrayD<$type>> {
                    match self {
                        Self::$variant(array) => Some(array),
                        _ => None,
                    }
                }
            }
        }
    };
}

Values!(F32, f32);
Values!(F64, f64);
Values!(I32, i32);
Values!(I64, i64);
Values!(Time, CfDatetime);

impl Values {
    /// Name of the element type, for error messages
    pub fn dtype(&self) -> &'static str {
        match self {
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::Time(_) => "datetime",
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_array!(self, array => array.shape())
    }

    pub fn ndim(&self) -> usize {
        with_array!(self, array => array.ndim())
    }

    pub fn len(&self) -> usize {
        with_array!(self, array => array.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_time(&self) -> bool {
        matches!(self, Self::Time(_))
    }

    /// Copy out the part of the array picked by `selection` along `axis`.
    ///
    pub fn isel(&self, axis: usize, selection: &Selection) -> Result<Self> {
        let available = self.shape()[axis];
        if selection.end() > available {
            return Err(Error::PeriodOutOfRange {
                needed: selection.end(),
                available,
            });
        }

        let values = match selection {
            Selection::Range(range) => map_array!(self, array => array
                .slice_axis(Axis(axis), Slice::from(range.clone()))
                .to_owned()),
            Selection::Index(index) => {
                map_array!(self, array => array.index_axis(Axis(axis), *index).to_owned())
            }
        };

        Ok(values)
    }

    /// Add a new axis of length 1 at position `axis`.
    ///
    pub fn insert_axis(self, axis: usize) -> Self {
        map_array!(self, array => array.insert_axis(Axis(axis)))
    }

    /// Join `self` and `others`, in that order, along `axis`.
    ///
    pub fn concatenate(&self, axis: usize, others: &[&Values]) -> Result<Self> {
        macro_rules! join {
            ($variant:ident, $first:expr) => {{
                let mut views = vec![$first.view()];
                for other in others {
                    match other {
                        Values::$variant(array) => views.push(array.view()),
                        _ => {
                            return Err(Error::DtypeMismatch {
                                left: self.dtype(),
                                right: other.dtype(),
                            })
                        }
                    }
                }

                Values::$variant(concatenate(Axis(axis), &views)?)
            }};
        }

        let values = match self {
            Self::F32(array) => join!(F32, array),
            Self::F64(array) => join!(F64, array),
            Self::I32(array) => join!(I32, array),
            Self::I64(array) => join!(I64, array),
            Self::Time(array) => join!(Time, array),
        };

        Ok(values)
    }

    /// Move every date forward by `years` calendar years.
    ///
    pub(crate) fn add_years(&self, years: i32) -> Result<Self> {
        match self {
            Self::Time(array) => {
                let mut shifted = array.clone();
                for date in shifted.iter_mut() {
                    *date = date.add_years(years)?;
                }

                Ok(Self::Time(shifted))
            }
            _ => Err(Error::DtypeMismatch {
                left: "datetime",
                right: self.dtype(),
            }),
        }
    }

    /// Add `amount` to every raw numeric value.
    ///
    pub(crate) fn add_raw(&self, amount: i32) -> Result<Self> {
        match self {
            Self::F32(array) => Ok(Self::F32(array.mapv(|value| value + amount as f32))),
            Self::F64(array) => Ok(Self::F64(array.mapv(|value| value + amount as f64))),
            Self::I32(array) => Ok(Self::I32(checked_shift(array, amount)?)),
            Self::I64(array) => Ok(Self::I64(checked_shift(array, amount.into())?)),
            Self::Time(_) => Err(Error::DtypeMismatch {
                left: "numeric",
                right: self.dtype(),
            }),
        }
    }

    /// Maximum and minimum of the element-wise difference `self - other`.
    ///
    /// Positions where both sides are NaN count as equal. A NaN on only one side makes both
    /// results NaN. Dates are compared in seconds. An empty array gives `(0.0, 0.0)`.
    ///
    pub fn diff_extrema(&self, other: &Values) -> Result<(f64, f64)> {
        if self.shape() != other.shape() {
            return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into());
        }

        match (self, other) {
            (Self::F32(left), Self::F32(right)) => Ok(extrema(left.iter().zip(right.iter()))),
            (Self::F64(left), Self::F64(right)) => Ok(extrema(left.iter().zip(right.iter()))),
            (Self::I32(left), Self::I32(right)) => Ok(extrema(left.iter().zip(right.iter()))),
            (Self::I64(left), Self::I64(right)) => Ok(extrema(left.iter().zip(right.iter()))),
            (Self::Time(left), Self::Time(right)) => {
                let mut seconds = Vec::with_capacity(left.len());
                for (left, right) in left.iter().zip(right.iter()) {
                    seconds.push(left.seconds_since(right)?);
                }

                Ok(extrema(seconds.iter().map(|s| (s, &0_i64))))
            }
            _ => Err(Error::DtypeMismatch {
                left: self.dtype(),
                right: other.dtype(),
            }),
        }
    }
}

fn checked_shift<N>(array: &ArrayD<N>, amount: N) -> Result<ArrayD<N>>
where
    N: CheckedAdd + Copy + ToString + Into<i64>,
{
    let mut shifted = array.clone();
    for value in shifted.iter_mut() {
        let current = *value;
        *value = current
            .checked_add(&amount)
            .ok_or_else(|| Error::ShiftOverflow {
                value: current.to_string(),
                amount: amount.into(),
            })?;
    }

    Ok(shifted)
}

fn extrema<'a, N, I>(pairs: I) -> (f64, f64)
where
    N: 'a + ToPrimitive + Copy,
    I: Iterator<Item = (&'a N, &'a N)>,
{
    let mut max: f64 = 0.0;
    let mut min: f64 = 0.0;
    let mut first = true;
    for (left, right) in pairs {
        let left = left.to_f64().unwrap_or(f64::NAN);
        let right = right.to_f64().unwrap_or(f64::NAN);
        if left.is_nan() && right.is_nan() {
            continue;
        }

        let diff = left - right;
        if diff.is_nan() {
            return (f64::NAN, f64::NAN);
        }

        if first {
            max = diff;
            min = diff;
            first = false;
        } else {
            max = max.max(diff);
            min = min.min(diff);
        }
    }

    (max, min)
}
