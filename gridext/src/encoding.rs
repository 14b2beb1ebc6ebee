//! Per-variable serialization metadata and its repair after the time axis changes length.

use tracing::debug;

use crate::{
    dataset::{Dataset, FieldClass},
    errors::Result,
};

/// How a variable is represented on disk. Set by whatever loaded the dataset; the extension
/// code only repairs it.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Encoding {
    /// `None` means no fill value was ever specified, which lets a writer pick its own default.
    pub fill_value: Option<FillValue>,

    /// Shape of the variable as declared on disk
    pub original_shape: Option<Vec<usize>>,

    /// Units used to encode decoded dates, e.g. "days since 1850-01-01 00:00:00"
    pub units: Option<String>,

    pub calendar: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FillValue {
    /// Explicitly no fill value
    Disabled,

    Value(f64),
}

/// Repair the encodings of one class of fields after the time axis changed length.
///
/// For gridded fields, meaning a 3 or 4 element `original_shape` whose last two elements
/// equal the current latitude and longitude lengths, the leading element is set to the
/// current time axis length. Any other declared shape is left alone. Fields with no fill value
/// marker get `FillValue::Disabled`. Array contents are never touched.
///
pub fn normalize<'a>(
    dataset: &'a mut Dataset,
    class: FieldClass,
    time_axis: &str,
    lat_axis: &str,
    lon_axis: &str,
) -> Result<&'a mut Dataset> {
    let time = dataset.find_coordinate(time_axis)?;
    let time_len = dataset.dim_len(&time.name).unwrap_or(1);
    let lat_len = dataset.dim_len(lat_axis);
    let lon_len = dataset.dim_len(lon_axis);

    for field in dataset.fields_mut(class) {
        if let (Some(shape), Some(lat_len), Some(lon_len)) =
            (field.encoding.original_shape.as_mut(), lat_len, lon_len)
        {
            let n = shape.len();
            if (n == 3 || n == 4) && shape[n - 2] == lat_len && shape[n - 1] == lon_len {
                shape[0] = time_len;
            }
        }

        if field.encoding.fill_value.is_none() {
            field.encoding.fill_value = Some(FillValue::Disabled);
        }

        debug!(?class, field = %field.name, encoding = ?field.encoding, "normalized encoding");
    }

    Ok(dataset)
}
