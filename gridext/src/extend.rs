use std::ops::RangeInclusive;

use tracing::debug;

use crate::{
    dataset::{Dataset, FieldClass},
    encoding::normalize,
    errors::{Error, Result},
    select::{select, Cadence},
    values::Values,
};

/// Everything `extend` needs to know, normally filled in from a configuration file.
///
#[derive(Clone, Debug, PartialEq)]
pub struct ExtendOptions {
    pub cadence: Cadence,

    /// Reporting period offset. Only used when verifying, synthesis always copies the most
    /// recent period.
    pub offset: usize,

    /// How many years past the end of the series to extend
    pub years_to_append: i32,

    /// Append one copy for each year up to `years_to_append`, instead of a single copy
    /// `years_to_append` years out
    pub fill_in: bool,

    pub time_axis: String,
    pub lat_axis: String,
    pub lon_axis: String,

    /// Whether time values are decoded dates (`true`) or raw numbers (`false`)
    pub decode_times: bool,
}

impl Default for ExtendOptions {
    fn default() -> Self {
        Self {
            cadence: Cadence::Monthly,
            offset: 0,
            years_to_append: 100,
            fill_in: false,
            time_axis: String::from("time"),
            lat_axis: String::from("lat"),
            lon_axis: String::from("lon"),
            decode_times: true,
        }
    }
}

impl ExtendOptions {
    pub fn new(cadence: Cadence) -> Self {
        Self {
            cadence,
            ..Self::default()
        }
    }

    /// The year shifts to synthesize, in the order they are appended
    pub fn shifts(&self) -> RangeInclusive<i32> {
        if self.fill_in {
            1..=self.years_to_append
        } else {
            self.years_to_append..=self.years_to_append
        }
    }
}

/// Extend `dataset` past its last time step by copying its most recent reporting period
/// forward in time.
///
/// Each copy is the period at offset 0 with every time value moved forward by whole years, and
/// nothing else changed. Copies are appended after the original data in order of increasing
/// shift. Afterwards the time axis keeps the original's encoding (with the new length) and the
/// other encodings are repaired with `normalize`.
///
pub fn extend(dataset: &Dataset, options: &ExtendOptions) -> Result<Dataset> {
    if options.years_to_append < 1 {
        return Err(Error::NothingToAppend);
    }

    let time = dataset.find_coordinate(&options.time_axis)?;
    check_time_representation(time.values.is_time(), &time.name, options)?;

    let template = select(dataset, options.cadence, 0, &options.time_axis)?;

    // Fail on the farthest shift before making any copies
    shift_time(
        &template.coordinate(&time.name)?.values,
        options.years_to_append,
        options,
    )?;
    let periods = options
        .shifts()
        .map(|years| synthesize(dataset, &template, &time.name, years, options))
        .collect::<Result<Vec<_>>>()?;

    let mut combined = dataset.concat(&periods, &time.name)?;
    let coordinate = combined.coordinate_mut(&time.name)?;
    debug!(encoding = ?coordinate.encoding, "time encoding after concatenation");
    coordinate.encoding = time.encoding.clone();
    coordinate.encoding.original_shape = Some(vec![coordinate.len()]);
    debug!(encoding = ?coordinate.encoding, "time encoding restored");

    for class in [FieldClass::DataVariables, FieldClass::Coordinates] {
        normalize(
            &mut combined,
            class,
            &options.time_axis,
            &options.lat_axis,
            &options.lon_axis,
        )?;
    }

    Ok(combined)
}

fn check_time_representation(decoded: bool, name: &str, options: &ExtendOptions) -> Result<()> {
    let describe = |decoded| if decoded { "decoded" } else { "raw numbers" };
    if decoded != options.decode_times {
        return Err(Error::TimeRepresentation {
            name: name.to_string(),
            expected: describe(options.decode_times),
            actual: describe(decoded),
        });
    }

    if !decoded && options.cadence == Cadence::Monthly {
        return Err(Error::UndecodedTimeShift(name.to_string()));
    }

    Ok(())
}

fn shift_time(values: &Values, years: i32, options: &ExtendOptions) -> Result<Values> {
    if options.decode_times {
        values.add_years(years)
    } else {
        values.add_raw(years)
    }
}

/// Copy of `template` with its time axis moved `years` years forward.
///
/// At annual cadence the template is a single time step with the time dimension dropped, so
/// it is put back as a length 1 axis in every field that had it in `dataset`.
///
fn synthesize(
    dataset: &Dataset,
    template: &Dataset,
    time_axis: &str,
    years: i32,
    options: &ExtendOptions,
) -> Result<Dataset> {
    let mut period = template.clone();
    let time = period.coordinate_mut(time_axis)?;
    time.values = shift_time(&time.values, years, options)?;

    if options.cadence == Cadence::Annual {
        for class in [FieldClass::Coordinates, FieldClass::DataVariables] {
            let originals = dataset.fields(class);
            for field in period.fields_mut(class) {
                let axis = originals
                    .iter()
                    .find(|original| original.name == field.name)
                    .and_then(|original| original.axis(time_axis));
                if let Some(axis) = axis {
                    *field = field.clone().insert_dim(axis, time_axis);
                }
            }
        }
    }

    Ok(period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encoding::FillValue,
        testing,
        values::Selection,
        verify::verify,
    };

    fn monthly(years_to_append: i32, fill_in: bool) -> ExtendOptions {
        ExtendOptions {
            years_to_append,
            fill_in,
            ..ExtendOptions::new(Cadence::Monthly)
        }
    }

    fn annual(years_to_append: i32, fill_in: bool) -> ExtendOptions {
        ExtendOptions {
            years_to_append,
            fill_in,
            ..ExtendOptions::new(Cadence::Annual)
        }
    }

    #[test]
    fn test_shifts() {
        assert_eq!(monthly(100, false).shifts().collect::<Vec<_>>(), vec![100]);
        assert_eq!(monthly(3, true).shifts().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_extend_monthly_one_year() -> Result<()> {
        let dataset = testing::monthly_dataset(2)?;
        let extended = extend(&dataset, &monthly(1, false))?;
        assert_eq!(extended.dim_len("time"), Some(36));

        let dates = extended.coordinate("time")?.values.as_time().unwrap();
        for month in 0..12 {
            let source = dates[[12 + month]];
            let copy = dates[[24 + month]];
            assert_eq!(copy.year(), source.year() + 1);
            assert_eq!(copy.month(), source.month());
            assert_eq!(copy.day(), source.day());
            assert_eq!(copy.time(), source.time());
        }

        let tail = extended.isel("time", &Selection::Range(24..36))?;
        let source = dataset.isel("time", &Selection::Range(12..24))?;
        for name in ["emissions", "flux"] {
            assert_eq!(tail.variable(name)?.values, source.variable(name)?.values);
        }
        assert_eq!(extended.variable("lat_bnds")?.values, dataset.variable("lat_bnds")?.values);

        verify(&extended, Cadence::Monthly, "time")
    }

    #[test]
    fn test_extend_monthly_far_future() -> Result<()> {
        let dataset = testing::monthly_dataset(2)?;
        let extended = extend(&dataset, &ExtendOptions::default())?;
        assert_eq!(extended.dim_len("time"), Some(36));

        let dates = extended.coordinate("time")?.values.as_time().unwrap();
        assert_eq!(dates[[24]].year(), 2101);
        assert_eq!(dates[[35]].year(), 2101);
        assert_eq!(dates[[35]].month(), 12);

        Ok(())
    }

    #[test]
    fn test_extend_monthly_fill_in() -> Result<()> {
        let dataset = testing::monthly_dataset(2)?;
        let extended = extend(&dataset, &monthly(5, true))?;
        assert_eq!(extended.dim_len("time"), Some(24 + 5 * 12));

        let dates = extended.coordinate("time")?.values.as_time().unwrap();
        assert!(dates.iter().zip(dates.iter().skip(1)).all(|(a, b)| a < b));
        assert_eq!(dates[[24 + 4 * 12]].year(), 2006);

        verify(&extended, Cadence::Monthly, "time")
    }

    #[test]
    fn test_extend_repairs_encoding() -> Result<()> {
        let dataset = testing::monthly_dataset(2)?;
        let extended = extend(&dataset, &monthly(3, true))?;

        let time = extended.coordinate("time")?;
        assert_eq!(time.encoding.original_shape, Some(vec![60]));
        assert_eq!(time.encoding.units, dataset.coordinate("time")?.encoding.units);
        assert_eq!(time.encoding.fill_value, Some(FillValue::Disabled));

        let emissions = extended.variable("emissions")?;
        assert_eq!(emissions.encoding.original_shape, Some(vec![60, 3, 4]));
        assert_eq!(emissions.encoding.fill_value, Some(FillValue::Value(1.0e20)));
        let flux = extended.variable("flux")?;
        assert_eq!(flux.encoding.original_shape, Some(vec![60, 2, 3, 4]));
        assert_eq!(flux.encoding.fill_value, Some(FillValue::Disabled));
        let lat_bnds = extended.variable("lat_bnds")?;
        assert_eq!(lat_bnds.encoding.original_shape, Some(vec![3, 2]));

        Ok(())
    }

    #[test]
    fn test_extend_leaves_input_alone() -> Result<()> {
        let dataset = testing::monthly_dataset(2)?;
        let before = dataset.clone();
        extend(&dataset, &monthly(2, true))?;
        assert_eq!(dataset, before);

        Ok(())
    }

    #[test]
    fn test_extend_annual_fill_in() -> Result<()> {
        let dataset = testing::annual_dataset(5)?;
        let extended = extend(&dataset, &annual(3, true))?;
        assert_eq!(extended.dim_len("time"), Some(8));

        let dates = extended.coordinate("time")?.values.as_time().unwrap();
        for (step, years) in [(5, 1), (6, 2), (7, 3)] {
            assert_eq!(dates[[step]].year(), dates[[4]].year() + years);
            assert_eq!(dates[[step]].month(), 7);
            assert_eq!(dates[[step]].day(), 1);
        }

        let last = dataset.isel("time", &Selection::Index(4))?;
        for step in 5..8 {
            let copy = extended.isel("time", &Selection::Index(step))?;
            let diff = copy
                .variable("emissions")?
                .values
                .diff_extrema(&last.variable("emissions")?.values)?;
            assert_eq!(diff, (0.0, 0.0));
            assert_eq!(copy.variable("sector")?.values, last.variable("sector")?.values);
        }

        let emissions = extended.variable("emissions")?;
        assert_eq!(emissions.dims, vec!["time", "lat", "lon"]);
        assert_eq!(emissions.encoding.original_shape, Some(vec![8, 3, 4]));
        let area = extended.variable("area")?;
        assert_eq!(area.values, dataset.variable("area")?.values);
        assert_eq!(area.encoding.original_shape, Some(vec![3, 4]));
        assert_eq!(area.encoding.fill_value, Some(FillValue::Disabled));

        verify(&extended, Cadence::Annual, "time")
    }

    #[test]
    fn test_extend_annual_raw_times() -> Result<()> {
        let dataset = testing::raw_annual_dataset(4)?;
        let options = ExtendOptions {
            decode_times: false,
            ..annual(10, false)
        };
        let extended = extend(&dataset, &options)?;
        assert_eq!(
            extended.coordinate("time")?.values,
            Values::from(ndarray::array![2010.0, 2011.0, 2012.0, 2013.0, 2023.0].into_dyn())
        );

        verify(&extended, Cadence::Annual, "time")
    }

    #[test]
    fn test_extend_time_representation_mismatch() -> Result<()> {
        let dataset = testing::raw_annual_dataset(4)?;
        assert!(matches!(
            extend(&dataset, &annual(1, false)),
            Err(Error::TimeRepresentation {
                expected: "decoded",
                ..
            })
        ));

        let dataset = testing::monthly_dataset(1)?;
        let options = ExtendOptions {
            decode_times: false,
            ..monthly(1, false)
        };
        assert!(matches!(
            extend(&dataset, &options),
            Err(Error::TimeRepresentation { .. })
        ));

        Ok(())
    }

    #[test]
    fn test_extend_monthly_raw_times() -> Result<()> {
        let dataset = testing::raw_annual_dataset(24)?;
        let options = ExtendOptions {
            decode_times: false,
            ..monthly(1, false)
        };
        assert!(matches!(
            extend(&dataset, &options),
            Err(Error::UndecodedTimeShift(name)) if name == "time"
        ));

        Ok(())
    }

    #[test]
    fn test_extend_errors() -> Result<()> {
        let dataset = testing::monthly_dataset(2)?;
        assert!(matches!(
            extend(&dataset, &monthly(0, false)),
            Err(Error::NothingToAppend)
        ));

        let options = ExtendOptions {
            time_axis: String::from("date"),
            ..monthly(1, false)
        };
        assert!(matches!(
            extend(&dataset, &options),
            Err(Error::TimeAxisNotFound(_))
        ));

        let short = dataset.isel("time", &Selection::Range(0..6))?;
        assert!(matches!(
            extend(&short, &monthly(1, false)),
            Err(Error::PeriodOutOfRange { .. })
        ));

        Ok(())
    }

    #[test]
    fn test_extend_years_overflow() -> Result<()> {
        let dataset = testing::annual_dataset(5)?;
        for fill_in in [false, true] {
            assert!(matches!(
                extend(&dataset, &annual(i32::MAX, fill_in)),
                Err(Error::ShiftOverflow { amount, .. }) if amount == i32::MAX as i64
            ));
        }

        Ok(())
    }

    #[test]
    fn test_extend_leap_day() -> Result<()> {
        let mut dataset = testing::annual_dataset(2)?;
        let leap = crate::time::CfDatetime::new(crate::time::Calendar::Standard, 2012, 2, 29)?;
        let first = leap.add_years(-4)?;
        dataset.coordinate_mut("time")?.values =
            Values::from(ndarray::array![first, leap].into_dyn());

        assert!(matches!(
            extend(&dataset, &annual(1, false)),
            Err(Error::InvalidDate { year: 2013, .. })
        ));
        assert_eq!(extend(&dataset, &annual(4, false))?.dim_len("time"), Some(3));

        Ok(())
    }
}
