use ndarray::{Array1, ArrayD, IxDyn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    dataset::{Attribute, Dataset, Variable},
    encoding::{Encoding, FillValue},
    errors::Result,
    time::{Calendar, CfDatetime},
    values::Values,
};

fn random<N>(rng: &mut StdRng, shape: &[usize]) -> ArrayD<N>
where
    rand::distributions::Standard: rand::distributions::Distribution<N>,
{
    ArrayD::from_shape_fn(IxDyn(shape), |_| rng.gen())
}

fn gridded(shape: &[usize], fill_value: Option<FillValue>) -> Encoding {
    Encoding {
        fill_value,
        original_shape: Some(shape.to_vec()),
        ..Encoding::default()
    }
}

fn lat_lon(dataset: Dataset) -> Result<Dataset> {
    dataset
        .add_coordinate(Variable::new(
            "lat",
            &["lat"],
            Values::from(Array1::from(vec![-45.0_f32, 0.0, 45.0]).into_dyn()),
        ))?
        .add_coordinate(Variable::new(
            "lon",
            &["lon"],
            Values::from(Array1::from(vec![0.0_f32, 90.0, 180.0, 270.0]).into_dyn()),
        ))
}

/// `years` years of mid-month data in a noleap calendar, starting January 2000.
///
/// Has a 3-D and a 4-D gridded variable plus a non-gridded one (`lat_bnds`).
///
pub(crate) fn monthly_dataset(years: usize) -> Result<Dataset> {
    let instants = years * 12;
    let mut rng = StdRng::seed_from_u64(42);
    let dates = (0..instants)
        .map(|i| {
            let year = 2000 + (i / 12) as i32;
            CfDatetime::new(Calendar::NoLeap, year, (i % 12) as u32 + 1, 15)
        })
        .collect::<Result<Vec<_>>>()?;

    let time = Variable::new("time", &["time"], Values::from(Array1::from(dates).into_dyn()))
        .with_encoding(Encoding {
            original_shape: Some(vec![instants]),
            units: Some(String::from("days since 1850-01-01 0:0:0")),
            calendar: Some(String::from("noleap")),
            ..Encoding::default()
        });
    let level = Variable::new(
        "level",
        &["level"],
        Values::from(Array1::from(vec![1000.0_f64, 500.0]).into_dyn()),
    );

    let dataset = Dataset::new().add_coordinate(time)?.add_coordinate(level)?;
    lat_lon(dataset)?
        .add_variable(
            Variable::new(
                "emissions",
                &["time", "lat", "lon"],
                Values::from(random::<f32>(&mut rng, &[instants, 3, 4])),
            )
            .with_attr("units", Attribute::Text(String::from("kg m-2 s-1")))
            .with_encoding(gridded(&[instants, 3, 4], Some(FillValue::Value(1.0e20)))),
        )?
        .add_variable(
            Variable::new(
                "flux",
                &["time", "level", "lat", "lon"],
                Values::from(random::<f64>(&mut rng, &[instants, 2, 3, 4])),
            )
            .with_encoding(gridded(&[instants, 2, 3, 4], None)),
        )?
        .add_variable(
            Variable::new(
                "lat_bnds",
                &["lat", "bnds"],
                Values::from(random::<f64>(&mut rng, &[3, 2])),
            )
            .with_encoding(gridded(&[3, 2], None)),
        )
}

/// `steps` yearly values, 1 July of each year from 2010, in the standard calendar. One cell of
/// `emissions` is NaN.
///
pub(crate) fn annual_dataset(steps: usize) -> Result<Dataset> {
    let dates = (0..steps)
        .map(|i| CfDatetime::new(Calendar::Standard, 2010 + i as i32, 7, 1))
        .collect::<Result<Vec<_>>>()?;
    let time = Variable::new("time", &["time"], Values::from(Array1::from(dates).into_dyn()))
        .with_encoding(Encoding {
            original_shape: Some(vec![steps]),
            units: Some(String::from("days since 2000-01-01")),
            calendar: Some(String::from("standard")),
            ..Encoding::default()
        });

    annual_fields(Dataset::new().add_coordinate(time)?, steps)
}

/// Same layout as `annual_dataset` but with raw, undecoded year numbers on the time axis.
///
pub(crate) fn raw_annual_dataset(steps: usize) -> Result<Dataset> {
    let years: Vec<f64> = (0..steps).map(|i| 2010.0 + i as f64).collect();
    let time = Variable::new("time", &["time"], Values::from(Array1::from(years).into_dyn()))
        .with_encoding(Encoding {
            original_shape: Some(vec![steps]),
            units: Some(String::from("years since 0000-01-01")),
            ..Encoding::default()
        });

    annual_fields(Dataset::new().add_coordinate(time)?, steps)
}

fn annual_fields(dataset: Dataset, steps: usize) -> Result<Dataset> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut emissions = random::<f32>(&mut rng, &[steps, 3, 4]);
    emissions[[steps - 1, 1, 2]] = f32::NAN;

    lat_lon(dataset)?
        .add_variable(
            Variable::new("emissions", &["time", "lat", "lon"], Values::from(emissions))
                .with_encoding(gridded(&[steps, 3, 4], Some(FillValue::Value(-999.0)))),
        )?
        .add_variable(
            Variable::new(
                "area",
                &["lat", "lon"],
                Values::from(random::<f64>(&mut rng, &[3, 4])),
            )
            .with_encoding(gridded(&[3, 4], None)),
        )?
        .add_variable(
            Variable::new(
                "sector",
                &["time"],
                Values::from(ArrayD::from_shape_fn(IxDyn(&[steps]), |i| i[0] as i32)),
            )
            .with_encoding(gridded(&[steps], None)),
        )
}
