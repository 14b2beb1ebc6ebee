//! netCDF backed `DatasetStore`. Needs the netCDF C library, so it is only built with the
//! `netcdf` feature.

use std::collections::BTreeMap;
use std::path::Path;

use gridext::{
    Attribute, Calendar, Dataset, Encoding, FillValue, TimeUnits, Values, Variable,
};
use ndarray::{ArrayD, IxDyn};
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::{AttributeValue, NcTypeDescriptor};
use tracing::{debug, trace};

use crate::errors::{CliError, Result};
use crate::store::DatasetStore;

const DEFAULT_TIME_UNITS: &str = "days since 1970-01-01 00:00:00";

#[derive(Clone, Debug, Default)]
pub struct NetcdfStore;

impl DatasetStore for NetcdfStore {
    fn open(&self, path: &Path, decode_times: bool) -> Result<Dataset> {
        let file = netcdf::open(path)?;
        let dims: Vec<String> = file.dimensions().map(|dim| dim.name()).collect();

        let mut coordinates = vec![];
        let mut variables = vec![];
        for var in file.variables() {
            let field = read_variable(&var, decode_times)?;
            trace!(
                name = %field.name,
                dims = ?field.dims,
                dtype = field.values.dtype(),
                "read variable"
            );
            if dims.contains(&field.name) {
                coordinates.push(field);
            } else {
                variables.push(field);
            }
        }

        let mut dataset = Dataset::new();
        for coordinate in coordinates {
            dataset = dataset.add_coordinate(coordinate)?;
        }
        for variable in variables {
            dataset = dataset.add_variable(variable)?;
        }
        dataset.attrs = read_attributes(file.attributes())?;
        debug!(
            file = %path.display(),
            coordinates = dataset.coordinates.len(),
            variables = dataset.variables.len(),
            "opened dataset"
        );

        Ok(dataset)
    }

    fn write(&self, dataset: &Dataset, path: &Path) -> Result<()> {
        let mut file = netcdf::create(path)?;

        for field in dataset.coordinates.iter().chain(&dataset.variables) {
            for (dim, &len) in field.dims.iter().zip(field.shape()) {
                if file.dimension(dim).is_none() {
                    file.add_dimension(dim, len)?;
                }
            }
        }

        for (name, value) in &dataset.attrs {
            file.add_attribute(name, attribute_value(value))?;
        }

        for field in dataset.coordinates.iter().chain(&dataset.variables) {
            write_variable(&mut file, field)?;
        }
        debug!(file = %path.display(), "wrote dataset");

        Ok(())
    }
}

fn read_variable(var: &netcdf::Variable<'_>, decode_times: bool) -> Result<Variable> {
    let name = var.name();
    let dims: Vec<String> = var.dimensions().iter().map(|dim| dim.name()).collect();
    let shape: Vec<usize> = var.dimensions().iter().map(|dim| dim.len()).collect();
    let mut attrs = read_attributes(var.attributes())?;

    let fill_value = match attrs.remove("_FillValue") {
        Some(Attribute::Float(value)) => value.first().copied().map(FillValue::Value),
        Some(Attribute::Int(value)) => value.first().map(|&v| FillValue::Value(v as f64)),
        _ => None,
    };
    let mut encoding = Encoding {
        fill_value,
        original_shape: Some(shape.clone()),
        ..Encoding::default()
    };

    let time_units = match (decode_times, attrs.get("units")) {
        (true, Some(Attribute::Text(units))) if units.contains(" since ") => Some(units.clone()),
        _ => None,
    };

    let values = match time_units {
        Some(units) => {
            let calendar = match attrs.get("calendar") {
                Some(Attribute::Text(calendar)) => calendar.clone(),
                _ => String::from("standard"),
            };
            let time_units = TimeUnits::parse(&units, calendar.parse::<Calendar>()?)?;
            let raw = read_array::<f64>(var, &shape)?;
            let mut dates = Vec::with_capacity(raw.len());
            for &value in raw.iter() {
                dates.push(time_units.decode(value)?);
            }

            attrs.remove("units");
            attrs.remove("calendar");
            encoding.units = Some(units);
            encoding.calendar = Some(calendar);
            let dates = ArrayD::from_shape_vec(IxDyn(&shape), dates).map_err(gridext::Error::from)?;
            Values::from(dates)
        }
        None => match var.vartype() {
            NcVariableType::Float(FloatType::F32) => Values::from(read_array::<f32>(var, &shape)?),
            NcVariableType::Float(FloatType::F64) => Values::from(read_array::<f64>(var, &shape)?),
            NcVariableType::Int(IntType::I8 | IntType::U8 | IntType::I16 | IntType::U16)
            | NcVariableType::Int(IntType::I32) => Values::from(read_array::<i32>(var, &shape)?),
            NcVariableType::Int(IntType::U32 | IntType::I64 | IntType::U64) => {
                Values::from(read_array::<i64>(var, &shape)?)
            }
            other => {
                return Err(CliError::UnsupportedType {
                    variable: name,
                    vartype: format!("{:?}", other),
                })
            }
        },
    };

    let dims: Vec<&str> = dims.iter().map(String::as_str).collect();
    let mut field = Variable::new(name, &dims, values).with_encoding(encoding);
    field.attrs = attrs;

    Ok(field)
}

fn read_array<T>(var: &netcdf::Variable<'_>, shape: &[usize]) -> Result<ArrayD<T>>
where
    T: NcTypeDescriptor + Copy,
{
    let data: Vec<T> = var.get_values::<T, _>(..)?;
    Ok(ArrayD::from_shape_vec(IxDyn(shape), data).map_err(gridext::Error::from)?)
}

fn read_attributes<'a, I>(attributes: I) -> Result<BTreeMap<String, Attribute>>
where
    I: Iterator<Item = netcdf::Attribute<'a>>,
{
    let mut attrs = BTreeMap::new();
    for attribute in attributes {
        let value = match attribute.value()? {
            AttributeValue::Str(text) => Attribute::Text(text),
            AttributeValue::Strs(texts) => Attribute::Text(texts.join("\n")),
            AttributeValue::Double(v) => Attribute::Float(vec![v]),
            AttributeValue::Doubles(v) => Attribute::Float(v),
            AttributeValue::Float(v) => Attribute::Float(vec![v as f64]),
            AttributeValue::Floats(v) => Attribute::Float(v.into_iter().map(f64::from).collect()),
            AttributeValue::Schar(v) => Attribute::Int(vec![v as i64]),
            AttributeValue::Uchar(v) => Attribute::Int(vec![v as i64]),
            AttributeValue::Short(v) => Attribute::Int(vec![v as i64]),
            AttributeValue::Ushort(v) => Attribute::Int(vec![v as i64]),
            AttributeValue::Int(v) => Attribute::Int(vec![v as i64]),
            AttributeValue::Uint(v) => Attribute::Int(vec![v as i64]),
            AttributeValue::Longlong(v) => Attribute::Int(vec![v]),
            AttributeValue::Ints(v) => Attribute::Int(v.into_iter().map(i64::from).collect()),
            AttributeValue::Shorts(v) => Attribute::Int(v.into_iter().map(i64::from).collect()),
            AttributeValue::Longlongs(v) => Attribute::Int(v),
            other => {
                trace!(name = attribute.name(), value = ?other, "skipping attribute");
                continue;
            }
        };
        attrs.insert(attribute.name().to_string(), value);
    }

    Ok(attrs)
}

fn attribute_value(attribute: &Attribute) -> AttributeValue {
    match attribute {
        Attribute::Text(text) => AttributeValue::Str(text.clone()),
        Attribute::Float(values) if values.len() == 1 => AttributeValue::Double(values[0]),
        Attribute::Float(values) => AttributeValue::Doubles(values.clone()),
        Attribute::Int(values) if values.len() == 1 => AttributeValue::Longlong(values[0]),
        Attribute::Int(values) => AttributeValue::Longlongs(values.clone()),
    }
}

fn write_variable(file: &mut netcdf::FileMut, field: &Variable) -> Result<()> {
    let fill = match field.encoding.fill_value {
        Some(FillValue::Value(value)) => Some(value),
        Some(FillValue::Disabled) | None => None,
    };

    match &field.values {
        Values::F32(array) => put(file, field, array, fill.map(|v| v as f32), vec![]),
        Values::F64(array) => put(file, field, array, fill, vec![]),
        Values::I32(array) => put(file, field, array, fill.map(|v| v as i32), vec![]),
        Values::I64(array) => put(file, field, array, fill.map(|v| v as i64), vec![]),
        Values::Time(dates) => {
            let units = field
                .encoding
                .units
                .clone()
                .unwrap_or_else(|| String::from(DEFAULT_TIME_UNITS));
            let calendar = match &field.encoding.calendar {
                Some(calendar) => calendar.clone(),
                None => dates
                    .iter()
                    .next()
                    .map_or(Calendar::Standard, |date| date.calendar())
                    .to_string(),
            };
            let time_units = TimeUnits::parse(&units, calendar.parse::<Calendar>()?)?;

            let mut raw = Vec::with_capacity(dates.len());
            for date in dates.iter() {
                raw.push(time_units.encode(date)?);
            }
            let raw =
                ArrayD::from_shape_vec(dates.raw_dim(), raw).map_err(gridext::Error::from)?;
            let extra = vec![
                ("units", AttributeValue::Str(units)),
                ("calendar", AttributeValue::Str(calendar)),
            ];
            put(file, field, &raw, fill, extra)
        }
    }
}

fn put<T>(
    file: &mut netcdf::FileMut,
    field: &Variable,
    array: &ArrayD<T>,
    fill: Option<T>,
    extra: Vec<(&str, AttributeValue)>,
) -> Result<()>
where
    T: NcTypeDescriptor + Copy + Into<AttributeValue>,
{
    let dims: Vec<&str> = field.dims.iter().map(String::as_str).collect();
    let mut var = file.add_variable::<T>(&field.name, &dims)?;

    // Must be set before any data is written
    if let Some(fill) = fill {
        var.put_attribute("_FillValue", fill)?;
    }
    for (name, value) in &field.attrs {
        var.put_attribute(name, attribute_value(value))?;
    }
    for (name, value) in extra {
        var.put_attribute(name, value)?;
    }

    let data: Vec<T> = array.iter().copied().collect();
    var.put_values(&data, ..)?;

    Ok(())
}
