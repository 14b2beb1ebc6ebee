use std::collections::BTreeMap;

use crate::{
    encoding::Encoding,
    errors::{Error, Result},
    values::{Selection, Values},
};

/// An in memory gridded dataset: coordinate variables followed by data variables, in the
/// order they were added.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    pub coordinates: Vec<Variable>,
    pub variables: Vec<Variable>,
    pub attrs: BTreeMap<String, Attribute>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    /// Name of the variable, e.g. "emissions"
    pub name: String,

    /// Names of the dimensions labeling each axis of `values`, in axis order
    pub dims: Vec<String>,

    pub values: Values,

    pub attrs: BTreeMap<String, Attribute>,

    /// How the variable is represented on disk
    pub encoding: Encoding,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
    Text(String),
    Float(Vec<f64>),
    Int(Vec<i64>),
}

/// Which group of fields an operation applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldClass {
    DataVariables,
    Coordinates,
}

impl Variable {
    pub fn new<S: Into<String>>(name: S, dims: &[&str], values: Values) -> Self {
        Self {
            name: name.into(),
            dims: dims.iter().map(|dim| dim.to_string()).collect(),
            values,
            attrs: BTreeMap::new(),
            encoding: Encoding::default(),
        }
    }

    pub fn with_encoding(self, encoding: Encoding) -> Self {
        Self { encoding, ..self }
    }

    pub fn with_attr<S: Into<String>>(mut self, name: S, value: Attribute) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    /// Position of `dim` among this variable's axes, if it has it
    pub fn axis(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// Length along the first axis, or 1 for a scalar
    pub fn len(&self) -> usize {
        self.shape().first().copied().unwrap_or(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Select along `dim`. Variables without `dim` are copied unchanged.
    ///
    pub fn isel(&self, dim: &str, selection: &Selection) -> Result<Self> {
        match self.axis(dim) {
            Some(axis) => {
                let values = self.values.isel(axis, selection)?;
                let mut dims = self.dims.clone();
                if let Selection::Index(_) = selection {
                    dims.remove(axis);
                }

                Ok(Self {
                    dims,
                    values,
                    ..self.clone()
                })
            }
            None => Ok(self.clone()),
        }
    }

    /// Turn `dim` into an explicit axis of length 1 at position `axis`.
    ///
    pub fn insert_dim(self, axis: usize, dim: &str) -> Self {
        let mut dims = self.dims;
        dims.insert(axis, dim.to_string());

        Self {
            dims,
            values: self.values.insert_axis(axis),
            ..self
        }
    }

    fn check_dims(&self) -> Result<()> {
        if self.dims.len() != self.values.ndim() {
            return Err(Error::ShapeMismatch {
                variable: self.name.clone(),
                dim: self.dims.join(","),
                expected: self.dims.len(),
                actual: self.values.ndim(),
            });
        }

        Ok(())
    }
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a coordinate variable. Fails if its dimensions disagree with the lengths already
    /// established by other fields.
    ///
    pub fn add_coordinate(mut self, coordinate: Variable) -> Result<Self> {
        self.check_conforms(&coordinate)?;
        self.coordinates.push(coordinate);

        Ok(self)
    }

    /// Add a data variable. Fails if its dimensions disagree with the lengths already
    /// established by other fields.
    ///
    pub fn add_variable(mut self, variable: Variable) -> Result<Self> {
        self.check_conforms(&variable)?;
        self.variables.push(variable);

        Ok(self)
    }

    fn check_conforms(&self, variable: &Variable) -> Result<()> {
        variable.check_dims()?;
        for (dim, &actual) in variable.dims.iter().zip(variable.shape()) {
            if let Some(expected) = self.dim_len(dim) {
                if expected != actual {
                    return Err(Error::ShapeMismatch {
                        variable: variable.name.clone(),
                        dim: dim.clone(),
                        expected,
                        actual,
                    });
                }
            }
        }

        Ok(())
    }

    /// Current length of dimension `dim`, if any field uses it
    pub fn dim_len(&self, dim: &str) -> Option<usize> {
        self.coordinates
            .iter()
            .chain(self.variables.iter())
            .find_map(|field| field.axis(dim).map(|axis| field.shape()[axis]))
    }

    pub fn fields(&self, class: FieldClass) -> &[Variable] {
        match class {
            FieldClass::DataVariables => &self.variables,
            FieldClass::Coordinates => &self.coordinates,
        }
    }

    pub fn fields_mut(&mut self, class: FieldClass) -> &mut [Variable] {
        match class {
            FieldClass::DataVariables => &mut self.variables,
            FieldClass::Coordinates => &mut self.coordinates,
        }
    }

    pub fn coordinate(&self, name: &str) -> Result<&Variable> {
        self.coordinates
            .iter()
            .find(|c| c.name == name)
            .ok_or(Error::BadName(name.to_string()))
    }

    pub fn coordinate_mut(&mut self, name: &str) -> Result<&mut Variable> {
        self.coordinates
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or(Error::BadName(name.to_string()))
    }

    pub fn variable(&self, name: &str) -> Result<&Variable> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .ok_or(Error::BadName(name.to_string()))
    }

    /// Find the coordinate whose name matches `pattern`.
    ///
    /// A coordinate named exactly `pattern` wins. Otherwise exactly one coordinate name must
    /// contain `pattern`.
    ///
    pub fn find_coordinate(&self, pattern: &str) -> Result<&Variable> {
        if let Ok(coordinate) = self.coordinate(pattern) {
            return Ok(coordinate);
        }

        let mut candidates = self
            .coordinates
            .iter()
            .filter(|c| c.name.contains(pattern));
        match (candidates.next(), candidates.next()) {
            (Some(coordinate), None) => Ok(coordinate),
            (None, _) => Err(Error::TimeAxisNotFound(pattern.to_string())),
            (Some(_), Some(_)) => Err(Error::AmbiguousTimeAxis {
                pattern: pattern.to_string(),
                candidates: self
                    .coordinates
                    .iter()
                    .filter(|c| c.name.contains(pattern))
                    .map(|c| c.name.clone())
                    .collect(),
            }),
        }
    }

    /// Select along `dim` in every field that has it.
    ///
    pub fn isel(&self, dim: &str, selection: &Selection) -> Result<Self> {
        Ok(Self {
            coordinates: self
                .coordinates
                .iter()
                .map(|c| c.isel(dim, selection))
                .collect::<Result<_>>()?,
            variables: self
                .variables
                .iter()
                .map(|v| v.isel(dim, selection))
                .collect::<Result<_>>()?,
            attrs: self.attrs.clone(),
        })
    }

    /// Join `self` and `others`, in that order, along `dim`.
    ///
    /// Fields that have `dim` are concatenated with their namesakes in `others`. Fields
    /// without it are taken from `self` as they are. Encodings and attributes come from `self`.
    ///
    pub fn concat(&self, others: &[Dataset], dim: &str) -> Result<Self> {
        let join = |field: &Variable, class: FieldClass| -> Result<Variable> {
            let axis = match field.axis(dim) {
                Some(axis) => axis,
                None => return Ok(field.clone()),
            };

            let mut parts = Vec::with_capacity(others.len());
            for other in others {
                let part = other
                    .fields(class)
                    .iter()
                    .find(|f| f.name == field.name)
                    .ok_or(Error::BadName(field.name.clone()))?;
                if part.axis(dim) != Some(axis) {
                    return Err(Error::ShapeMismatch {
                        variable: field.name.clone(),
                        dim: dim.to_string(),
                        expected: field.dims.len(),
                        actual: part.dims.len(),
                    });
                }
                parts.push(&part.values);
            }

            Ok(Variable {
                values: field.values.concatenate(axis, &parts)?,
                ..field.clone()
            })
        };

        Ok(Self {
            coordinates: self
                .coordinates
                .iter()
                .map(|c| join(c, FieldClass::Coordinates))
                .collect::<Result<_>>()?,
            variables: self
                .variables
                .iter()
                .map(|v| join(v, FieldClass::DataVariables))
                .collect::<Result<_>>()?,
            attrs: self.attrs.clone(),
        })
    }
}
