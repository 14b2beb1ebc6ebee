//! The YAML configuration: one section per input class.

use std::fs;
use std::path::Path;

use gridext::{Cadence, ExtendOptions};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::errors::{CliError, Result};

/// Settings for one input class, i.e. one group of files sharing a name fragment.
///
/// Keys missing from the file take the defaults below. Unknown keys are ignored.
///
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassConfig {
    /// Directory holding the files. `$VAR` and `${VAR}` are expanded.
    pub in_dir: String,

    /// Cadence, anything containing "monthly" or "annual"
    pub freq: String,

    pub offset: usize,

    #[serde(rename = "yearappend")]
    pub years_to_append: i32,

    pub fill_in: bool,

    pub timevar: String,
    pub latvar: String,
    pub lonvar: String,

    /// Leave times as raw numbers instead of decoding them to dates
    pub no_decode: bool,

    /// Verify each extension before writing it
    pub debug: bool,

    pub moredebug: bool,
}

impl Default for ClassConfig {
    fn default() -> Self {
        let defaults = ExtendOptions::default();
        Self {
            in_dir: String::from("."),
            freq: defaults.cadence.to_string(),
            offset: defaults.offset,
            years_to_append: defaults.years_to_append,
            fill_in: defaults.fill_in,
            timevar: defaults.time_axis,
            latvar: defaults.lat_axis,
            lonvar: defaults.lon_axis,
            no_decode: !defaults.decode_times,
            debug: false,
            moredebug: false,
        }
    }
}

impl ClassConfig {
    pub fn cadence(&self) -> Result<Cadence> {
        Ok(self.freq.parse::<Cadence>()?)
    }

    pub fn extend_options(&self) -> Result<ExtendOptions> {
        Ok(ExtendOptions {
            cadence: self.cadence()?,
            offset: self.offset,
            years_to_append: self.years_to_append,
            fill_in: self.fill_in,
            time_axis: self.timevar.clone(),
            lat_axis: self.latvar.clone(),
            lon_axis: self.lonvar.clone(),
            decode_times: !self.no_decode,
        })
    }
}

/// All input classes, in the order they appear in the file.
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Config {
    pub classes: IndexMap<String, ClassConfig>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| CliError::io(path, err))?;

        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Classes whose name contains `filter`, in file order
    pub fn selected<'a>(
        &'a self,
        filter: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a ClassConfig)> + 'a {
        self.classes
            .iter()
            .filter(move |(name, _)| name.contains(filter))
            .map(|(name, class)| (name.as_str(), class))
    }
}
