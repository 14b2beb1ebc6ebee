//! Post-write cleanup of the time units attribute.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::errors::{CliError, Result};

/// Time units with a canonical `00:00:00` time of day, or `None` if nothing needs changing.
///
/// A trailing `0:0:0` time of day is rewritten. Units without any time of day get one appended.
/// Any other time of day is left alone.
///
pub fn canonical_time_units(units: &str) -> Option<String> {
    let units = units.trim_end();
    if let Some(date) = units.strip_suffix(" 0:0:0") {
        return Some(format!("{} 00:00:00", date));
    }

    let has_time_of_day = units
        .split_whitespace()
        .last()
        .map_or(false, |token| token.contains(':'));
    if has_time_of_day {
        None
    } else {
        Some(format!("{} 00:00:00", units))
    }
}

/// Something that can rewrite the time units of a file already on disk.
pub trait UnitsFixer {
    /// Make the units attribute of `timevar` in `path` canonical. Returns the new units if the
    /// file was changed.
    fn fix(&self, path: &Path, timevar: &str) -> Result<Option<String>>;
}

/// Fixes units with the NCO and netCDF command line tools (`ncdump` and `ncatted`).
///
#[derive(Clone, Debug, Default)]
pub struct NcoFixer;

impl UnitsFixer for NcoFixer {
    fn fix(&self, path: &Path, timevar: &str) -> Result<Option<String>> {
        let header = run(Command::new("ncdump").arg("-h").arg(path))?;
        let units = header_units(&header, timevar).ok_or_else(|| CliError::MissingAttribute {
            variable: timevar.to_string(),
            attribute: String::from("units"),
        })?;

        let fixed = match canonical_time_units(&units) {
            Some(fixed) => fixed,
            None => return Ok(None),
        };
        info!(file = %path.display(), from = %units, to = %fixed, "rewriting time units");
        run(Command::new("ncatted")
            .arg("-O")
            .arg("-a")
            .arg(format!("units,{},o,c,{}", timevar, fixed))
            .arg(path))?;

        Ok(Some(fixed))
    }
}

fn run(command: &mut Command) -> Result<String> {
    let display = format!("{:?}", command);
    let command_line = display.as_str();
    debug!(command = %command_line, "running");
    let output = command
        .output()
        .map_err(|err| CliError::io(display.clone(), err))?;

    if !output.status.success() {
        return Err(CliError::Command {
            command: display,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Value of `<timevar>:units` in `ncdump -h` output
fn header_units(header: &str, timevar: &str) -> Option<String> {
    let key = format!("{}:units", timevar);
    header
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(&key) && line[key.len()..].trim_start().starts_with('='))
        .and_then(|line| line.split('"').nth(1))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_time_units() {
        assert_eq!(
            canonical_time_units("days since 1850-01-01 0:0:0"),
            Some(String::from("days since 1850-01-01 00:00:00"))
        );
        assert_eq!(
            canonical_time_units("days since 1850-01-01"),
            Some(String::from("days since 1850-01-01 00:00:00"))
        );
        assert_eq!(canonical_time_units("days since 1850-01-01 00:00:00"), None);
        assert_eq!(canonical_time_units("hours since 2000-01-01 00:00:00.0"), None);
        assert_eq!(canonical_time_units("hours since 2000-01-01 10:0:0"), None);
        assert_eq!(canonical_time_units("hours since 2000-01-01 12:30:00"), None);
        assert_eq!(
            canonical_time_units("hours since 2000-01-01 0:0:0 "),
            Some(String::from("hours since 2000-01-01 00:00:00"))
        );
    }

    #[test]
    fn test_header_units() {
        let header = r#"netcdf CO2_w_data {
dimensions:
	time = UNLIMITED ; // (36 currently)
	lat = 3 ;
variables:
	double time(time) ;
		time:units = "days since 1850-01-01 0:0:0" ;
		time:calendar = "noleap" ;
	double time_bnds(time, bnds) ;
		time_bnds:units = "days since 1750-01-01" ;
}"#;
        assert_eq!(
            header_units(header, "time"),
            Some(String::from("days since 1850-01-01 0:0:0"))
        );
        assert_eq!(
            header_units(header, "time_bnds"),
            Some(String::from("days since 1750-01-01"))
        );
        assert_eq!(header_units(header, "lat"), None);
    }
}
