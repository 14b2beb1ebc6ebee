use std::env;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::errors::{CliError, Result};

/// Expand `$NAME` and `${NAME}` references to environment variables in `path`.
///
/// A `$` not followed by a variable name is kept as is. Unset variables are an error.
///
pub fn expand_vars(path: &str) -> Result<String> {
    expand_with(path, |name| env::var(name).ok())
}

fn expand_with<F>(path: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut expanded = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find('$') {
        expanded.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let (name, consumed) = match after.strip_prefix('{') {
            Some(braced) => match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            },
            None => {
                let end = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                (&after[..end], end)
            }
        };

        if name.is_empty() {
            expanded.push('$');
            rest = after;
            continue;
        }

        let value = lookup(name).ok_or_else(|| CliError::MissingEnvVar {
            name: name.to_string(),
            path: path.to_string(),
        })?;
        expanded.push_str(&value);
        rest = &after[consumed..];
    }
    expanded.push_str(rest);

    Ok(expanded)
}

/// Files in `in_dir` named like `*<class>*.nc`, sorted by name.
///
pub fn discover(class: &str, in_dir: &str) -> Result<Vec<PathBuf>> {
    let dir = PathBuf::from(expand_vars(in_dir)?);
    let entries = fs::read_dir(&dir).map_err(|err| CliError::io(&dir, err))?;

    let mut files = vec![];
    for entry in entries {
        let entry = entry.map_err(|err| CliError::io(&dir, err))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !(name.ends_with(".nc") && name[..name.len() - 3].contains(class)) {
            continue;
        }

        let file_type = entry.file_type().map_err(|err| CliError::io(entry.path(), err))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    debug!(class, dir = %dir.display(), found = files.len(), "discovered input files");

    Ok(files)
}
