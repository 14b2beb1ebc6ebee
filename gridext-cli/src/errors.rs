use std::io;
use std::path::PathBuf;
use std::result;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Extension(#[from] gridext::Error),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bad configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("environment variable {name} is not set (in {path:?})")]
    MissingEnvVar { name: String, path: String },

    #[error("`{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("no {attribute} attribute on variable {variable}")]
    MissingAttribute { variable: String, attribute: String },

    #[error("variable {variable} has unsupported type {vartype}")]
    UnsupportedType { variable: String, vartype: String },

    #[cfg(feature = "netcdf")]
    #[error(transparent)]
    Netcdf(#[from] netcdf::Error),
}

impl CliError {
    pub(crate) fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = result::Result<T, CliError>;
