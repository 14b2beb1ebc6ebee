mod backup;
mod config;
mod discover;
mod errors;
#[cfg(feature = "netcdf")]
mod nc;
mod pipeline;
mod store;
mod units;

pub use backup::backup;
pub use backup::BackupOutcome;

pub use config::ClassConfig;
pub use config::Config;

pub use discover::discover;
pub use discover::expand_vars;

pub use errors::CliError;
pub use errors::Result;

#[cfg(feature = "netcdf")]
pub use nc::NetcdfStore;

pub use pipeline::process_class;
pub use pipeline::process_file;
pub use pipeline::ClassSummary;
pub use pipeline::FileOutcome;

pub use store::DatasetStore;

pub use units::canonical_time_units;
pub use units::NcoFixer;
pub use units::UnitsFixer;
