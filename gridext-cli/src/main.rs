//! Extend gridded emissions files past the end of their time series.
//!
//! ```bash
//! # Extend every file of each `*w_data*` class in ./config.yaml
//! gridext
//!
//! # Another config, another set of classes, debug logging
//! gridext --config runs/ssp585.yaml --class-filter ssp585 -v
//!
//! # RUST_LOG takes precedence over -v
//! RUST_LOG=gridext=trace gridext
//! ```

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use gridext_cli::{process_class, Config, DatasetStore, NcoFixer};

#[derive(Debug, Parser)]
#[command(name = "gridext", version, about = "Extend gridded emissions data into the future")]
struct Args {
    /// YAML file with one section per input class
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Only process input classes whose name contains this
    #[arg(long, default_value = "w_data")]
    class_filter: String,

    /// More logging, repeat for even more. Overridden by RUST_LOG.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn level(verbose: u8, config: &Config, filter: &str) -> &'static str {
    let moredebug = config.selected(filter).any(|(_, class)| class.moredebug);
    let debug = config.selected(filter).any(|(_, class)| class.debug);
    match verbose {
        _ if verbose >= 2 || moredebug => "trace",
        1 => "debug",
        _ if debug => "debug",
        _ => "info",
    }
}

#[cfg(feature = "netcdf")]
fn store() -> Result<Box<dyn DatasetStore>> {
    Ok(Box::new(gridext_cli::NetcdfStore))
}

#[cfg(not(feature = "netcdf"))]
fn store() -> Result<Box<dyn DatasetStore>> {
    anyhow::bail!("built without netCDF support, rebuild with `--features netcdf`")
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level(args.verbose, &config, &args.class_filter)));
    fmt().with_writer(io::stderr).with_env_filter(filter).init();

    let store = store()?;
    let fixer = NcoFixer;
    for (name, class) in config.selected(&args.class_filter) {
        let summary = process_class(name, class, store.as_ref(), &fixer)
            .with_context(|| format!("processing input class {}", name))?;
        info!(
            class = name,
            written = summary.written,
            skipped = summary.skipped,
            "input class done"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let args = Args::parse_from(["gridext"]);
        assert_eq!(args.config, PathBuf::from("config.yaml"));
        assert_eq!(args.class_filter, "w_data");
        assert_eq!(args.verbose, 0);

        let args = Args::parse_from(["gridext", "-c", "x.yaml", "--class-filter", "ssp", "-vv"]);
        assert_eq!(args.config, PathBuf::from("x.yaml"));
        assert_eq!(args.class_filter, "ssp");
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_level() -> gridext_cli::Result<()> {
        let config =
            Config::parse("a_w_data: {}\nb_w_data:\n  debug: true\nc:\n  moredebug: true\n")?;
        assert_eq!(level(0, &config, "w_data"), "debug");
        assert_eq!(level(0, &config, "a_w"), "info");
        assert_eq!(level(1, &config, "a_w"), "debug");
        assert_eq!(level(2, &config, "a_w"), "trace");
        assert_eq!(level(0, &config, "c"), "trace");

        Ok(())
    }
}
