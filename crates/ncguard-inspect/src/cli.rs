use std::path::PathBuf;

use clap::Parser;
use ncguard_core::AccessMode;

/// Open netCDF datasets and report what they contain.
///
/// Library options are passed as `--netcdf.KEY=VALUE`, for example
/// `--netcdf.chunk_cache_size=67108864`.
#[derive(Parser, Debug)]
#[command(name = "ncguard-inspect", about = "Inspect netCDF datasets")]
pub struct CliArgs {
    /// Datasets to inspect
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Open for writing instead of read-only
    #[arg(short = 'w', long = "write")]
    pub write: bool,

    /// Emit a JSON document on stdout
    #[arg(long = "json")]
    pub json: bool,

    /// Verbosity (repeat for higher levels)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CliArgs {
    pub fn access_mode(&self) -> AccessMode {
        if self.write {
            AccessMode::Write
        } else {
            AccessMode::Read
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
