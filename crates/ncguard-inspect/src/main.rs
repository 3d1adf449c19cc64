mod cli;
mod report;

use std::process::ExitCode;

use clap::Parser;
use ncguard_backend_netcdf::NetcdfLibrary;
use ncguard_core::{Library, OptionValue, extract_library_options};
use tracing_subscriber::EnvFilter;

use cli::CliArgs;
use report::{FileReport, InspectDocument};

fn main() -> ExitCode {
    let raw_args: Vec<String> = std::env::args().collect();
    let (filtered_args, library_options) = extract_library_options(raw_args);
    let args = CliArgs::parse_from(filtered_args);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut lib = NetcdfLibrary::new();
    if !NetcdfLibrary::is_linked() {
        tracing::warn!("built without libnetcdf; every dataset will fail to open");
    }
    for (key, value) in library_options.for_prefix("netcdf") {
        match value {
            OptionValue::Flag => tracing::info!("netcdf.{key} = true"),
            OptionValue::Str(s) => tracing::info!("netcdf.{key} = {s}"),
        }
    }
    if let Err(e) = lib.configure(&library_options) {
        eprintln!("ERROR: invalid library option: {e}");
        return ExitCode::FAILURE;
    }

    let mode = args.access_mode();
    let files: Vec<FileReport> = args
        .paths
        .iter()
        .map(|path| report::inspect(&lib, path, mode))
        .collect();
    let failed = files.iter().any(FileReport::is_failure);

    if args.json {
        let doc = InspectDocument {
            library: format!("{} {}", lib.name(), lib.version()),
            files,
        };
        match serde_json::to_string_pretty(&doc) {
            Ok(json_str) => println!("{json_str}"),
            Err(e) => {
                eprintln!("ERROR: failed to serialize JSON: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for file in &files {
            println!("{}", file.text_line());
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
