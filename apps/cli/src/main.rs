// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GeoPrint CLI - turn geospatial point clouds into printable STL terrain.
//!
//! Usage:
//!   geoprint --csv <file> --near <lng> <lat> --output <file.stl> [options]

use anyhow::{Context, Result};
use std::process::ExitCode;

mod args;
mod config;

use args::{parse_args, Command};
use config::Config;

fn main() -> ExitCode {
    // Initialize logging; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,geoprint=debug".into()),
        )
        .with_writer(std::io::stderr)
        .pretty()
        .init();

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn try_main() -> Result<()> {
    let options = match parse_args(std::env::args().skip(1))? {
        Command::Help => {
            print_usage();
            return Ok(());
        }
        Command::Version => {
            println!("geoprint {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Generate(options) => options,
    };

    let config = Config::from_env();
    tracing::debug!(
        plate_width = config.plate_width,
        plate_depth = config.plate_depth,
        relief_height = config.relief_height,
        proximity_threshold = config.proximity_threshold,
        stl_format = config.stl_format.as_str(),
        worker_threads = config.worker_threads,
        "Loaded configuration"
    );

    // Initialize rayon thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
        .context("Failed to initialize rayon thread pool")?;

    let request = options.into_request(&config)?;
    let report = geoprint_processing::run(&request)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_usage() {
    println!(
        r#"GeoPrint - point cloud to printable terrain
============================================

Selects samples from CSV/JSON point clouds, triangulates the terrain surface
and closes it into a solid (walls + base) written as STL.

USAGE:
  geoprint --csv <file> [--csv <file>...] <SELECTION> --output <file.stl> [OPTIONS]
  geoprint --catalog <locations.json> <SELECTION> --output <file.stl> [OPTIONS]

SELECTION:
  --bbox <W> <E> <S> <N>          Inclusive longitude/latitude box
  --west <W> --east <E> --south <S> --north <N>
                                  Same box, one edge per flag
  --near <LNG> <LAT>              Samples closer than the threshold (degrees)

OPTIONS:
  -o, --output <path>             Destination STL file
  --ascii                         Write ASCII STL instead of binary
  --threshold <deg>               Proximity radius (default: 0.1)
  --plate-width <mm>              Plate X extent (default: 150)
  --plate-depth <mm>              Plate Y extent (default: 150)
  --relief-height <mm>            Maximum relief height (default: 30)
  -V, --version                   Print version
  -h, --help                      Show this help message

ENVIRONMENT:
  GEOPRINT_PLATE_WIDTH, GEOPRINT_PLATE_DEPTH, GEOPRINT_RELIEF_HEIGHT,
  GEOPRINT_PROXIMITY_THRESHOLD, GEOPRINT_STL_FORMAT (binary|ascii),
  GEOPRINT_WORKER_THREADS, RUST_LOG (default: info,geoprint=debug)"#
    );
}
