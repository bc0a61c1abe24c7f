// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line parsing

use crate::config::Config;
use anyhow::{anyhow, bail, Context, Result};
use geoprint_core::SelectionCriterion;
use geoprint_geometry::StlFormat;
use geoprint_processing::{MeshRequest, Source};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    BoundingBox {
        west: f64,
        east: f64,
        south: f64,
        north: f64,
    },
    Near {
        lng: f64,
        lat: f64,
    },
}

/// Parsed `generate` invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    pub csv: Vec<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub selection: Option<Selection>,
    pub output: Option<PathBuf>,
    pub ascii: bool,
    pub threshold: Option<f64>,
    pub plate_width: Option<f64>,
    pub plate_depth: Option<f64>,
    pub relief_height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Version,
    Generate(Options),
}

struct Cursor<I: Iterator<Item = String>> {
    args: I,
}

impl<I: Iterator<Item = String>> Cursor<I> {
    fn value(&mut self, flag: &str) -> Result<String> {
        self.args
            .next()
            .ok_or_else(|| anyhow!("{} expects a value", flag))
    }

    fn number(&mut self, flag: &str) -> Result<f64> {
        let raw = self.value(flag)?;
        let value: f64 = raw
            .parse()
            .with_context(|| format!("Invalid number for {}: {:?}", flag, raw))?;
        if !value.is_finite() {
            bail!("Invalid number for {}: {:?}", flag, raw);
        }
        Ok(value)
    }
}

fn set_selection(options: &mut Options, selection: Selection) -> Result<()> {
    if options.selection.is_some() {
        bail!("Only one of --bbox, --west/--east/--south/--north or --near may be given");
    }
    options.selection = Some(selection);
    Ok(())
}

/// Parse arguments, excluding the program name
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command> {
    let mut cursor = Cursor {
        args: args.into_iter(),
    };
    let mut options = Options::default();
    let mut edges: [Option<f64>; 4] = [None; 4];

    while let Some(arg) = cursor.args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "--csv" => options.csv.push(PathBuf::from(cursor.value("--csv")?)),
            "--catalog" => options.catalog = Some(PathBuf::from(cursor.value("--catalog")?)),
            "--output" | "-o" => options.output = Some(PathBuf::from(cursor.value("--output")?)),
            "--ascii" => options.ascii = true,
            "--bbox" => {
                let west = cursor.number("--bbox")?;
                let east = cursor.number("--bbox")?;
                let south = cursor.number("--bbox")?;
                let north = cursor.number("--bbox")?;
                set_selection(
                    &mut options,
                    Selection::BoundingBox {
                        west,
                        east,
                        south,
                        north,
                    },
                )?;
            }
            "--west" => edges[0] = Some(cursor.number("--west")?),
            "--east" => edges[1] = Some(cursor.number("--east")?),
            "--south" => edges[2] = Some(cursor.number("--south")?),
            "--north" => edges[3] = Some(cursor.number("--north")?),
            "--near" => {
                let lng = cursor.number("--near")?;
                let lat = cursor.number("--near")?;
                set_selection(&mut options, Selection::Near { lng, lat })?;
            }
            "--threshold" => options.threshold = Some(cursor.number("--threshold")?),
            "--plate-width" => options.plate_width = Some(cursor.number("--plate-width")?),
            "--plate-depth" => options.plate_depth = Some(cursor.number("--plate-depth")?),
            "--relief-height" => options.relief_height = Some(cursor.number("--relief-height")?),
            other => bail!("Unknown option: {}", other),
        }
    }

    match edges {
        [None, None, None, None] => {}
        [Some(west), Some(east), Some(south), Some(north)] => set_selection(
            &mut options,
            Selection::BoundingBox {
                west,
                east,
                south,
                north,
            },
        )?,
        _ => bail!("--west, --east, --south and --north must be given together"),
    }

    Ok(Command::Generate(options))
}

impl Options {
    /// Combine the options with environment defaults into a pipeline request
    pub fn into_request(self, config: &Config) -> Result<MeshRequest> {
        let source = match (self.csv.is_empty(), self.catalog) {
            (false, None) => Source::Files { paths: self.csv },
            (true, Some(path)) => Source::Catalog { path },
            (false, Some(_)) => bail!("--csv and --catalog cannot be combined"),
            (true, None) => bail!("No input given: pass --csv <file> or --catalog <locations.json>"),
        };

        let criterion = match self
            .selection
            .context("No selection given: pass --bbox, --west/--east/--south/--north or --near")?
        {
            Selection::BoundingBox {
                west,
                east,
                south,
                north,
            } => SelectionCriterion::bounding_box(west, east, south, north),
            Selection::Near { lng, lat } => SelectionCriterion::Proximity {
                lng,
                lat,
                threshold: self.threshold.unwrap_or(config.proximity_threshold),
            },
        };

        let output = self.output.context("No destination given: pass --output <file.stl>")?;

        let mut plate = config.plate();
        plate.width = self.plate_width.unwrap_or(plate.width);
        plate.depth = self.plate_depth.unwrap_or(plate.depth);
        plate.relief_height = self.relief_height.unwrap_or(plate.relief_height);

        let format = if self.ascii {
            StlFormat::Ascii
        } else {
            config.stl_format
        };

        Ok(MeshRequest::new(source, criterion, output)
            .with_format(format)
            .with_plate(plate))
    }
}
