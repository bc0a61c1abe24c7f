// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request and report types

use geoprint_core::{PointCloud, SelectionCriterion};
use geoprint_geometry::{MeshStats, PlateDimensions, StlFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the samples of a request come from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Source {
    /// CSV or JSON point-cloud files, merged in the given order
    Files { paths: Vec<PathBuf> },
    /// Datasets of a `locations.json` catalog whose footprint matches the criterion
    Catalog { path: PathBuf },
    /// Samples already in memory
    Samples { samples: PointCloud },
}

/// One point-cloud to STL job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshRequest {
    pub source: Source,
    pub criterion: SelectionCriterion,
    /// Destination owned by this request
    pub output: PathBuf,
    #[serde(default)]
    pub format: StlFormat,
    #[serde(default)]
    pub plate: PlateDimensions,
}

impl MeshRequest {
    pub fn new(source: Source, criterion: SelectionCriterion, output: impl Into<PathBuf>) -> Self {
        Self {
            source,
            criterion,
            output: output.into(),
            format: StlFormat::default(),
            plate: PlateDimensions::default(),
        }
    }

    pub fn with_format(mut self, format: StlFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_plate(mut self, plate: PlateDimensions) -> Self {
        self.plate = plate;
        self
    }
}

/// Outcome of a completed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshReport {
    pub output: PathBuf,
    pub format: StlFormat,
    /// Samples read from every source
    pub samples_loaded: usize,
    /// Samples that passed the selection
    pub samples_selected: usize,
    pub bytes_written: u64,
    #[serde(flatten)]
    pub mesh: MeshStats,
}
