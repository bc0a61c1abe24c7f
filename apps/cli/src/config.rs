// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables.

use geoprint_core::DEFAULT_PROXIMITY_THRESHOLD;
use geoprint_geometry::{PlateDimensions, StlFormat};

/// Defaults applied before command-line overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Plate X extent in millimetres.
    pub plate_width: f64,
    /// Plate Y extent in millimetres.
    pub plate_depth: f64,
    /// Maximum relief height in millimetres.
    pub relief_height: f64,
    /// Radius of `--near` selections, in degrees.
    pub proximity_threshold: f64,
    /// Output format when `--ascii` is not given.
    pub stl_format: StlFormat,
    /// Number of worker threads for parallel loading.
    pub worker_threads: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars<F: Fn(&str) -> Option<String>>(var: F) -> Self {
        let defaults = PlateDimensions::default();
        Self {
            plate_width: var("GEOPRINT_PLATE_WIDTH")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.width),
            plate_depth: var("GEOPRINT_PLATE_DEPTH")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.depth),
            relief_height: var("GEOPRINT_RELIEF_HEIGHT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.relief_height),
            proximity_threshold: var("GEOPRINT_PROXIMITY_THRESHOLD")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PROXIMITY_THRESHOLD),
            stl_format: var("GEOPRINT_STL_FORMAT")
                .and_then(|v| StlFormat::from_name(&v))
                .unwrap_or_default(),
            worker_threads: var("GEOPRINT_WORKER_THREADS")
                .unwrap_or_else(|| num_cpus::get().to_string())
                .parse()
                .unwrap_or_else(|_| num_cpus::get()),
        }
    }

    pub fn plate(&self) -> PlateDimensions {
        PlateDimensions::new(self.plate_width, self.plate_depth, self.relief_height)
    }
}
