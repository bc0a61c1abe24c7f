// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geospatial samples and their extents

use serde::{Deserialize, Serialize};

/// A single surface measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Degrees east
    pub longitude: f64,
    /// Degrees north
    pub latitude: f64,
    /// Surface elevation (metres for terrain, water surface elevation for SWOT)
    pub elevation: f64,
}

impl Sample {
    #[inline]
    pub fn new(longitude: f64, latitude: f64, elevation: f64) -> Self {
        Self {
            longitude,
            latitude,
            elevation,
        }
    }

    /// Euclidean distance in lon/lat degree space (not geodesic)
    #[inline]
    pub fn planar_distance_to(&self, lng: f64, lat: f64) -> f64 {
        let dx = self.longitude - lng;
        let dy = self.latitude - lat;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Ordered sequence of samples, kept in source order
pub type PointCloud = Vec<Sample>;

/// Per-axis min/max of a set of samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_elevation: f64,
    pub max_elevation: f64,
    /// Number of samples folded into the extent
    pub sample_count: usize,
}

impl Extent {
    /// Create new extent initialized to invalid state
    pub fn new() -> Self {
        Self {
            min_longitude: f64::MAX,
            max_longitude: f64::MIN,
            min_latitude: f64::MAX,
            max_latitude: f64::MIN,
            min_elevation: f64::MAX,
            max_elevation: f64::MIN,
            sample_count: 0,
        }
    }

    /// Compute the extent of a slice of samples
    pub fn of(samples: &[Sample]) -> Self {
        let mut extent = Self::new();
        for sample in samples {
            extent.expand(sample);
        }
        extent
    }

    /// Check if at least one sample was added
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.sample_count > 0
    }

    #[inline]
    pub fn expand(&mut self, sample: &Sample) {
        self.min_longitude = self.min_longitude.min(sample.longitude);
        self.max_longitude = self.max_longitude.max(sample.longitude);
        self.min_latitude = self.min_latitude.min(sample.latitude);
        self.max_latitude = self.max_latitude.max(sample.latitude);
        self.min_elevation = self.min_elevation.min(sample.elevation);
        self.max_elevation = self.max_elevation.max(sample.elevation);
        self.sample_count += 1;
    }

    #[inline]
    pub fn longitude_range(&self) -> f64 {
        self.max_longitude - self.min_longitude
    }

    #[inline]
    pub fn latitude_range(&self) -> f64 {
        self.max_latitude - self.min_latitude
    }

    #[inline]
    pub fn elevation_range(&self) -> f64 {
        self.max_elevation - self.min_elevation
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::new()
    }
}
