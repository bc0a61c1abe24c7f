// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plane normalization
//!
//! Maps geographic samples into print-plate space. Each axis is scaled
//! independently, so the real-world aspect ratio between longitude and
//! latitude is not preserved.

use crate::error::{Error, Result};
use geoprint_core::{Extent, Sample};
use nalgebra::{DMatrix, Point3};
use serde::{Deserialize, Serialize};

/// Fewest points the surface and volume construction accept
pub const MIN_POINTS: usize = 4;

/// Sample position in plate space (millimetres)
pub type NormalizedPoint = Point3<f64>;

/// Extent of the print plate, in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateDimensions {
    /// X extent (longitude axis)
    pub width: f64,
    /// Y extent (latitude axis)
    pub depth: f64,
    /// Z extent (elevation axis)
    pub relief_height: f64,
}

impl PlateDimensions {
    pub fn new(width: f64, depth: f64, relief_height: f64) -> Self {
        Self {
            width,
            depth,
            relief_height,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("width", self.width),
            ("depth", self.depth),
            ("relief_height", self.relief_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::DegenerateGeometry(format!(
                    "plate {} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for PlateDimensions {
    fn default() -> Self {
        Self::new(150.0, 150.0, 30.0)
    }
}

/// Subnormal results are flushed to zero; the triangulator rejects them.
#[inline]
fn scale(value: f64, min: f64, range: f64, size: f64) -> f64 {
    let scaled = (value - min) / range * size;
    if scaled.abs() < f64::MIN_POSITIVE {
        0.0
    } else {
        scaled
    }
}

/// Normalize samples into plate space, preserving input order.
///
/// Fails with [`Error::InsufficientData`] below [`MIN_POINTS`] samples and
/// with [`Error::DegenerateGeometry`] when the planar positions do not span
/// two dimensions.
pub fn normalize(samples: &[Sample], plate: &PlateDimensions) -> Result<Vec<NormalizedPoint>> {
    plate.validate()?;

    if samples.len() < MIN_POINTS {
        return Err(Error::InsufficientData {
            found: samples.len(),
            required: MIN_POINTS,
        });
    }

    if let Some(index) = samples.iter().position(|s| {
        !(s.longitude.is_finite() && s.latitude.is_finite() && s.elevation.is_finite())
    }) {
        return Err(Error::DegenerateGeometry(format!(
            "sample {} has a non-finite coordinate",
            index
        )));
    }

    let extent = Extent::of(samples);
    let lon_range = extent.longitude_range();
    let lat_range = extent.latitude_range();
    let elev_range = extent.elevation_range();

    // A zero planar range means every point lies on one line
    if lon_range <= 0.0 || lat_range <= 0.0 {
        return Err(Error::DegenerateGeometry(format!(
            "points are collinear (longitude range {}, latitude range {})",
            lon_range, lat_range
        )));
    }

    let points: Vec<NormalizedPoint> = samples
        .iter()
        .map(|s| {
            let z = if elev_range > 0.0 {
                scale(s.elevation, extent.min_elevation, elev_range, plate.relief_height)
            } else {
                0.0
            };
            Point3::new(
                scale(s.longitude, extent.min_longitude, lon_range, plate.width),
                scale(s.latitude, extent.min_latitude, lat_range, plate.depth),
                z,
            )
        })
        .collect();

    let rank = planar_rank(&points);
    if rank < 2 {
        return Err(Error::DegenerateGeometry(format!(
            "points are collinear (planar rank {} < 2)",
            rank
        )));
    }

    tracing::debug!(
        points = points.len(),
        lon_range = lon_range,
        lat_range = lat_range,
        elevation_range = elev_range,
        "Normalized samples to plate space"
    );

    Ok(points)
}

/// Numerical rank of the (x, y) positions centred on the first point.
///
/// Singular values at or below `σ_max · max(rows, cols) · ε` count as zero.
pub fn planar_rank(points: &[NormalizedPoint]) -> usize {
    let Some(origin) = points.first() else {
        return 0;
    };

    let rows = points.len();
    let centred = DMatrix::from_fn(rows, 2, |r, c| {
        if c == 0 {
            points[r].x - origin.x
        } else {
            points[r].y - origin.y
        }
    });

    let singular_values = centred.singular_values();
    let sigma_max = singular_values.iter().copied().fold(0.0f64, f64::max);
    if sigma_max == 0.0 {
        return 0;
    }

    let tolerance = sigma_max * rows.max(2) as f64 * f64::EPSILON;
    singular_values.iter().filter(|&&s| s > tolerance).count()
}
