// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial selection of samples

use crate::catalog::BoundingBox;
use crate::error::{Error, Result};
use crate::sample::{PointCloud, Sample};
use serde::{Deserialize, Serialize};

/// Fewest samples a selection must keep for surface + volume synthesis
pub const MIN_SELECTED_POINTS: usize = 4;

/// Default radius of a proximity selection, in degrees
pub const DEFAULT_PROXIMITY_THRESHOLD: f64 = 0.1;

/// Spatial predicate applied to every sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionCriterion {
    /// Inclusive lon/lat rectangle
    BoundingBox {
        west: f64,
        east: f64,
        south: f64,
        north: f64,
    },
    /// Strictly within `threshold` degrees (planar, not geodesic) of a point
    Proximity { lng: f64, lat: f64, threshold: f64 },
}

impl SelectionCriterion {
    pub fn bounding_box(west: f64, east: f64, south: f64, north: f64) -> Self {
        SelectionCriterion::BoundingBox {
            west,
            east,
            south,
            north,
        }
    }

    /// Proximity selection with the default 0.1 degree threshold
    pub fn near(lng: f64, lat: f64) -> Self {
        SelectionCriterion::Proximity {
            lng,
            lat,
            threshold: DEFAULT_PROXIMITY_THRESHOLD,
        }
    }

    /// Reject parameters the predicate cannot evaluate.
    ///
    /// Inverted or unbounded boxes are accepted; they simply match nothing or
    /// everything and the count guard decides the outcome.
    pub fn validate(&self) -> Result<()> {
        match *self {
            SelectionCriterion::BoundingBox {
                west,
                east,
                south,
                north,
            } => {
                if [west, east, south, north].iter().any(|v| v.is_nan()) {
                    return Err(Error::InvalidSelection(
                        "bounding box edges must be numbers".to_string(),
                    ));
                }
            }
            SelectionCriterion::Proximity {
                lng,
                lat,
                threshold,
            } => {
                if lng.is_nan() || lat.is_nan() {
                    return Err(Error::InvalidSelection(
                        "query point must be a number".to_string(),
                    ));
                }
                if !(threshold > 0.0 && threshold.is_finite()) {
                    return Err(Error::InvalidSelection(format!(
                        "proximity threshold must be positive, got {}",
                        threshold
                    )));
                }
            }
        }
        Ok(())
    }

    #[inline]
    pub fn matches(&self, sample: &Sample) -> bool {
        match *self {
            SelectionCriterion::BoundingBox {
                west,
                east,
                south,
                north,
            } => {
                west <= sample.longitude
                    && sample.longitude <= east
                    && south <= sample.latitude
                    && sample.latitude <= north
            }
            SelectionCriterion::Proximity {
                lng,
                lat,
                threshold,
            } => sample.planar_distance_to(lng, lat) < threshold,
        }
    }

    /// Rectangle enclosing every sample the criterion can match
    pub fn footprint(&self) -> BoundingBox {
        match *self {
            SelectionCriterion::BoundingBox {
                west,
                east,
                south,
                north,
            } => BoundingBox::new(west, east, south, north),
            SelectionCriterion::Proximity {
                lng,
                lat,
                threshold,
            } => BoundingBox::new(lng - threshold, lng + threshold, lat - threshold, lat + threshold),
        }
    }
}

/// Keep the samples matching `criterion`, in input order, without the count guard
pub fn filter(cloud: &[Sample], criterion: &SelectionCriterion) -> PointCloud {
    cloud
        .iter()
        .filter(|sample| criterion.matches(sample))
        .copied()
        .collect()
}

/// Select samples from one cloud.
///
/// Fails with [`Error::InsufficientData`] when fewer than
/// [`MIN_SELECTED_POINTS`] samples pass.
pub fn select(cloud: &[Sample], criterion: &SelectionCriterion) -> Result<PointCloud> {
    select_from_sources([cloud], criterion)
}

/// Select samples from several clouds and merge them in source order
pub fn select_from_sources<'a, I>(sources: I, criterion: &SelectionCriterion) -> Result<PointCloud>
where
    I: IntoIterator<Item = &'a [Sample]>,
{
    criterion.validate()?;

    let mut total = 0usize;
    let mut selected = PointCloud::new();
    for cloud in sources {
        total += cloud.len();
        selected.extend(cloud.iter().filter(|sample| criterion.matches(sample)).copied());
    }

    tracing::info!(
        total = total,
        selected = selected.len(),
        "Filtered point cloud"
    );

    if selected.len() < MIN_SELECTED_POINTS {
        return Err(Error::InsufficientData {
            found: selected.len(),
            required: MIN_SELECTED_POINTS,
        });
    }

    Ok(selected)
}
