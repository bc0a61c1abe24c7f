// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Convex boundary of the planar point set

use crate::error::{Error, Result};
use crate::normalize::NormalizedPoint;
use robust::Coord;
use std::cmp::Ordering;

#[inline]
fn orient(a: &NormalizedPoint, b: &NormalizedPoint, c: &NormalizedPoint) -> f64 {
    robust::orient2d(
        Coord { x: a.x, y: a.y },
        Coord { x: b.x, y: b.y },
        Coord { x: c.x, y: c.y },
    )
}

/// Counter-clockwise loop of point indices around the convex hull.
///
/// Points lying on a hull edge stay in the loop, so every loop edge is also
/// an edge of the Delaunay surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    indices: Vec<usize>,
}

impl BoundaryLoop {
    /// Compute the hull of the (x, y) projection with Andrew's monotone chain.
    ///
    /// Repeated positions count once, by their first occurrence.
    pub fn from_points(points: &[NormalizedPoint]) -> Result<Self> {
        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by(|&a, &b| {
            let (pa, pb) = (&points[a], &points[b]);
            pa.x.partial_cmp(&pb.x)
                .unwrap_or(Ordering::Equal)
                .then(pa.y.partial_cmp(&pb.y).unwrap_or(Ordering::Equal))
                .then(a.cmp(&b))
        });
        order.dedup_by(|later, earlier| {
            points[*later].x == points[*earlier].x && points[*later].y == points[*earlier].y
        });

        if order.len() < 3 {
            return Err(Error::DegenerateGeometry(format!(
                "hull needs at least 3 distinct positions, got {}",
                order.len()
            )));
        }

        // Only strict clockwise turns are removed
        let mut chain: Vec<usize> = Vec::with_capacity(order.len() + 1);
        let sweep = |chain: &mut Vec<usize>, floor: usize, index: usize| {
            while chain.len() >= floor + 2 {
                let n = chain.len();
                if orient(&points[chain[n - 2]], &points[chain[n - 1]], &points[index]) < 0.0 {
                    chain.pop();
                } else {
                    break;
                }
            }
            chain.push(index);
        };

        for &index in &order {
            sweep(&mut chain, 0, index);
        }
        let lower_len = chain.len();
        for &index in order.iter().rev().skip(1) {
            sweep(&mut chain, lower_len - 1, index);
        }
        // The upper chain ends where the lower one started
        chain.pop();

        let hull = Self { indices: chain };
        if hull.area(points) <= 0.0 {
            return Err(Error::DegenerateGeometry(
                "convex hull has no area".to_string(),
            ));
        }

        tracing::debug!(vertices = hull.len(), "Extracted boundary loop");
        Ok(hull)
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Consecutive index pairs, wrapping from last to first
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.indices.len();
        (0..n).map(move |i| (self.indices[i], self.indices[(i + 1) % n]))
    }

    /// Shoelace area of the loop polygon; positive for counter-clockwise
    pub fn area(&self, points: &[NormalizedPoint]) -> f64 {
        let twice: f64 = self
            .edges()
            .map(|(c, n)| {
                let (pc, pn) = (&points[c], &points[n]);
                pc.x * pn.y - pn.x * pc.y
            })
            .sum();
        0.5 * twice
    }
}
