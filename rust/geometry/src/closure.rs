// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Side walls and base that close the terrain surface into a solid

use crate::error::Result;
use crate::hull::BoundaryLoop;
use crate::mesh::Facet;
use crate::normalize::NormalizedPoint;
use crate::triangulation::delaunay;
use nalgebra::{Point2, Point3};

#[inline]
fn bottom(point: &NormalizedPoint) -> Point3<f64> {
    Point3::new(point.x, point.y, 0.0)
}

/// Vertical skirt between each boundary edge and its projection onto z = 0.
///
/// Emits two facets per loop edge; a counter-clockwise loop yields outward
/// facing walls.
pub fn side_walls(points: &[NormalizedPoint], boundary: &BoundaryLoop) -> Vec<Facet> {
    let mut walls = Vec::with_capacity(boundary.len() * 2);

    for (current, next) in boundary.edges() {
        let top_current = points[current];
        let top_next = points[next];
        let bottom_current = bottom(&top_current);
        let bottom_next = bottom(&top_next);

        walls.push(Facet::new(top_current, bottom_current, bottom_next));
        walls.push(Facet::new(top_current, bottom_next, top_next));
    }

    walls
}

/// Flat base at z = 0 spanning the boundary loop, facing -z.
///
/// Requires a convex boundary: the Delaunay triangulation of the loop
/// vertices tiles the loop polygon only because the loop is its own convex
/// hull. A non-convex outline would need a constrained triangulation.
pub fn base(points: &[NormalizedPoint], boundary: &BoundaryLoop) -> Result<Vec<Facet>> {
    let outline: Vec<Point2<f64>> = boundary
        .indices()
        .iter()
        .map(|&i| points[i].xy())
        .collect();

    let triangles = delaunay(&outline)?;
    let base: Vec<Facet> = triangles
        .iter()
        .map(|&[a, b, c]| {
            let vertex = |k: usize| bottom(&points[boundary.indices()[k]]);
            // Reverse winding for bottom cap
            Facet::new(vertex(a), vertex(c), vertex(b))
        })
        .collect();

    tracing::debug!(facets = base.len(), "Triangulated base");
    Ok(base)
}
