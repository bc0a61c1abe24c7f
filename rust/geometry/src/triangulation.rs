// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Delaunay triangulation of planar point sets

use crate::error::{Error, Result};
use crate::mesh::Facet;
use crate::normalize::NormalizedPoint;
use nalgebra::Point2;
use robust::Coord;
use rustc_hash::FxHashMap;
use spade::{DelaunayTriangulation, Triangulation};

/// Triangle as indices into the input point slice, counter-clockwise
pub type TriangleIndices = [usize; 3];

/// Triangulate the given points.
///
/// Returned indices refer to `points`. Points sharing an exact position are
/// merged; the first occurrence is the one referenced.
pub fn delaunay(points: &[Point2<f64>]) -> Result<Vec<TriangleIndices>> {
    let mut triangulation: DelaunayTriangulation<spade::Point2<f64>> =
        DelaunayTriangulation::new();
    let mut input_index: FxHashMap<usize, usize> = FxHashMap::default();
    input_index.reserve(points.len());

    for (i, point) in points.iter().enumerate() {
        let handle = triangulation
            .insert(spade::Point2::new(point.x, point.y))
            .map_err(|e| Error::Triangulation(format!("point {}: {:?}", i, e)))?;
        input_index.entry(handle.index()).or_insert(i);
    }

    let merged = points.len() - input_index.len();
    if merged > 0 {
        tracing::debug!(merged = merged, "Merged duplicate planar positions");
    }

    let mut triangles = Vec::with_capacity(triangulation.num_inner_faces());
    for face in triangulation.inner_faces() {
        let [a, b, c] = face.vertices();
        let lookup = |v: usize| {
            input_index
                .get(&v)
                .copied()
                .ok_or_else(|| Error::Triangulation(format!("unmapped vertex {}", v)))
        };
        triangles.push([
            lookup(a.fix().index())?,
            lookup(b.fix().index())?,
            lookup(c.fix().index())?,
        ]);
    }

    Ok(triangles)
}

/// Triangulate the planar projection of the normalized points.
///
/// Fails with [`Error::DegenerateGeometry`] if no triangle can be formed.
pub fn surface_triangles(points: &[NormalizedPoint]) -> Result<Vec<TriangleIndices>> {
    let projected: Vec<Point2<f64>> = points.iter().map(|p| p.xy()).collect();
    let triangles = delaunay(&projected)?;

    if triangles.is_empty() {
        return Err(Error::DegenerateGeometry(
            "surface triangulation produced no triangles".to_string(),
        ));
    }

    tracing::debug!(
        points = points.len(),
        triangles = triangles.len(),
        "Triangulated surface"
    );
    Ok(triangles)
}

/// Lift index triangles to facets using the full 3D positions
pub fn lift(points: &[NormalizedPoint], triangles: &[TriangleIndices]) -> Vec<Facet> {
    triangles
        .iter()
        .map(|&[a, b, c]| Facet::new(points[a], points[b], points[c]))
        .collect()
}

/// Triangulate the top surface and lift it to facets facing +z
pub fn triangulate_surface(points: &[NormalizedPoint]) -> Result<Vec<Facet>> {
    let triangles = surface_triangles(points)?;
    Ok(lift(points, &triangles))
}

#[inline]
fn coord(p: &Point2<f64>) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

/// Check the empty-circumcircle property with exact predicates.
///
/// Points on a circumcircle are accepted; only strictly interior points fail.
pub fn is_delaunay(points: &[Point2<f64>], triangles: &[TriangleIndices]) -> bool {
    triangles.iter().all(|&[a, b, c]| {
        let (pa, pb, pc) = (&points[a], &points[b], &points[c]);
        let ccw = robust::orient2d(coord(pa), coord(pb), coord(pc)) > 0.0;
        let (pb, pc) = if ccw { (pb, pc) } else { (pc, pb) };

        points.iter().enumerate().all(|(i, p)| {
            i == a
                || i == b
                || i == c
                || robust::incircle(coord(pa), coord(pb), coord(pc), coord(p)) <= 0.0
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn square_with_centre() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(4.0, 6.0),
        ]
    }

    fn signed_area(points: &[Point2<f64>], [a, b, c]: TriangleIndices) -> f64 {
        let (pa, pb, pc) = (points[a], points[b], points[c]);
        0.5 * ((pb.x - pa.x) * (pc.y - pa.y) - (pc.x - pa.x) * (pb.y - pa.y))
    }

    #[test]
    fn test_delaunay_covers_square() {
        let points = square_with_centre();
        let triangles = delaunay(&points).unwrap();

        assert_eq!(triangles.len(), 4);
        assert!(is_delaunay(&points, &triangles));

        let area: f64 = triangles.iter().map(|&t| signed_area(&points, t)).sum();
        assert!((area - 100.0).abs() < 1e-9);
        // Counter-clockwise winding
        assert!(triangles.iter().all(|&t| signed_area(&points, t) > 0.0));
    }

    #[test]
    fn test_duplicates_reference_first_occurrence() {
        let mut points = square_with_centre();
        points.push(Point2::new(4.0, 6.0));
        points.push(Point2::new(0.0, 0.0));

        let triangles = delaunay(&points).unwrap();
        assert_eq!(triangles.len(), 4);
        assert!(triangles.iter().flatten().all(|&i| i < 5));
    }

    #[test]
    fn test_collinear_surface_is_degenerate() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
            Point3::new(3.0, 3.0, 3.0),
        ];
        assert!(matches!(
            surface_triangles(&points),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_surface_facets_face_up() {
        let points: Vec<NormalizedPoint> = square_with_centre()
            .iter()
            .enumerate()
            .map(|(i, p)| Point3::new(p.x, p.y, i as f64))
            .collect();

        let facets = triangulate_surface(&points).unwrap();
        assert_eq!(facets.len(), 4);
        assert!(facets.iter().all(|f| f.normal().z > 0.0));
    }

    #[test]
    fn test_is_delaunay_rejects_bad_diagonal() {
        // Long thin quad: the 0-2 diagonal leaves 3 inside the circumcircle of (0, 1, 2)
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(5.0, -1.0),
            Point2::new(10.0, 0.0),
            Point2::new(5.0, 1.0),
        ];
        let bad = vec![[0, 1, 2], [0, 2, 3]];
        assert!(!is_delaunay(&points, &bad));

        let good = delaunay(&points).unwrap();
        assert!(is_delaunay(&points, &good));
    }

    #[test]
    fn test_nan_is_rejected() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(f64::NAN, 1.0),
            Point2::new(1.0, 1.0),
        ];
        assert!(matches!(delaunay(&points), Err(Error::Triangulation(_))));
    }
}
