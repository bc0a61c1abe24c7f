// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GeoPrint Geometry Processing
//!
//! Turns a selected point cloud into a closed, printable terrain volume:
//! plate-space normalization, a Delaunay top surface (via
//! [spade](https://docs.rs/spade)), a convex boundary, vertical walls and a
//! flat base, serialized as STL.

pub mod closure;
pub mod error;
pub mod hull;
pub mod mesh;
pub mod normalize;
pub mod stl;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use closure::{base, side_walls};
pub use error::{Error, Result};
pub use hull::BoundaryLoop;
pub use mesh::{Facet, IndexedMesh, Mesh, MeshStats, TerrainMesh};
pub use normalize::{normalize, NormalizedPoint, PlateDimensions, MIN_POINTS};
pub use stl::{write_ascii, write_binary, write_stl, StlFormat};
pub use triangulation::{delaunay, is_delaunay, triangulate_surface, TriangleIndices};

use geoprint_core::Sample;

/// Build the closed terrain volume for a selection of samples.
///
/// Surface, walls and base are fully built before returning; any failure
/// leaves no partial mesh behind.
pub fn build_terrain_mesh(samples: &[Sample], plate: &PlateDimensions) -> Result<TerrainMesh> {
    let points = normalize(samples, plate)?;

    let triangles = triangulation::surface_triangles(&points)?;
    let surface = triangulation::lift(&points, &triangles);

    let boundary = BoundaryLoop::from_points(&points)?;
    let walls = side_walls(&points, &boundary);
    let bottom = base(&points, &boundary)?;

    let terrain = TerrainMesh::assemble(surface, walls, bottom, boundary.len());
    let stats = terrain.stats();
    tracing::info!(
        surface = stats.surface_facets,
        walls = stats.wall_facets,
        base = stats.base_facets,
        total = stats.facets,
        "Assembled terrain mesh"
    );

    Ok(terrain)
}
