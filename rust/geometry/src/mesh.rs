// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Triangle with its own vertex copies; winding defines the outward side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub vertices: [Point3<f64>; 3],
}

impl Facet {
    #[inline]
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Same triangle with opposite winding
    #[inline]
    pub fn flipped(&self) -> Self {
        let [a, b, c] = self.vertices;
        Self::new(a, c, b)
    }

    /// Unnormalized normal from the winding
    #[inline]
    pub fn cross(&self) -> Vector3<f64> {
        let [a, b, c] = &self.vertices;
        (b - a).cross(&(c - a))
    }

    /// Unit normal, zero for degenerate facets
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.cross()
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::zeros)
    }

    #[inline]
    pub fn area(&self) -> f64 {
        0.5 * self.cross().norm()
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.cross().norm_squared() == 0.0
    }
}

/// Facet soup
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub facets: Vec<Facet>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self { facets: Vec::new() }
    }

    pub fn with_capacity(facet_count: usize) -> Self {
        Self {
            facets: Vec::with_capacity(facet_count),
        }
    }

    #[inline]
    pub fn push(&mut self, facet: Facet) {
        self.facets.push(facet);
    }

    /// Append facets, keeping their order
    #[inline]
    pub fn extend<I: IntoIterator<Item = Facet>>(&mut self, facets: I) {
        self.facets.extend(facets);
    }

    /// Merge another mesh into this one
    #[inline]
    pub fn merge(&mut self, other: &Mesh) {
        self.facets.extend_from_slice(&other.facets);
    }

    #[inline]
    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Facet> {
        self.facets.iter()
    }

    /// Calculate bounds (min, max)
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        for vertex in self.facets.iter().flat_map(|f| f.vertices.iter()) {
            min.x = min.x.min(vertex.x);
            min.y = min.y.min(vertex.y);
            min.z = min.z.min(vertex.z);
            max.x = max.x.max(vertex.x);
            max.y = max.y.max(vertex.y);
            max.z = max.z.max(vertex.z);
        }

        (min, max)
    }

    /// Total surface area
    pub fn area(&self) -> f64 {
        self.facets.iter().map(Facet::area).sum()
    }

    /// Share vertices with identical positions
    pub fn to_indexed(&self) -> IndexedMesh {
        let mut indexed = IndexedMesh::with_capacity(self.facets.len() / 2 + 3, self.facets.len());
        let mut lookup: FxHashMap<[u64; 3], u32> = FxHashMap::default();

        for facet in &self.facets {
            let mut triangle = [0u32; 3];
            for (slot, vertex) in triangle.iter_mut().zip(facet.vertices.iter()) {
                // +0.0 folds -0.0 onto 0.0
                let key = [
                    (vertex.x + 0.0).to_bits(),
                    (vertex.y + 0.0).to_bits(),
                    (vertex.z + 0.0).to_bits(),
                ];
                *slot = *lookup
                    .entry(key)
                    .or_insert_with(|| indexed.add_vertex(*vertex));
            }
            indexed.add_triangle(triangle[0], triangle[1], triangle[2]);
        }

        indexed
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default)]
pub struct IndexedMesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f64>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl IndexedMesh {
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(triangle_count * 3),
        }
    }

    /// Add a vertex, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.push(position.x);
        self.positions.push(position.y);
        self.positions.push(position.z);
        index
    }

    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Undirected edge use counts. Triangles that collapsed to a repeated
    /// index after de-duplication carry no area and are skipped.
    fn edge_uses(&self) -> FxHashMap<(u32, u32), u32> {
        let mut uses: FxHashMap<(u32, u32), u32> = FxHashMap::default();
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0], tri[1], tri[2]);
            if a == b || b == c || a == c {
                continue;
            }
            for (u, v) in [(a, b), (b, c), (c, a)] {
                *uses.entry((u.min(v), u.max(v))).or_insert(0) += 1;
            }
        }
        uses
    }

    /// Edges used by exactly one triangle
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_uses().values().filter(|&&n| n == 1).count()
    }

    /// Edges used by more than two triangles
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edge_uses().values().filter(|&&n| n > 2).count()
    }

    /// True when every edge is shared by at least two triangles
    pub fn is_closed(&self) -> bool {
        self.boundary_edge_count() == 0
    }
}

/// Closed terrain volume: surface, then walls, then base
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    mesh: Mesh,
    surface_facets: usize,
    wall_facets: usize,
    base_facets: usize,
    boundary_len: usize,
}

impl TerrainMesh {
    /// Concatenate the three facet groups in order
    pub fn assemble(
        surface: Vec<Facet>,
        walls: Vec<Facet>,
        base: Vec<Facet>,
        boundary_len: usize,
    ) -> Self {
        let (surface_facets, wall_facets, base_facets) = (surface.len(), walls.len(), base.len());

        let mut mesh = Mesh::with_capacity(surface_facets + wall_facets + base_facets);
        mesh.extend(surface);
        mesh.extend(walls);
        mesh.extend(base);

        Self {
            mesh,
            surface_facets,
            wall_facets,
            base_facets,
            boundary_len,
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }

    pub fn surface(&self) -> &[Facet] {
        &self.mesh.facets[..self.surface_facets]
    }

    pub fn walls(&self) -> &[Facet] {
        let start = self.surface_facets;
        &self.mesh.facets[start..start + self.wall_facets]
    }

    pub fn base(&self) -> &[Facet] {
        &self.mesh.facets[self.surface_facets + self.wall_facets..]
    }

    pub fn boundary_len(&self) -> usize {
        self.boundary_len
    }

    pub fn stats(&self) -> MeshStats {
        let (min, max) = self.mesh.bounds();
        MeshStats {
            facets: self.mesh.facet_count(),
            surface_facets: self.surface_facets,
            wall_facets: self.wall_facets,
            base_facets: self.base_facets,
            boundary_vertices: self.boundary_len,
            min: [min.x, min.y, min.z],
            max: [max.x, max.y, max.z],
        }
    }
}

/// Facet counts and bounds of a terrain mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshStats {
    pub facets: usize,
    pub surface_facets: usize,
    pub wall_facets: usize,
    pub base_facets: usize,
    pub boundary_vertices: usize,
    pub min: [f64; 3],
    pub max: [f64; 3],
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tetrahedron() -> Mesh {
        let o = Point3::new(0.0, 0.0, 0.0);
        let x = Point3::new(1.0, 0.0, 0.0);
        let y = Point3::new(0.0, 1.0, 0.0);
        let z = Point3::new(0.0, 0.0, 1.0);

        let mut mesh = Mesh::new();
        mesh.push(Facet::new(o, y, x));
        mesh.push(Facet::new(o, x, z));
        mesh.push(Facet::new(o, z, y));
        mesh.push(Facet::new(x, y, z));
        mesh
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.facet_count(), 0);
        assert_eq!(mesh.bounds(), (Point3::origin(), Point3::origin()));
    }

    #[test]
    fn test_facet_normal_follows_winding() {
        let facet = Facet::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        );
        assert_eq!(facet.normal(), Vector3::z());
        assert_eq!(facet.flipped().normal(), -Vector3::z());
        assert_relative_eq!(facet.area(), 2.0);
    }

    #[test]
    fn test_degenerate_facet_has_zero_normal() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let facet = Facet::new(p, p, Point3::new(2.0, 2.0, 2.0));
        assert!(facet.is_degenerate());
        assert_eq!(facet.normal(), Vector3::zeros());
    }

    #[test]
    fn test_merge() {
        let mut mesh = tetrahedron();
        let other = tetrahedron();
        mesh.merge(&other);
        assert_eq!(mesh.facet_count(), 8);
    }

    #[test]
    fn test_bounds() {
        let (min, max) = tetrahedron().bounds();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_to_indexed_shares_vertices() {
        let indexed = tetrahedron().to_indexed();
        assert_eq!(indexed.vertex_count(), 4);
        assert_eq!(indexed.triangle_count(), 4);
        assert!(indexed.is_closed());
        assert_eq!(indexed.non_manifold_edge_count(), 0);
    }

    #[test]
    fn test_open_mesh_has_boundary_edges() {
        let mut mesh = tetrahedron();
        mesh.facets.pop();
        let indexed = mesh.to_indexed();
        assert_eq!(indexed.boundary_edge_count(), 3);
        assert!(!indexed.is_closed());
    }

    #[test]
    fn test_terrain_sections() {
        let mesh = tetrahedron();
        let facets = mesh.facets.clone();
        let terrain = TerrainMesh::assemble(
            facets[..1].to_vec(),
            facets[1..3].to_vec(),
            facets[3..].to_vec(),
            3,
        );

        assert_eq!(terrain.surface().len(), 1);
        assert_eq!(terrain.walls().len(), 2);
        assert_eq!(terrain.base().len(), 1);
        assert_eq!(terrain.base()[0], facets[3]);

        let stats = terrain.stats();
        assert_eq!(stats.facets, 4);
        assert_eq!(stats.boundary_vertices, 3);
        assert_eq!(stats.max, [1.0, 1.0, 1.0]);
    }
}
