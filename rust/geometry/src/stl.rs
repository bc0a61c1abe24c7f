// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STL serialization
//!
//! Binary layout: 80-byte header, little-endian `u32` facet count, then per
//! facet a normal and three vertices as little-endian `f32` followed by a
//! `u16` attribute count (always 0).

use crate::error::Result;
use crate::mesh::{Facet, Mesh};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

pub const HEADER_LEN: usize = 80;
pub const FACET_RECORD_LEN: usize = 50;

const HEADER_TEXT: &[u8] = b"geoprint terrain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StlFormat {
    #[default]
    Binary,
    Ascii,
}

impl StlFormat {
    /// Parse `binary` / `ascii`, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "binary" | "bin" => Some(StlFormat::Binary),
            "ascii" | "text" => Some(StlFormat::Ascii),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StlFormat::Binary => "binary",
            StlFormat::Ascii => "ascii",
        }
    }
}

/// Size in bytes of a binary STL with `facet_count` facets
#[inline]
pub fn binary_size(facet_count: usize) -> usize {
    HEADER_LEN + 4 + FACET_RECORD_LEN * facet_count
}

#[inline]
fn put_f32(record: &mut [u8], offset: usize, value: f64) {
    record[offset..offset + 4].copy_from_slice(&(value as f32).to_le_bytes());
}

fn encode_facet(facet: &Facet) -> [u8; FACET_RECORD_LEN] {
    let mut record = [0u8; FACET_RECORD_LEN];
    let normal = facet.normal();

    put_f32(&mut record, 0, normal.x);
    put_f32(&mut record, 4, normal.y);
    put_f32(&mut record, 8, normal.z);
    for (i, vertex) in facet.vertices.iter().enumerate() {
        let offset = 12 + i * 12;
        put_f32(&mut record, offset, vertex.x);
        put_f32(&mut record, offset + 4, vertex.y);
        put_f32(&mut record, offset + 8, vertex.z);
    }
    // Attribute byte count stays 0

    record
}

/// Write a binary STL
pub fn write_binary<W: Write>(mesh: &Mesh, mut writer: W) -> Result<()> {
    let count = u32::try_from(mesh.facet_count()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} facets exceed the binary STL limit", mesh.facet_count()),
        )
    })?;

    let mut header = [0u8; HEADER_LEN];
    header[..HEADER_TEXT.len()].copy_from_slice(HEADER_TEXT);
    writer.write_all(&header)?;
    writer.write_all(&count.to_le_bytes())?;

    for facet in mesh.iter() {
        writer.write_all(&encode_facet(facet))?;
    }

    writer.flush()?;
    Ok(())
}

/// Write an ASCII STL solid called `name`
pub fn write_ascii<W: Write>(mesh: &Mesh, name: &str, mut writer: W) -> Result<()> {
    writeln!(writer, "solid {}", name)?;
    for facet in mesh.iter() {
        let n = facet.normal();
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x as f32, n.y as f32, n.z as f32)?;
        writeln!(writer, "    outer loop")?;
        for v in &facet.vertices {
            writeln!(writer, "      vertex {:e} {:e} {:e}", v.x as f32, v.y as f32, v.z as f32)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {}", name)?;

    writer.flush()?;
    Ok(())
}

/// Write `mesh` in the requested format
pub fn write_stl<W: Write>(mesh: &Mesh, format: StlFormat, writer: W) -> Result<()> {
    match format {
        StlFormat::Binary => write_binary(mesh, writer),
        StlFormat::Ascii => write_ascii(mesh, "terrain", writer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn single_facet() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.push(Facet::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ));
        mesh
    }

    fn f32_at(bytes: &[u8], offset: usize) -> f32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes[offset..offset + 4]);
        f32::from_le_bytes(raw)
    }

    #[test]
    fn test_binary_layout() {
        let mut mesh = single_facet();
        mesh.merge(&single_facet());

        let mut bytes = Vec::new();
        write_binary(&mesh, &mut bytes).unwrap();

        assert_eq!(bytes.len(), binary_size(2));
        assert!(bytes.starts_with(HEADER_TEXT));
        assert_eq!(&bytes[80..84], &2u32.to_le_bytes());

        // First record: normal +z, then vertices
        assert_eq!(f32_at(&bytes, 84 + 8), 1.0);
        assert_eq!(f32_at(&bytes, 84 + 12 + 12), 1.0);
        assert_eq!(f32_at(&bytes, 84 + 12 + 24 + 4), 1.0);
        assert_eq!(&bytes[84 + 48..84 + 50], &[0, 0]);
    }

    #[test]
    fn test_empty_binary() {
        let mut bytes = Vec::new();
        write_binary(&Mesh::new(), &mut bytes).unwrap();
        assert_eq!(bytes.len(), 84);
    }

    #[test]
    fn test_ascii_structure() {
        let mut bytes = Vec::new();
        write_ascii(&single_facet(), "patch", &mut bytes).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("solid patch\n"));
        assert!(text.trim_end().ends_with("endsolid patch"));
        assert_eq!(text.matches("facet normal").count(), 1);
        assert_eq!(text.matches("vertex").count(), 3);
        assert!(text.contains("facet normal 0e0 0e0 1e0"));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(StlFormat::from_name("ASCII"), Some(StlFormat::Ascii));
        assert_eq!(StlFormat::from_name("binary"), Some(StlFormat::Binary));
        assert_eq!(StlFormat::from_name("obj"), None);
        assert_eq!(StlFormat::default(), StlFormat::Binary);
        assert_eq!(StlFormat::Ascii.as_str(), "ascii");
    }
}
