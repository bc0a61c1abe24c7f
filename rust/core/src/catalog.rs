// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dataset catalog (`locations.json`)
//!
//! Each entry describes one exported point-cloud tile and its geographic
//! footprint. The catalog is used to pick the candidate sources for a
//! selection before any CSV is read.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Geographic footprint of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub southwest: LatLng,
    pub northeast: LatLng,
}

impl BoundingBox {
    pub fn new(west: f64, east: f64, south: f64, north: f64) -> Self {
        Self {
            southwest: LatLng { lat: south, lng: west },
            northeast: LatLng { lat: north, lng: east },
        }
    }

    #[inline]
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        self.southwest.lng <= lng
            && lng <= self.northeast.lng
            && self.southwest.lat <= lat
            && lat <= self.northeast.lat
    }

    /// Grow the box by `margin` degrees on every side
    pub fn expanded(&self, margin: f64) -> Self {
        Self::new(
            self.southwest.lng - margin,
            self.northeast.lng + margin,
            self.southwest.lat - margin,
            self.northeast.lat + margin,
        )
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.southwest.lng <= other.northeast.lng
            && other.southwest.lng <= self.northeast.lng
            && self.southwest.lat <= other.northeast.lat
            && other.southwest.lat <= self.northeast.lat
    }
}

/// One exported tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEntry {
    #[serde(default)]
    pub name: Option<String>,
    /// CSV export, relative to the catalog file
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub bounding_box: BoundingBox,
}

impl DatasetEntry {
    /// Name of the entry, falling back to the image file stem
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or_else(|| {
            self.image
                .as_deref()
                .map(|image| image.rsplit('/').next().unwrap_or(image))
                .map(|file| file.strip_suffix(".png").unwrap_or(file))
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    root: PathBuf,
    entries: Vec<DatasetEntry>,
}

impl Catalog {
    pub fn new(root: impl Into<PathBuf>, entries: Vec<DatasetEntry>) -> Self {
        Self {
            root: root.into(),
            entries,
        }
    }

    /// Load a `locations.json` file; relative CSV paths resolve against its directory
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let entries: Vec<DatasetEntry> = serde_json::from_slice(&bytes)?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        tracing::debug!(path = %path.display(), entries = entries.len(), "Loaded dataset catalog");
        Ok(Self::new(root, entries))
    }

    pub fn entries(&self) -> &[DatasetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&DatasetEntry> {
        self.entries
            .iter()
            .find(|entry| entry.display_name() == Some(name))
    }

    /// Entries whose footprint, grown by `threshold`, contains the query point
    pub fn datasets_near(&self, lng: f64, lat: f64, threshold: f64) -> Vec<&DatasetEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.bounding_box.expanded(threshold).contains(lng, lat))
            .collect()
    }

    /// Entries whose footprint overlaps the given box
    pub fn datasets_intersecting(&self, bbox: &BoundingBox) -> Vec<&DatasetEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.bounding_box.intersects(bbox))
            .collect()
    }

    /// Resolve the CSV path of an entry
    pub fn csv_path(&self, entry: &DatasetEntry) -> Option<PathBuf> {
        let csv = entry.csv.as_deref()?;
        let relative = csv.strip_prefix("./").unwrap_or(csv);
        let path = Path::new(relative);
        Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCATIONS: &str = r#"[
        {
            "name": "lake_ontario_west",
            "csv": "./csv/lake_ontario_west.csv",
            "image": "./png/lake_ontario_west.png",
            "bounding_box": {
                "southwest": {"lat": 43.5, "lng": -79.5},
                "northeast": {"lat": 43.9, "lng": -79.05}
            }
        },
        {
            "image": "SWOT_tile_021.png",
            "bounding_box": {
                "southwest": {"lat": 43.6, "lng": -78.9},
                "northeast": {"lat": 44.0, "lng": -78.5}
            }
        }
    ]"#;

    fn catalog() -> Catalog {
        let entries: Vec<DatasetEntry> = serde_json::from_str(LOCATIONS).unwrap();
        Catalog::new("/data/elevation", entries)
    }

    #[test]
    fn test_datasets_near_uses_threshold_margin() {
        let catalog = catalog();

        // Between the two tiles: within 0.1 of both footprints
        let near = catalog.datasets_near(-78.98, 43.8, 0.1);
        assert_eq!(near.len(), 2);

        let near = catalog.datasets_near(-79.4, 43.6, 0.1);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].display_name(), Some("lake_ontario_west"));

        assert!(catalog.datasets_near(-70.0, 40.0, 0.1).is_empty());
    }

    #[test]
    fn test_display_name_falls_back_to_image() {
        let catalog = catalog();
        assert!(catalog.find("SWOT_tile_021").is_some());
        assert!(catalog.find("missing").is_none());
    }

    #[test]
    fn test_csv_path_resolves_against_root() {
        let catalog = catalog();
        let entry = catalog.find("lake_ontario_west").unwrap();
        assert_eq!(
            catalog.csv_path(entry),
            Some(PathBuf::from("/data/elevation/csv/lake_ontario_west.csv"))
        );
        let tile = catalog.find("SWOT_tile_021").unwrap();
        assert_eq!(catalog.csv_path(tile), None);
    }

    #[test]
    fn test_bounding_box_intersection() {
        let catalog = catalog();
        let bbox = BoundingBox::new(-78.88, -78.8, 43.7, 43.75);
        let hits = catalog.datasets_intersecting(&bbox);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].display_name(), Some("SWOT_tile_021"));
    }
}
