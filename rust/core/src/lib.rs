// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # GeoPrint Core
//!
//! Point-cloud loading and spatial selection for GeoPrint.
//!
//! ## Overview
//!
//! - **Loading**: CSV exports (water level or elevation schemas) and JSON
//!   point clouds, scanned line-by-line with [memchr](https://docs.rs/memchr)
//!   and parsed with [fast-float](https://docs.rs/fast-float)
//! - **Selection**: inclusive bounding boxes and planar proximity queries
//! - **Catalog**: `locations.json` footprints used to pick candidate sources
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use geoprint_core::{load_point_cloud, select, SelectionCriterion};
//!
//! let cloud = load_point_cloud("csv/lake_ontario.csv")?;
//! let selected = select(&cloud, &SelectionCriterion::near(-79.0, 43.8))?;
//! println!("{} samples selected", selected.len());
//! ```

pub mod catalog;
pub mod error;
pub mod loader;
pub mod sample;
pub mod selection;

pub use catalog::{BoundingBox, Catalog, DatasetEntry, LatLng};
pub use error::{Error, Result};
pub use loader::{load_point_cloud, parse_csv, parse_csv_with_schema, parse_json, CsvSchema};
pub use sample::{Extent, PointCloud, Sample};
pub use selection::{
    filter, select, select_from_sources, SelectionCriterion, DEFAULT_PROXIMITY_THRESHOLD,
    MIN_SELECTED_POINTS,
};
