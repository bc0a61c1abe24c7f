// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline runs against files on disk.

use geoprint_core::SelectionCriterion;
use geoprint_geometry::{stl, StlFormat};
use geoprint_processing::{process_batch, run, ErrorKind, MeshRequest, Source};
use std::fs;
use std::path::PathBuf;

/// Fresh scratch directory per test
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("geoprint-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

const WATER_LEVEL_CSV: &str = "Longitude,Latitude,Water_Level
-79.05,43.75,74.0
-78.95,43.76,74.5
-78.96,43.85,75.0
-79.04,43.84,74.2
-79.00,43.80,73.9
-79.02,43.78,74.1
-80.00,42.00,10.0
";

/// Only three samples lie within 0.1 degrees of (-79.0, 43.8)
const SPARSE_CSV: &str = "longitude,latitude,elevation
-79.03,43.81,120.0
-78.98,43.79,121.5
-79.00,43.83,119.0
-79.20,43.80,118.0
-78.80,43.80,117.0
-79.00,43.60,116.0
";

#[test]
fn csv_to_binary_stl() {
    let dir = scratch_dir("binary");
    let csv = dir.join("lake.csv");
    fs::write(&csv, WATER_LEVEL_CSV).unwrap();
    let output = dir.join("lake.stl");

    let request = MeshRequest::new(
        Source::Files { paths: vec![csv] },
        SelectionCriterion::near(-79.0, 43.8),
        &output,
    );
    let report = run(&request).unwrap();

    assert_eq!(report.samples_loaded, 7);
    assert_eq!(report.samples_selected, 6);
    assert_eq!(report.bytes_written as usize, stl::binary_size(report.mesh.facets));
    assert_eq!(fs::metadata(&output).unwrap().len(), report.bytes_written);
    assert_eq!(report.mesh.wall_facets, 2 * report.mesh.boundary_vertices);
    assert_eq!(report.mesh.max[0], 150.0);
    assert!(!dir.join("lake.stl.partial").exists());
}

#[test]
fn csv_to_ascii_stl() {
    let dir = scratch_dir("ascii");
    let csv = dir.join("lake.csv");
    fs::write(&csv, WATER_LEVEL_CSV).unwrap();
    let output = dir.join("lake.stl");

    let request = MeshRequest::new(
        Source::Files { paths: vec![csv] },
        SelectionCriterion::bounding_box(-79.1, -78.9, 43.7, 43.9),
        &output,
    )
    .with_format(StlFormat::Ascii);
    let report = run(&request).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("solid "));
    assert_eq!(text.matches("endfacet").count(), report.mesh.facets);
}

#[test]
fn proximity_with_three_nearby_samples_is_insufficient() {
    let dir = scratch_dir("sparse");
    let csv = dir.join("sparse.csv");
    fs::write(&csv, SPARSE_CSV).unwrap();
    let output = dir.join("sparse.stl");

    let request = MeshRequest::new(
        Source::Files { paths: vec![csv] },
        SelectionCriterion::near(-79.0, 43.8),
        &output,
    );
    let err = run(&request).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientData);
    assert!(!output.exists());
}

#[test]
fn missing_column_is_reported_unchanged() {
    let dir = scratch_dir("missing");
    let csv = dir.join("bad.csv");
    fs::write(&csv, "Longitude,Latitude,Height\n-79.0,43.8,1.0\n").unwrap();

    let request = MeshRequest::new(
        Source::Files { paths: vec![csv] },
        SelectionCriterion::near(-79.0, 43.8),
        dir.join("bad.stl"),
    );
    let err = run(&request).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingField);
    assert!(err.to_string().contains("Height"));
}

#[test]
fn sources_merge_across_files() {
    let dir = scratch_dir("merge");
    let (west, east) = WATER_LEVEL_CSV.split_at(WATER_LEVEL_CSV.find("-79.00").unwrap());
    let header = "Longitude,Latitude,Water_Level\n";
    fs::write(dir.join("west.csv"), west).unwrap();
    fs::write(dir.join("east.csv"), format!("{}{}", header, east)).unwrap();

    let request = MeshRequest::new(
        Source::Files {
            paths: vec![dir.join("west.csv"), dir.join("east.csv")],
        },
        SelectionCriterion::near(-79.0, 43.8),
        dir.join("merged.stl"),
    );
    let report = run(&request).unwrap();

    assert_eq!(report.samples_loaded, 7);
    assert_eq!(report.samples_selected, 6);
}

#[test]
fn catalog_selects_candidate_datasets() {
    let dir = scratch_dir("catalog");
    fs::create_dir_all(dir.join("csv")).unwrap();
    fs::write(dir.join("csv").join("lake.csv"), WATER_LEVEL_CSV).unwrap();
    fs::write(dir.join("csv").join("far.csv"), SPARSE_CSV).unwrap();
    fs::write(
        dir.join("locations.json"),
        r#"[
            {
                "name": "lake",
                "csv": "./csv/lake.csv",
                "bounding_box": {
                    "southwest": {"lat": 43.7, "lng": -79.1},
                    "northeast": {"lat": 43.9, "lng": -78.9}
                }
            },
            {
                "name": "far",
                "csv": "./csv/far.csv",
                "bounding_box": {
                    "southwest": {"lat": 40.0, "lng": -75.0},
                    "northeast": {"lat": 41.0, "lng": -74.0}
                }
            }
        ]"#,
    )
    .unwrap();

    let request = MeshRequest::new(
        Source::Catalog {
            path: dir.join("locations.json"),
        },
        SelectionCriterion::near(-79.0, 43.8),
        dir.join("catalog.stl"),
    );
    let report = run(&request).unwrap();

    // Only the overlapping dataset is read
    assert_eq!(report.samples_loaded, 7);
    assert_eq!(report.samples_selected, 6);
}

#[test]
fn batch_runs_independent_requests() {
    let dir = scratch_dir("batch");
    let lake = dir.join("lake.csv");
    let sparse = dir.join("sparse.csv");
    fs::write(&lake, WATER_LEVEL_CSV).unwrap();
    fs::write(&sparse, SPARSE_CSV).unwrap();

    let near = SelectionCriterion::near(-79.0, 43.8);
    let requests = vec![
        MeshRequest::new(Source::Files { paths: vec![lake.clone()] }, near, dir.join("a.stl")),
        MeshRequest::new(Source::Files { paths: vec![sparse] }, near, dir.join("b.stl")),
        MeshRequest::new(
            Source::Files { paths: vec![lake.clone()] },
            near,
            dir.join("c.stl"),
        )
        .with_format(StlFormat::Ascii),
        MeshRequest::new(Source::Files { paths: vec![lake] }, near, dir.join("a.stl")),
    ];

    let results = process_batch(&requests);
    assert_eq!(results.len(), 4);

    assert!(results[0].is_ok());
    assert_eq!(
        results[1].as_ref().unwrap_err().kind(),
        ErrorKind::InsufficientData
    );
    assert_eq!(results[2].as_ref().unwrap().format, StlFormat::Ascii);
    assert_eq!(
        results[3].as_ref().unwrap_err().kind(),
        ErrorKind::InvalidRequest
    );

    assert!(dir.join("a.stl").exists());
    assert!(!dir.join("b.stl").exists());
    assert!(dir.join("c.stl").exists());
}
