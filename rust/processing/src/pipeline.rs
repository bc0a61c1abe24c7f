// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load, select, build and write

use crate::error::{PipelineError, Result};
use crate::types::{MeshReport, MeshRequest, Source};
use geoprint_core::{
    load_point_cloud, select_from_sources, Catalog, PointCloud, Sample, SelectionCriterion,
};
use geoprint_geometry::{build_terrain_mesh, stl, PlateDimensions, StlFormat, TerrainMesh};
use rayon::prelude::*;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A built mesh and the sample counts that produced it
#[derive(Debug, Clone)]
pub struct GeneratedMesh {
    pub terrain: TerrainMesh,
    pub samples_loaded: usize,
    pub samples_selected: usize,
}

/// Files that may hold samples for `criterion`
fn catalog_candidates(path: &Path, criterion: &SelectionCriterion) -> Result<Vec<PathBuf>> {
    let catalog = Catalog::load(path)?;
    let entries = match *criterion {
        SelectionCriterion::Proximity {
            lng,
            lat,
            threshold,
        } => catalog.datasets_near(lng, lat, threshold),
        SelectionCriterion::BoundingBox { .. } => {
            catalog.datasets_intersecting(&criterion.footprint())
        }
    };

    let paths: Vec<PathBuf> = entries
        .into_iter()
        .filter_map(|entry| {
            let csv = catalog.csv_path(entry);
            if csv.is_none() {
                tracing::debug!(dataset = ?entry.display_name(), "Catalog entry has no CSV export");
            }
            csv
        })
        .collect();

    tracing::info!(
        catalog = %path.display(),
        datasets = catalog.len(),
        candidates = paths.len(),
        "Resolved catalog candidates"
    );
    Ok(paths)
}

fn load_files(paths: &[PathBuf]) -> Result<Vec<PointCloud>> {
    // Collect keeps file order
    let clouds = paths
        .par_iter()
        .map(load_point_cloud)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(clouds)
}

/// Read every source of a request, in source order
pub fn load_sources<'a>(
    source: &'a Source,
    criterion: &SelectionCriterion,
) -> Result<Vec<Cow<'a, [Sample]>>> {
    let clouds: Vec<Cow<'a, [Sample]>> = match source {
        Source::Files { paths } => {
            if paths.is_empty() {
                return Err(PipelineError::InvalidRequest(
                    "no input files given".to_string(),
                ));
            }
            load_files(paths)?.into_iter().map(Cow::Owned).collect()
        }
        Source::Catalog { path } => {
            let paths = catalog_candidates(path, criterion)?;
            load_files(&paths)?.into_iter().map(Cow::Owned).collect()
        }
        Source::Samples { samples } => vec![Cow::Borrowed(samples.as_slice())],
    };
    Ok(clouds)
}

/// Run selection and mesh construction without touching any destination
pub fn generate(
    source: &Source,
    criterion: &SelectionCriterion,
    plate: &PlateDimensions,
) -> Result<GeneratedMesh> {
    let clouds = load_sources(source, criterion)?;
    let samples_loaded = clouds.iter().map(|cloud| cloud.len()).sum();

    let selected = select_from_sources(clouds.iter().map(|cloud| &**cloud), criterion)?;
    let terrain = build_terrain_mesh(&selected, plate)?;

    Ok(GeneratedMesh {
        terrain,
        samples_loaded,
        samples_selected: selected.len(),
    })
}

/// Serialize a finished mesh to any writer
pub fn write_stl<W: Write>(terrain: &TerrainMesh, format: StlFormat, writer: W) -> Result<()> {
    stl::write_stl(terrain.mesh(), format, writer)?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Write a finished mesh to `path`, returning the bytes written.
///
/// Output goes to a sibling `.partial` file that replaces `path` only once
/// it is complete.
pub fn write_stl_file(terrain: &TerrainMesh, format: StlFormat, path: &Path) -> Result<u64> {
    let staging = partial_path(path);
    let output_error = |source: geoprint_geometry::Error| PipelineError::Output {
        path: path.to_path_buf(),
        source,
    };

    let written = File::create(&staging)
        .map_err(geoprint_geometry::Error::from)
        .and_then(|file| stl::write_stl(terrain.mesh(), format, BufWriter::new(file)))
        .and_then(|_| std::fs::rename(&staging, path).map_err(geoprint_geometry::Error::from))
        .and_then(|_| std::fs::metadata(path).map_err(geoprint_geometry::Error::from));

    match written {
        Ok(metadata) => Ok(metadata.len()),
        Err(e) => {
            let _ = std::fs::remove_file(&staging);
            Err(output_error(e))
        }
    }
}

/// Execute one request end to end
pub fn run(request: &MeshRequest) -> Result<MeshReport> {
    let start = Instant::now();
    let generated = generate(&request.source, &request.criterion, &request.plate)?;
    let bytes_written = write_stl_file(&generated.terrain, request.format, &request.output)?;

    tracing::info!(
        output = %request.output.display(),
        format = request.format.as_str(),
        facets = generated.terrain.mesh().facet_count(),
        bytes = bytes_written,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Wrote STL"
    );

    Ok(MeshReport {
        output: request.output.clone(),
        format: request.format,
        samples_loaded: generated.samples_loaded,
        samples_selected: generated.samples_selected,
        bytes_written,
        mesh: generated.terrain.stats(),
    })
}
