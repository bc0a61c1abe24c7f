// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parallel execution of independent requests

use crate::error::{PipelineError, Result};
use crate::pipeline::run;
use crate::types::{MeshReport, MeshRequest};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::path::{Component, Path, PathBuf};

/// Lexical form used to compare outputs; `./a.stl` and `a.stl` are the same file
fn output_key(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

/// Indices of requests whose output path was already claimed by an earlier one
fn conflicting_outputs(requests: &[MeshRequest]) -> FxHashSet<usize> {
    let mut claimed: FxHashSet<PathBuf> = FxHashSet::default();
    let mut conflicts = FxHashSet::default();
    for (i, request) in requests.iter().enumerate() {
        if !claimed.insert(output_key(&request.output)) {
            conflicts.insert(i);
        }
    }
    conflicts
}

/// Run every request on the rayon pool.
///
/// Results line up with `requests`. The first request naming an output path
/// runs; later requests reusing it fail with an invalid-request error.
pub fn process_batch(requests: &[MeshRequest]) -> Vec<Result<MeshReport>> {
    let conflicts = conflicting_outputs(requests);

    tracing::info!(
        requests = requests.len(),
        conflicts = conflicts.len(),
        threads = rayon::current_num_threads(),
        "Processing batch"
    );

    requests
        .par_iter()
        .enumerate()
        .map(|(i, request)| {
            if conflicts.contains(&i) {
                return Err(PipelineError::InvalidRequest(format!(
                    "output {} is already used by another request",
                    request.output.display()
                )));
            }
            let result = run(request);
            if let Err(e) = &result {
                tracing::warn!(
                    output = %request.output.display(),
                    kind = e.kind().code(),
                    error = %e,
                    "Request failed"
                );
            }
            result
        })
        .collect()
}
