// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GeoPrint processing pipeline
//!
//! Loads point clouds, selects samples, builds the closed terrain mesh and
//! writes it to the destination chosen by the caller.

pub mod batch;
pub mod error;
pub mod pipeline;
pub mod types;

pub use batch::process_batch;
pub use error::{ErrorKind, PipelineError, Result};
pub use pipeline::{generate, load_sources, run, write_stl, write_stl_file, GeneratedMesh};
pub use types::{MeshReport, MeshRequest, Source};
