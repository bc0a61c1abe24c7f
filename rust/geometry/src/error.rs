// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building the terrain volume
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not enough data points ({found}) to build a surface (need at least {required})")]
    InsufficientData { found: usize, required: usize },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    #[error("Failed to write mesh: {0}")]
    Io(#[from] std::io::Error),
}
