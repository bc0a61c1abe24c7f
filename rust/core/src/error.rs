// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for loading and selection
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading point clouds or selecting samples
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not enough data points ({found}) within the selection to perform triangulation (need at least {required})")]
    InsufficientData { found: usize, required: usize },

    #[error("Missing field '{field}'. Available keys are: {available:?}")]
    MissingField {
        field: String,
        available: Vec<String>,
    },

    #[error("Invalid value {value:?} for '{field}' on line {line}")]
    InvalidValue {
        line: usize,
        field: String,
        value: String,
    },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
