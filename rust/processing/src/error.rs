// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline errors and their stable kinds

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Closed set of failure kinds callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InsufficientData,
    DegenerateGeometry,
    MissingField,
    InvalidValue,
    InvalidRequest,
    Triangulation,
    Io,
    Json,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InsufficientData => "INSUFFICIENT_DATA",
            ErrorKind::DegenerateGeometry => "DEGENERATE_GEOMETRY",
            ErrorKind::MissingField => "MISSING_FIELD",
            ErrorKind::InvalidValue => "INVALID_VALUE",
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::Triangulation => "TRIANGULATION_ERROR",
            ErrorKind::Io => "IO_ERROR",
            ErrorKind::Json => "JSON_ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] geoprint_core::Error),

    #[error(transparent)]
    Geometry(#[from] geoprint_geometry::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: geoprint_geometry::Error,
    },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        use geoprint_core::Error as CoreError;
        use geoprint_geometry::Error as GeometryError;

        match self {
            PipelineError::Core(e) => match e {
                CoreError::InsufficientData { .. } => ErrorKind::InsufficientData,
                CoreError::MissingField { .. } => ErrorKind::MissingField,
                CoreError::InvalidValue { .. } => ErrorKind::InvalidValue,
                CoreError::InvalidSelection(_) => ErrorKind::InvalidRequest,
                CoreError::Io(_) => ErrorKind::Io,
                CoreError::Json(_) => ErrorKind::Json,
            },
            PipelineError::Geometry(e) => match e {
                GeometryError::InsufficientData { .. } => ErrorKind::InsufficientData,
                GeometryError::DegenerateGeometry(_) => ErrorKind::DegenerateGeometry,
                GeometryError::Triangulation(_) => ErrorKind::Triangulation,
                GeometryError::Io(_) => ErrorKind::Io,
            },
            PipelineError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            PipelineError::Output { .. } => ErrorKind::Io,
        }
    }
}
