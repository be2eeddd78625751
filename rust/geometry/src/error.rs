// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building floorplan geometry
#[derive(Error, Debug)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("CSG operation failed: {0}")]
    CsgError(String),

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),
}

impl Error {
    pub fn csg(msg: impl Into<String>) -> Self {
        Error::CsgError(msg.into())
    }

    pub fn degenerate(msg: impl Into<String>) -> Self {
        Error::DegenerateGeometry(msg.into())
    }
}
