// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the viewer engine.

use crate::model::EntityRef;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the viewer engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host has no container with the requested id. Nothing was
    /// initialized.
    #[error("viewer container not found: {0}")]
    MissingContainer(String),

    /// Floorplan or config JSON could not be decoded.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// An entity reference that the current scene does not contain.
    #[error("unknown entity: {0}")]
    UnknownEntity(EntityRef),

    /// A floor id that the current scene does not contain.
    #[error("unknown floor: {0}")]
    UnknownFloor(String),
}
