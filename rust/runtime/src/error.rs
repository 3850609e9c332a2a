// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the viewer runtime.
///
/// Usage errors (`AlreadyInitialized`, `HandleOccupied`, `Disposed`) are
/// programmer misuse and are never retried internally. `External` wraps
/// failures raised by the converter resource or its factory; the runtime
/// surfaces them to the caller without retrying.
#[derive(Debug, Error)]
pub enum Error {
    #[error("viewer already initialized, call reset instead")]
    AlreadyInitialized,

    #[error("a resource handle is already held, clear it first")]
    HandleOccupied,

    #[error("no viewer resource is initialized")]
    NotInitialized,

    #[error("a reset is already in progress")]
    ResetInProgress,

    #[error("coordinator has been disposed")]
    Disposed,

    #[error("no fragment data available")]
    NoFragments,

    #[error("external resource failure: {0}")]
    External(String),
}

impl Error {
    /// Wrap an arbitrary collaborator failure as an external error.
    pub fn external(err: impl std::fmt::Display) -> Self {
        Error::External(err.to_string())
    }
}
