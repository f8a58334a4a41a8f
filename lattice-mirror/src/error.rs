//! Error types for the mirror engine.
//!
//! Setup failures (`BindError`) are fatal and surface before any snapshot
//! or subscription work starts. Patch failures (`PatchError`) never reach
//! the rendering layer: the binding logs them and keeps the previous mirror.

use thiserror::Error;

use crate::path::Path;
use crate::store::StoreId;

/// Errors raised while resolving a store and mounting a binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// No store is registered under the requested identity.
    #[error("no state store found with id \"{id}\"")]
    StoreNotFound {
        /// The identity that failed to resolve.
        id: StoreId,
    },

    /// A direct handle was expected but none was supplied.
    #[error("provided store handle is not a valid state store instance")]
    MissingHandle,

    /// The supplied handle does not expose an identity.
    #[error("provided store handle has no derivable identity")]
    UnidentifiableHandle,
}

/// Errors raised by the patch applier when an event falls outside the
/// structure built at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// The event path was empty.
    #[error("event path is empty")]
    EmptyPath,

    /// An intermediate segment of the event path is not a tracked mapping.
    #[error("path {path} is not tracked by this mirror (missing segment at depth {depth})")]
    UntrackedPath {
        /// The full event path.
        path: Path,
        /// Index of the first segment that could not be walked.
        depth: usize,
    },
}

/// Result alias used by the setup entry points.
pub type Result<T, E = BindError> = std::result::Result<T, E>;
