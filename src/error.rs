//! Error taxonomy for the analysis core

use thiserror::Error;

/// Errors surfaced by the indexing, container, and clustering primitives.
///
/// Lookup failures abort the current unit of work only; a cluster conflict
/// always indicates a bug in the calling algorithm and is expected to
/// propagate all the way up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// A page key was not present in the index or store.
    #[error("page not found: {key}")]
    PageNotFound { key: String },

    /// A component id was not present in the store.
    #[error("component not found: {id}")]
    ComponentNotFound { id: String },

    /// Attempted to merge two clusters whose resident languages overlap.
    #[error("clusters {a} and {b} share language '{lang}'")]
    ClusterConflict { a: u32, b: u32, lang: String },

    /// A hashed-key container detected two distinct keys sharing a hash.
    #[error("hash collision on key hash {hash:#010x}")]
    HashCollision { hash: u32 },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
