//! Error type for engine operations.

use codex_core::DomainId;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Errors returned by mutating engine operations and catalog loading.
///
/// Queries never fail; they degrade to empty values instead.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Mutation attempted while viewing a shared snapshot
    #[error("progress is read-only while viewing a shared snapshot")]
    ReadOnly,

    /// Key does not address a point in the catalog
    #[error("unknown point: {0}")]
    UnknownPoint(String),

    /// Domain id not present in the catalog
    #[error("unknown domain: {0}")]
    UnknownDomain(DomainId),

    /// Catalog content is inconsistent
    #[error("invalid catalog: {0}")]
    Catalog(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
