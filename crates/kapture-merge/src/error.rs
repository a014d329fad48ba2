use kapture_core::{ConsistencyError, EntityKind};
use thiserror::Error;

/// Two inputs disagree on a payload that must be identical.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("dataset #{dataset} disagrees on {kind} `{id}`: {detail}")]
pub struct MergeConflictError {
    /// Kind of the conflicting entry.
    pub kind: EntityKind,
    /// Identifier of the conflicting entry.
    pub id: String,
    /// Position, in the input sequence, of the dataset that introduced the
    /// disagreement.
    pub dataset: usize,
    pub detail: String,
}

/// Errors that can occur while merging datasets.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeError {
    /// Nothing to merge.
    #[error("need at least one dataset to merge")]
    NoInput,
    #[error(transparent)]
    Conflict(#[from] MergeConflictError),
    /// The union violates a dataset invariant, e.g. a kept kind references
    /// an excluded one.
    #[error("merged dataset would be inconsistent: {0}")]
    Inconsistent(#[from] ConsistencyError),
}
