use thiserror::Error;

/// Errors that can occur while generating image pairs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PairingError {
    #[error("top_k must be at least 1")]
    ZeroTopK,
    #[error("global feature of `{image}` has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        image: String,
        expected: usize,
        actual: usize,
    },
    #[error("global feature of `{image}` must be a single row, got {rows}")]
    NotSingleRow { image: String, rows: usize },
    #[error("global feature of `{image}` contains non-finite values")]
    NonFinite { image: String },
}
