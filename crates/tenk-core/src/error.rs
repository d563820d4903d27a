//! Error types for extraction and storage operations.
//!
//! This module defines [`TenkError`] which covers every fault the pipeline can
//! raise while fetching and walking EDGAR documents, plus storage failures.

use thiserror::Error;

/// Errors that can occur while extracting or storing cash flows statements.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TenkError {
    /// A fetch failed outright (connection failure, timeout, non-success status).
    #[error("Network error: {0}")]
    Network(String),

    /// A document could not be parsed as markup.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An expected node, text or attribute is absent from a parsed document.
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Error interacting with the report store.
    #[error("Store error: {0}")]
    Store(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl TenkError {
    /// Returns true for faults raised by the extraction pipeline itself
    /// (as opposed to storage or caller errors).
    #[must_use]
    pub const fn is_pipeline_fault(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Parse(_) | Self::Lookup(_))
    }
}

/// Result type alias using [`TenkError`].
pub type Result<T> = std::result::Result<T, TenkError>;
