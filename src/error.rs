use std::io;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Failures surfaced by the graph core and its ingestion adapters.
///
/// Malformed review records are deliberately absent here: the builder
/// reports them per record as [`crate::build::SkipReason`] outcomes and
/// keeps going.
#[derive(Debug, Error)]
pub enum GraphError {
    /// I/O failure while reading a dataset file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// CSV-level failure (framing, encoding) from the ingest layer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// JSON serialization failure in an export surface.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// An operation referenced a vertex that is not in the graph.
    #[error("vertex {0} not found")]
    VertexNotFound(String),
    /// An operation referenced an edge that does not exist.
    #[error("no edge between {0} and {1}")]
    EdgeNotFound(String, String),
    /// A caller-supplied value violated the operation's contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
