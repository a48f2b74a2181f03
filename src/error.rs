//! Error types for the slamkit library
//!
//! Every module has its own `thiserror` enum; [`SlamError`] wraps them so
//! callers that mix algebra, graph building and file I/O can use a single
//! result type with `?`.

use crate::{core::GraphError, io::IoError, linalg::LinAlgError, manifold::ManifoldError};
use thiserror::Error;

/// Main result type used throughout the slamkit library
pub type SlamResult<T> = Result<T, SlamError>;

/// Main error type for the slamkit library
#[derive(Debug, Error)]
pub enum SlamError {
    /// Matrix inversion, packing and block extraction errors
    #[error("Linear algebra error: {0}")]
    LinearAlgebra(#[from] LinAlgError),

    /// Invalid group elements
    #[error("Manifold error: {0}")]
    Manifold(#[from] ManifoldError),

    /// Typed values, nodes, edges and graph invariants
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// File loading and parsing
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

impl From<std::io::Error> for SlamError {
    fn from(err: std::io::Error) -> Self {
        SlamError::Io(IoError::Io(err))
    }
}
