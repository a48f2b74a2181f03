//! Typed factor-graph model.
//!
//! Nodes hold poses, points or calibration parameters; edges hold a typed
//! measurement and optional information matrix and reference nodes by id.
//! The [`Graph`] owns both and enforces the insertion invariants.

pub mod attribute;
pub mod edge;
pub mod graph;
pub mod node;
pub mod parameter;
pub mod tag;
pub mod value;

pub use attribute::{format_float, Attribute, PRECISION};
pub use edge::{Edge, EdgeKind};
pub use graph::{Graph, GraphWarning};
pub use node::{Group, Node, NodeId, NodeKind};
pub use parameter::Calibration;
pub use tag::RecordTag;
pub use value::{Value, ValueKind};

use crate::linalg::LinAlgError;
use crate::manifold::ManifoldError;
use thiserror::Error;

/// Errors raised by the data model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// A value of the wrong kind was handed to a typed container
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },

    /// A value was read before it was set
    #[error("value accessed before it was set")]
    Uninitialized,

    /// Too few or too many words, or words that are not numbers
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// Name or tag outside the supported set
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Matrix that must be symmetric is not
    #[error("matrix is not symmetric: {0}")]
    NotSymmetric(String),

    #[error("edge references node {node} which is not in the graph")]
    MissingNode { node: NodeId },

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("edge {0} not found")]
    EdgeNotFound(usize),

    #[error("node {node} is a {actual} node, expected {expected}")]
    NodeKindMismatch {
        node: NodeId,
        expected: String,
        actual: String,
    },

    #[error("parameter mismatch: {0}")]
    ParameterMismatch(String),

    /// The parameter chain is append-only
    #[error("parameter node {id} already has successor {next}")]
    ParameterAlreadyLinked { id: NodeId, next: NodeId },

    #[error("invalid edge: {0}")]
    InvalidEdge(String),

    #[error("node id {0} is already in use")]
    IdInUse(NodeId),

    #[error(transparent)]
    Manifold(#[from] ManifoldError),

    #[error(transparent)]
    LinAlg(#[from] LinAlgError),
}

/// Result type for data model operations.
pub type GraphResult<T> = Result<T, GraphError>;
