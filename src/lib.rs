//! Lie-group algebra and a typed factor-graph model for pose-graph SLAM.
//!
//! - [`manifold`]: SO(2), SO(3), SE(2), SE(3) with exp/log maps and left Jacobians
//! - [`linalg`]: symmetric-matrix packing and small matrix helpers
//! - [`core`]: typed values, nodes, edges, calibration parameters and the graph
//! - [`io`]: the line-based text record format

pub mod core;
pub mod error;
pub mod io;
pub mod linalg;
pub mod logger;
pub mod manifold;

pub use crate::core::{Calibration, Edge, EdgeKind, Graph, Node, NodeId, NodeKind, Value, ValueKind};
pub use error::{SlamError, SlamResult};
pub use io::{GraphLoader, TextLoader};
pub use logger::{init_logger, init_logger_with_level};
pub use manifold::LieGroup;
