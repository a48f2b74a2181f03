//! Dense vector and matrix helpers shared by the manifold and graph layers.
//!
//! The numeric containers themselves are nalgebra's `DVector`/`DMatrix` (and
//! the fixed-size aliases inside the Lie groups). This module adds the few
//! operations the rest of the crate needs on top of them:
//! - normalization with a defined fallback direction
//! - concatenation and construction from flat lists
//! - true matrix inversion that reports singular input
//! - sub-block extraction that only yields a matrix for square blocks
//! - packing of symmetric matrices into their upper triangle

use nalgebra::{DMatrix, DVector};
use std::ops::Range;
use thiserror::Error;

pub mod symmetric;

pub use symmetric::{is_symmetric, list_to_symmetric, symmetric_to_list};

/// Norms at or below this value are treated as zero by [`normalized`].
pub const NORM_EPSILON: f64 = 1e-12;

/// Errors raised by the linear algebra helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinAlgError {
    /// The packed list length is not a triangular number N(N+1)/2.
    #[error("cannot unpack {len} values into a symmetric matrix")]
    MalformedPacking { len: usize },

    #[error("expected a square matrix, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("matrix is singular")]
    Singular,

    #[error("block rows {rows:?} cols {cols:?} exceeds a {nrows}x{ncols} matrix")]
    BlockOutOfBounds {
        rows: Range<usize>,
        cols: Range<usize>,
        nrows: usize,
        ncols: usize,
    },
}

/// Result type for linear algebra helpers.
pub type LinAlgResult<T> = Result<T, LinAlgError>;

/// Result of [`sub_block`]: square blocks stay matrices, slices degrade to a flat array.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Matrix(DMatrix<f64>),
    /// Row-major values of a non-square block.
    Array(Vec<f64>),
}

impl Block {
    /// The block as a matrix, if it is square.
    pub fn as_matrix(&self) -> Option<&DMatrix<f64>> {
        match self {
            Block::Matrix(m) => Some(m),
            Block::Array(_) => None,
        }
    }

    /// Row-major values regardless of shape.
    pub fn values(&self) -> Vec<f64> {
        match self {
            Block::Matrix(m) => m.transpose().iter().copied().collect(),
            Block::Array(values) => values.clone(),
        }
    }
}

/// Build a column vector from a flat list.
pub fn vector_from_slice(values: &[f64]) -> DVector<f64> {
    DVector::from_column_slice(values)
}

/// Concatenate two column vectors, `a` on top of `b`.
pub fn concat(a: &DVector<f64>, b: &DVector<f64>) -> DVector<f64> {
    DVector::from_iterator(a.len() + b.len(), a.iter().chain(b.iter()).copied())
}

/// Unit vector in the direction of `v`.
///
/// When the magnitude is approximately zero the result is the first basis
/// vector `e₀`, so callers always get a unit vector back for non-empty input.
pub fn normalized(v: &DVector<f64>) -> DVector<f64> {
    let norm = v.norm();
    if norm > NORM_EPSILON {
        v / norm
    } else {
        let mut fallback = DVector::zeros(v.len());
        if !fallback.is_empty() {
            fallback[0] = 1.0;
        }
        fallback
    }
}

/// Invert a square matrix.
///
/// Uses an LU decomposition; singular input is an error rather than a
/// pseudo-inverse.
pub fn invert(m: &DMatrix<f64>) -> LinAlgResult<DMatrix<f64>> {
    if !m.is_square() {
        return Err(LinAlgError::NotSquare {
            rows: m.nrows(),
            cols: m.ncols(),
        });
    }
    m.clone().try_inverse().ok_or(LinAlgError::Singular)
}

/// Extract the block `m[rows, cols]`.
pub fn sub_block(m: &DMatrix<f64>, rows: Range<usize>, cols: Range<usize>) -> LinAlgResult<Block> {
    if rows.start > rows.end || cols.start > cols.end || rows.end > m.nrows() || cols.end > m.ncols()
    {
        return Err(LinAlgError::BlockOutOfBounds {
            rows,
            cols,
            nrows: m.nrows(),
            ncols: m.ncols(),
        });
    }

    let view = m.view(
        (rows.start, cols.start),
        (rows.end - rows.start, cols.end - cols.start),
    );
    if view.nrows() == view.ncols() {
        Ok(Block::Matrix(view.clone_owned()))
    } else {
        Ok(Block::Array(view.transpose().iter().copied().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{dmatrix, dvector};

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn test_normalized() {
        let v = dvector![3.0, 0.0, 4.0];
        let n = normalized(&v);
        assert!((n.norm() - 1.0).abs() < TOLERANCE);
        assert!((n[0] - 0.6).abs() < TOLERANCE);
        assert!((n[2] - 0.8).abs() < TOLERANCE);
    }

    #[test]
    fn test_normalized_zero_falls_back_to_first_axis() {
        let n = normalized(&DVector::zeros(3));
        assert_eq!(n, dvector![1.0, 0.0, 0.0]);
        assert!(normalized(&DVector::zeros(0)).is_empty());
    }

    #[test]
    fn test_concat() {
        let v = concat(&dvector![1.0, 2.0], &dvector![3.0]);
        assert_eq!(v, dvector![1.0, 2.0, 3.0]);
        assert_eq!(vector_from_slice(&[1.0, 2.0, 3.0]), v);
    }

    #[test]
    fn test_invert() {
        let m = dmatrix![4.0, 7.0; 2.0, 6.0];
        let inv = invert(&m).unwrap();
        let product = &m * &inv;
        assert!((product - DMatrix::identity(2, 2)).norm() < TOLERANCE);
    }

    #[test]
    fn test_invert_singular() {
        let m = dmatrix![1.0, 2.0; 2.0, 4.0];
        assert_eq!(invert(&m), Err(LinAlgError::Singular));

        let rect = DMatrix::<f64>::zeros(2, 3);
        assert!(matches!(invert(&rect), Err(LinAlgError::NotSquare { .. })));
    }

    #[test]
    fn test_sub_block_square_stays_matrix() {
        let m = dmatrix![1.0, 2.0, 3.0; 4.0, 5.0, 6.0; 7.0, 8.0, 9.0];
        let block = sub_block(&m, 1..3, 1..3).unwrap();
        assert_eq!(block, Block::Matrix(dmatrix![5.0, 6.0; 8.0, 9.0]));
    }

    #[test]
    fn test_sub_block_slice_degrades_to_array() {
        let m = dmatrix![1.0, 2.0, 3.0; 4.0, 5.0, 6.0; 7.0, 8.0, 9.0];

        let row = sub_block(&m, 1..2, 0..3).unwrap();
        assert_eq!(row, Block::Array(vec![4.0, 5.0, 6.0]));
        assert!(row.as_matrix().is_none());

        let column = sub_block(&m, 0..3, 2..3).unwrap();
        assert_eq!(column.values(), vec![3.0, 6.0, 9.0]);

        let rect = sub_block(&m, 0..2, 0..3).unwrap();
        assert_eq!(rect.values(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_sub_block_out_of_bounds() {
        let m = DMatrix::<f64>::identity(3, 3);
        assert!(matches!(
            sub_block(&m, 0..4, 0..1),
            Err(LinAlgError::BlockOutOfBounds { .. })
        ));
    }
}
