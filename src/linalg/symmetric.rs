//! Packing of symmetric matrices into their upper triangle.
//!
//! Information matrices are stored and serialized as the entries `(i, j)` with
//! `i <= j`, row-major. An N×N matrix packs into N(N+1)/2 values.

use super::{LinAlgError, LinAlgResult};
use nalgebra::DMatrix;

/// Flatten the upper triangle (i ≤ j) of `m`, row by row.
///
/// Entries below the diagonal are ignored.
pub fn symmetric_to_list(m: &DMatrix<f64>) -> Vec<f64> {
    let n = m.nrows().min(m.ncols());
    let mut list = Vec::with_capacity(n * (n + 1) / 2);
    for i in 0..n {
        for j in i..n {
            list.push(m[(i, j)]);
        }
    }
    list
}

/// Rebuild a symmetric matrix from its packed upper triangle.
///
/// Fails when `list.len()` is not a triangular number, i.e. when
/// `-0.5 + 0.5 * sqrt(1 + 8 * len)` is not a non-negative integer.
pub fn list_to_symmetric(list: &[f64]) -> LinAlgResult<DMatrix<f64>> {
    let len = list.len();
    let n = packed_dimension(len).ok_or(LinAlgError::MalformedPacking { len })?;

    let mut m = DMatrix::zeros(n, n);
    let mut values = list.iter();
    for i in 0..n {
        for j in i..n {
            // length was validated above
            let value = *values.next().ok_or(LinAlgError::MalformedPacking { len })?;
            m[(i, j)] = value;
            m[(j, i)] = value;
        }
    }
    Ok(m)
}

/// Dimension N such that N(N+1)/2 == len.
fn packed_dimension(len: usize) -> Option<usize> {
    let estimate = -0.5 + 0.5 * (1.0 + 8.0 * len as f64).sqrt();
    let n = estimate.round() as usize;
    (n * (n + 1) / 2 == len).then_some(n)
}

/// Whether `m` is square and equal to its transpose within `tolerance`.
pub fn is_symmetric(m: &DMatrix<f64>, tolerance: f64) -> bool {
    if !m.is_square() {
        return false;
    }
    (0..m.nrows()).all(|i| (i + 1..m.ncols()).all(|j| (m[(i, j)] - m[(j, i)]).abs() <= tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dmatrix;

    #[test]
    fn test_symmetric_to_list_order() {
        let m = dmatrix![1.0, 2.0, 3.0; 2.0, 4.0, 5.0; 3.0, 5.0, 6.0];
        assert_eq!(symmetric_to_list(&m), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_list_to_symmetric() {
        let m = list_to_symmetric(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(m, dmatrix![1.0, 2.0; 2.0, 3.0]);
    }

    #[test]
    fn test_roundtrip_is_exact() {
        let m2 = dmatrix![0.1, -7.25; -7.25, 1e-9];
        let m3 = dmatrix![
            500.0, 0.3333333333333333, -2.0;
            0.3333333333333333, 42.0, 1e6;
            -2.0, 1e6, std::f64::consts::PI
        ];
        assert_eq!(list_to_symmetric(&symmetric_to_list(&m2)).unwrap(), m2);
        assert_eq!(list_to_symmetric(&symmetric_to_list(&m3)).unwrap(), m3);
    }

    #[test]
    fn test_dimension_generic() {
        let list: Vec<f64> = (0..21).map(f64::from).collect();
        let m = list_to_symmetric(&list).unwrap();
        assert_eq!(m.nrows(), 6);
        assert!(is_symmetric(&m, 0.0));
        assert_eq!(symmetric_to_list(&m), list);
        assert_eq!(list_to_symmetric(&[]).unwrap().nrows(), 0);
    }

    #[test]
    fn test_malformed_length_rejected() {
        assert_eq!(
            list_to_symmetric(&[1.0, 2.0]),
            Err(LinAlgError::MalformedPacking { len: 2 })
        );
        assert!(list_to_symmetric(&[0.0; 4]).is_err());
        assert!(list_to_symmetric(&[0.0; 5]).is_err());
    }

    #[test]
    fn test_is_symmetric() {
        assert!(is_symmetric(&dmatrix![1.0, 2.0; 2.0, 1.0], 0.0));
        assert!(!is_symmetric(&dmatrix![1.0, 2.0; 2.5, 1.0], 1e-9));
        assert!(!is_symmetric(&DMatrix::zeros(2, 3), 1.0));
    }
}
