//! Small dense linear algebra helpers
//!
//! Inversion never fails on degenerate input: a singular matrix inverts to
//! the zero matrix, which callers read as "no informative inverse".

use crate::error::{AllocatorError, Result};
use nalgebra::{DMatrix, DVector, Matrix2};

/// Determinant magnitude below which a 2x2 matrix is singular
pub const SINGULAR_DETERMINANT: f64 = 1e-8;

/// Relative pivot magnitude below which an NxN matrix is singular
pub const SINGULAR_PIVOT: f64 = 1e-10;

/// Closed-form inverse of a 2x2 matrix
pub fn invert2x2(m: &Matrix2<f64>) -> Matrix2<f64> {
    let (a, b, c, d) = (m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]);
    let det = a * d - b * c;
    if !det.is_finite() || det.abs() < SINGULAR_DETERMINANT {
        return Matrix2::zeros();
    }

    Matrix2::new(d / det, -b / det, -c / det, a / det)
}

/// Inverse of a square matrix, or the zero matrix when it is singular
///
/// 2x2 inputs use the closed form with the absolute determinant guard.
/// Larger inputs go through LU with partial pivoting and are rejected when
/// the smallest pivot falls below `SINGULAR_PIVOT` times the largest entry.
pub fn invert(m: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    if !m.is_square() {
        return Err(AllocatorError::DimensionMismatch {
            expected: m.nrows(),
            actual: m.ncols(),
        });
    }

    let n = m.nrows();
    if n == 2 {
        let inv = invert2x2(&Matrix2::new(m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]));
        return Ok(DMatrix::from_column_slice(2, 2, inv.as_slice()));
    }

    let scale = if n == 0 { 0.0 } else { m.amax() };
    if scale == 0.0 || !scale.is_finite() {
        return Ok(DMatrix::zeros(n, n));
    }

    let lu = m.clone().lu();
    let min_pivot = lu
        .u()
        .diagonal()
        .iter()
        .fold(f64::INFINITY, |acc, p| acc.min(p.abs()));
    if min_pivot < SINGULAR_PIVOT * scale {
        return Ok(DMatrix::zeros(n, n));
    }

    Ok(lu.try_inverse().unwrap_or_else(|| DMatrix::zeros(n, n)))
}

/// `m * v`, failing on a column/length mismatch
pub fn multiply_matrix_vector(m: &DMatrix<f64>, v: &[f64]) -> Result<Vec<f64>> {
    if m.ncols() != v.len() {
        return Err(AllocatorError::DimensionMismatch {
            expected: m.ncols(),
            actual: v.len(),
        });
    }

    let product = m * DVector::from_column_slice(v);
    Ok(product.iter().copied().collect())
}

/// Clamp negatives to zero and rescale to sum to one
///
/// Falls back to the uniform `1/n` vector when nothing positive remains.
pub fn normalize(v: &[f64]) -> Vec<f64> {
    let clamped: Vec<f64> = v
        .iter()
        .map(|x| if x.is_finite() { x.max(0.0) } else { 0.0 })
        .collect();
    let sum: f64 = clamped.iter().sum();

    if sum <= 0.0 || !sum.is_finite() {
        let uniform = 1.0 / v.len() as f64;
        return vec![uniform; v.len()];
    }

    clamped.into_iter().map(|x| x / sum).collect()
}

/// True when every entry is exactly zero
pub fn is_zero_matrix(m: &DMatrix<f64>) -> bool {
    m.iter().all(|x| *x == 0.0)
}
