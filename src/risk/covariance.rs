//! Covariance construction from volatilities and a correlation model

use crate::config::PortfolioConfig;
use crate::error::{AllocatorError, Result};
use nalgebra::DMatrix;

const UNIT_DIAGONAL_TOLERANCE: f64 = 1e-9;

/// Pairwise correlation structure between strategies
#[derive(Debug, Clone, PartialEq)]
pub enum CorrelationModel {
    /// One correlation shared by every distinct pair
    Uniform(f64),
    /// Full symmetric matrix with unit diagonal
    Matrix(DMatrix<f64>),
}

impl CorrelationModel {
    /// Pick the configured model for a book of `n` strategies
    pub fn from_config(config: &PortfolioConfig, n: usize) -> Result<Self> {
        match &config.correlation_matrix {
            Some(rows) => Self::from_rows(rows, n),
            None => Ok(Self::Uniform(config.cross_strategy_correlation)),
        }
    }

    /// Build and validate a full matrix model from row vectors
    pub fn from_rows(rows: &[Vec<f64>], n: usize) -> Result<Self> {
        if rows.len() != n {
            return Err(AllocatorError::DimensionMismatch {
                expected: n,
                actual: rows.len(),
            });
        }
        if let Some(row) = rows.iter().find(|r| r.len() != n) {
            return Err(AllocatorError::DimensionMismatch {
                expected: n,
                actual: row.len(),
            });
        }

        let matrix = DMatrix::from_fn(n, n, |i, j| rows[i][j]);
        for i in 0..n {
            if (matrix[(i, i)] - 1.0).abs() > UNIT_DIAGONAL_TOLERANCE {
                return Err(AllocatorError::config(
                    "correlation_matrix",
                    format!("diagonal entry {i} must be 1, got {}", matrix[(i, i)]),
                ));
            }
            for j in 0..n {
                let rho = matrix[(i, j)];
                if !rho.is_finite() || !(-1.0..=1.0).contains(&rho) {
                    return Err(AllocatorError::config(
                        "correlation_matrix",
                        format!("entry ({i}, {j}) must be in [-1, 1], got {rho}"),
                    ));
                }
                if (rho - matrix[(j, i)]).abs() > UNIT_DIAGONAL_TOLERANCE {
                    return Err(AllocatorError::config(
                        "correlation_matrix",
                        format!("matrix is not symmetric at ({i}, {j})"),
                    ));
                }
            }
        }

        Ok(Self::Matrix(matrix))
    }

    /// Correlation between strategies `i` and `j`
    pub fn correlation(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 1.0;
        }
        match self {
            CorrelationModel::Uniform(rho) => *rho,
            CorrelationModel::Matrix(m) => m[(i, j)],
        }
    }

    /// Mean correlation of each strategy with all the others (0 for a single strategy)
    pub fn average_correlations(&self, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let others: f64 = (0..n).filter(|&j| j != i).map(|j| self.correlation(i, j)).sum();
                others / (n.saturating_sub(1)).max(1) as f64
            })
            .collect()
    }
}

/// `Cov[i][j] = σ_i σ_j ρ_ij` with `ρ_ii = 1`
pub fn covariance_matrix(volatilities: &[f64], correlation: &CorrelationModel) -> DMatrix<f64> {
    let n = volatilities.len();
    DMatrix::from_fn(n, n, |i, j| {
        volatilities[i] * volatilities[j] * correlation.correlation(i, j)
    })
}
