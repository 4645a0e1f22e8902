//! Variance decomposition by strategy

use crate::error::Result;
use crate::linalg::multiply_matrix_vector;
use nalgebra::DMatrix;
use serde::Serialize;

/// Per-strategy share of portfolio variance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAttribution {
    /// `w_i * (Cov w)_i`
    pub contributions: Vec<f64>,
    /// Contributions divided by their sum
    pub shares: Vec<f64>,
    pub portfolio_variance: f64,
    pub portfolio_volatility: f64,
}

impl RiskAttribution {
    pub fn compute(covariance: &DMatrix<f64>, weights: &[f64]) -> Result<Self> {
        let cov_weighted = multiply_matrix_vector(covariance, weights)?;
        let contributions: Vec<f64> = weights
            .iter()
            .zip(&cov_weighted)
            .map(|(w, cw)| w * cw)
            .collect();

        let portfolio_variance: f64 = contributions.iter().sum();
        let denominator = if portfolio_variance > 0.0 {
            portfolio_variance
        } else {
            1.0
        };
        let shares = contributions.iter().map(|rc| rc / denominator).collect();

        Ok(Self {
            contributions,
            shares,
            portfolio_variance,
            // Near-singular covariances can leave a tiny negative variance
            portfolio_volatility: portfolio_variance.max(0.0).sqrt(),
        })
    }
}
