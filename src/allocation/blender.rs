//! Inverse-volatility / Kelly weight blending

use crate::config::PortfolioConfig;
use crate::error::Result;
use crate::linalg::{invert, is_zero_matrix, multiply_matrix_vector, normalize};
use crate::types::{Strategy, MIN_VOLATILITY};
use nalgebra::DMatrix;
use serde::Serialize;
use tracing::warn;

/// Every stage of the weight pipeline, for display and auditing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlendedWeights {
    /// Inverse-volatility (risk parity) weights
    pub base: Vec<f64>,
    /// `sharpe * σ` return proxy
    pub expected_returns: Vec<f64>,
    /// Normalized `Cov⁻¹ μ`
    pub kelly: Vec<f64>,
    /// True when the covariance had no usable inverse
    pub kelly_degenerate: bool,
    /// α-mix of base and Kelly
    pub blended: Vec<f64>,
    /// After per-strategy volatility targeting
    pub vol_scaled: Vec<f64>,
    /// After the pause mask
    pub weights: Vec<f64>,
}

/// Blends risk-parity and Kelly weights under a volatility target
#[derive(Debug, Clone, Copy)]
pub struct WeightBlender {
    kelly_blend_factor: f64,
    volatility_target: f64,
}

impl WeightBlender {
    pub fn new(kelly_blend_factor: f64, volatility_target: f64) -> Self {
        Self {
            kelly_blend_factor,
            volatility_target,
        }
    }

    pub fn from_config(config: &PortfolioConfig) -> Self {
        Self::new(config.kelly_blend_factor, config.volatility_target)
    }

    /// `1/σ` normalized; near-zero volatilities get no weight
    pub fn inverse_volatility_weights(volatilities: &[f64]) -> Vec<f64> {
        let inv_vol: Vec<f64> = volatilities
            .iter()
            .map(|&s| if s > MIN_VOLATILITY { 1.0 / s } else { 0.0 })
            .collect();
        normalize(&inv_vol)
    }

    /// Normalized `Cov⁻¹ μ` and whether the inverse was degenerate
    pub fn kelly_weights(
        covariance: &DMatrix<f64>,
        expected_returns: &[f64],
    ) -> Result<(Vec<f64>, bool)> {
        let inverse = invert(covariance)?;
        let degenerate = !expected_returns.is_empty() && is_zero_matrix(&inverse);
        let raw = multiply_matrix_vector(&inverse, expected_returns)?;
        Ok((normalize(&raw), degenerate))
    }

    /// `(1-α)·base + α·kelly`, renormalized
    pub fn blend(&self, base: &[f64], kelly: &[f64]) -> Vec<f64> {
        let alpha = self.kelly_blend_factor;
        let mixed: Vec<f64> = base
            .iter()
            .zip(kelly)
            .map(|(b, k)| (1.0 - alpha) * b + alpha * k)
            .collect();
        normalize(&mixed)
    }

    /// Scale each weight by `min(1, target/σ)` and renormalize
    pub fn target_volatility(&self, weights: &[f64], volatilities: &[f64]) -> Vec<f64> {
        let scaled: Vec<f64> = weights
            .iter()
            .zip(volatilities)
            .map(|(w, &s)| w * (self.volatility_target / s.max(MIN_VOLATILITY)).min(1.0))
            .collect();
        normalize(&scaled)
    }

    /// Zero out paused strategies and renormalize
    pub fn apply_pause_mask(weights: &[f64], strategies: &[Strategy]) -> Vec<f64> {
        let masked: Vec<f64> = weights
            .iter()
            .zip(strategies)
            .map(|(w, s)| if s.paused { 0.0 } else { *w })
            .collect();
        normalize(&masked)
    }

    /// Run the full pipeline
    pub fn compute(
        &self,
        strategies: &[Strategy],
        covariance: &DMatrix<f64>,
    ) -> Result<BlendedWeights> {
        let volatilities: Vec<f64> = strategies.iter().map(|s| s.realized_volatility).collect();
        let expected_returns: Vec<f64> = strategies
            .iter()
            .map(|s| s.sharpe * s.realized_volatility)
            .collect();

        let base = Self::inverse_volatility_weights(&volatilities);
        let (kelly, kelly_degenerate) = Self::kelly_weights(covariance, &expected_returns)?;
        if kelly_degenerate {
            warn!("Covariance matrix is singular, Kelly weights fall back to uniform");
        }

        let blended = self.blend(&base, &kelly);
        let vol_scaled = self.target_volatility(&blended, &volatilities);
        let weights = Self::apply_pause_mask(&vol_scaled, strategies);

        if !strategies.is_empty() && strategies.iter().all(|s| s.paused) {
            warn!("All strategies paused, weights fall back to uniform");
        }

        Ok(BlendedWeights {
            base,
            expected_returns,
            kelly,
            kelly_degenerate,
            blended,
            vol_scaled,
            weights,
        })
    }
}
