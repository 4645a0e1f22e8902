//! Weights to currency: notionals, margin and cash coverage

use crate::config::PortfolioConfig;
use crate::types::Strategy;
use serde::Serialize;

/// Cash buffer must cover this many times the margin requirement
pub const MARGIN_COVERAGE_MULTIPLE: f64 = 3.0;

/// Currency view of a weight vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub deployable_capital: f64,
    pub cash_buffer: f64,
    /// Target notional per strategy
    pub notionals: Vec<f64>,
    /// Sum of futures target notionals
    pub futures_notional: f64,
    pub margin_required: f64,
    /// `cash_buffer / (3 * margin_required)`, +∞ without margin
    ///
    /// Serializes as `null` when infinite.
    pub margin_buffer_multiple: f64,
}

impl Allocation {
    pub fn translate(weights: &[f64], strategies: &[Strategy], config: &PortfolioConfig) -> Self {
        let deployable_capital = config.deployable_capital();
        let cash_buffer = config.cash_buffer();
        let notionals: Vec<f64> = weights.iter().map(|w| w * deployable_capital).collect();

        let futures_notional: f64 = notionals
            .iter()
            .zip(strategies)
            .filter(|(_, s)| s.kind.requires_margin())
            .map(|(n, _)| *n)
            .sum();
        let margin_required = futures_notional * config.futures_margin_rate;

        let margin_buffer_multiple = if margin_required > 0.0 {
            cash_buffer / (MARGIN_COVERAGE_MULTIPLE * margin_required)
        } else {
            f64::INFINITY
        };

        Self {
            deployable_capital,
            cash_buffer,
            notionals,
            futures_notional,
            margin_required,
            margin_buffer_multiple,
        }
    }

    /// Whether the cash buffer covers the margin policy
    pub fn margin_ok(&self, min_multiple: f64) -> bool {
        self.margin_buffer_multiple >= min_multiple
    }
}
