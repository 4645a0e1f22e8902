//! Rebalancing thresholds

use crate::error::{AllocatorError, Result};
use serde::{Deserialize, Serialize};

/// Thresholds evaluated by the decision engine
///
/// Volatility ratios are multiples of the portfolio volatility target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionRules {
    /// Sharpe above this counts toward an increase
    pub strong_sharpe: f64,
    /// Realized vol below this multiple of target counts toward an increase
    pub low_volatility_ratio: f64,
    /// Average correlation below this counts toward an increase
    pub low_correlation: f64,
    /// Maximum impact cost for adding capital
    pub max_impact_bps: f64,
    /// Increase signals required before adding capital
    pub min_increase_signals: usize,
    /// Sharpe below this triggers a decrease
    pub negative_sharpe: f64,
    /// Realized vol above this multiple of target triggers a decrease
    pub high_volatility_ratio: f64,
    /// Drawdown at or above this triggers a decrease
    pub drawdown_limit: f64,
    /// Average correlation above this triggers a decrease
    pub correlation_cluster: f64,
    /// Futures margin buffer multiple below this triggers a decrease
    pub min_margin_buffer_multiple: f64,
    /// Drawdown at or above this (and below `drawdown_limit`) freezes increases
    pub yellow_zone_drawdown: f64,
    /// Minimum trim as a fraction of the current position
    pub min_trim_fraction: f64,
    /// Decrease cap floor as a fraction of the current position
    pub max_trim_fraction: f64,
}

impl Default for DecisionRules {
    fn default() -> Self {
        Self {
            strong_sharpe: 1.0,
            low_volatility_ratio: 0.9,
            low_correlation: 0.4,
            max_impact_bps: 25.0,
            min_increase_signals: 2,
            negative_sharpe: 0.0,
            high_volatility_ratio: 1.5,
            drawdown_limit: 0.10,
            correlation_cluster: 0.8,
            min_margin_buffer_multiple: 1.0,
            yellow_zone_drawdown: 0.05,
            min_trim_fraction: 0.10,
            max_trim_fraction: 0.20,
        }
    }
}

impl DecisionRules {
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("strong_sharpe", self.strong_sharpe),
            ("low_volatility_ratio", self.low_volatility_ratio),
            ("low_correlation", self.low_correlation),
            ("max_impact_bps", self.max_impact_bps),
            ("negative_sharpe", self.negative_sharpe),
            ("high_volatility_ratio", self.high_volatility_ratio),
            ("drawdown_limit", self.drawdown_limit),
            ("correlation_cluster", self.correlation_cluster),
            ("min_margin_buffer_multiple", self.min_margin_buffer_multiple),
            ("yellow_zone_drawdown", self.yellow_zone_drawdown),
            ("min_trim_fraction", self.min_trim_fraction),
            ("max_trim_fraction", self.max_trim_fraction),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(AllocatorError::config(
                    &format!("rules.{field}"),
                    "must be finite",
                ));
            }
        }

        if self.yellow_zone_drawdown > self.drawdown_limit {
            return Err(AllocatorError::config(
                "rules.yellow_zone_drawdown",
                "must not exceed drawdown_limit",
            ));
        }
        for (field, value) in [
            ("min_trim_fraction", self.min_trim_fraction),
            ("max_trim_fraction", self.max_trim_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AllocatorError::config(
                    &format!("rules.{field}"),
                    format!("must be in [0, 1], got {value}"),
                ));
            }
        }
        Ok(())
    }

    /// Drawdown band that blocks new capital without forcing a cut
    pub fn in_yellow_zone(&self, drawdown: f64) -> bool {
        drawdown >= self.yellow_zone_drawdown && drawdown < self.drawdown_limit
    }
}
