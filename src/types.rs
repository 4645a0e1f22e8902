//! Core domain types: strategies, actions and orders

use crate::error::{AllocatorError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Volatilities at or below this are treated as zero for weighting.
pub const MIN_VOLATILITY: f64 = 1e-6;

/// Asset class of a strategy sleeve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    #[serde(alias = "stock")]
    Equity,
    Futures,
}

impl StrategyKind {
    /// Whether positions of this kind post margin
    pub fn requires_margin(&self) -> bool {
        matches!(self, StrategyKind::Futures)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Equity => write!(f, "equity"),
            StrategyKind::Futures => write!(f, "futures"),
        }
    }
}

/// A unit of capital allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// Unique identifier
    pub code: String,
    #[serde(default)]
    pub kind: StrategyKind,
    /// Nominal design volatility (annualized)
    pub target_volatility: f64,
    /// Live volatility estimate (annualized)
    pub realized_volatility: f64,
    /// Trailing Sharpe ratio
    #[serde(default)]
    pub sharpe: f64,
    /// Current drawdown as a fraction of peak
    #[serde(default)]
    pub drawdown: f64,
    #[serde(default)]
    pub paused: bool,
    /// Currency amount currently deployed
    #[serde(default)]
    pub current_notional: f64,
    /// Estimated market impact of adjusting the position
    #[serde(default)]
    pub impact_cost_bps: f64,
}

impl Strategy {
    /// Create a strategy whose realized volatility matches its design volatility
    pub fn new(code: impl Into<String>, kind: StrategyKind, volatility: f64) -> Self {
        Self {
            code: code.into(),
            kind,
            target_volatility: volatility,
            realized_volatility: volatility,
            sharpe: 0.0,
            drawdown: 0.0,
            paused: false,
            current_notional: 0.0,
            impact_cost_bps: 0.0,
        }
    }

    pub fn with_sharpe(mut self, sharpe: f64) -> Self {
        self.sharpe = sharpe;
        self
    }

    pub fn with_drawdown(mut self, drawdown: f64) -> Self {
        self.drawdown = drawdown;
        self
    }

    pub fn with_realized_volatility(mut self, volatility: f64) -> Self {
        self.realized_volatility = volatility;
        self
    }

    pub fn with_current_notional(mut self, notional: f64) -> Self {
        self.current_notional = notional;
        self
    }

    pub fn with_impact_cost_bps(mut self, bps: f64) -> Self {
        self.impact_cost_bps = bps;
        self
    }

    pub fn paused(mut self) -> Self {
        self.paused = true;
        self
    }

    /// Snap the live volatility estimate back to the design volatility
    pub fn reset_realized_volatility(&mut self) {
        self.realized_volatility = self.target_volatility;
    }

    /// Check field ranges
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(AllocatorError::strategy(&self.code, "code must not be empty"));
        }

        let non_negative = [
            ("target_volatility", self.target_volatility),
            ("realized_volatility", self.realized_volatility),
            ("drawdown", self.drawdown),
            ("current_notional", self.current_notional),
            ("impact_cost_bps", self.impact_cost_bps),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(AllocatorError::strategy(
                    &self.code,
                    format!("{field} must be a finite non-negative number, got {value}"),
                ));
            }
        }

        if !self.sharpe.is_finite() {
            return Err(AllocatorError::strategy(&self.code, "sharpe must be finite"));
        }

        Ok(())
    }

    /// Traffic-light status against the portfolio volatility target
    pub fn health(&self, volatility_target: f64) -> HealthLight {
        if self.drawdown > 0.20 {
            HealthLight::Red
        } else if self.drawdown > 0.10 {
            HealthLight::Orange
        } else if self.drawdown > 0.05 || self.realized_volatility > volatility_target * 1.5 {
            HealthLight::Yellow
        } else {
            HealthLight::Green
        }
    }
}

/// Strategy status light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLight {
    Green,
    Yellow,
    Orange,
    Red,
}

impl fmt::Display for HealthLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthLight::Green => write!(f, "GREEN"),
            HealthLight::Yellow => write!(f, "YELLOW"),
            HealthLight::Orange => write!(f, "ORANGE"),
            HealthLight::Red => write!(f, "RED"),
        }
    }
}

/// Recommended capital action for a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Increase,
    Decrease,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Increase => write!(f, "increase"),
            Action::Decrease => write!(f, "decrease"),
            Action::Hold => write!(f, "hold"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Execution ticket produced when suggested adjustments are applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub strategy_code: String,
    pub side: Side,
    pub amount: Decimal,
    pub new_notional: Decimal,
}

/// Round to whole units, halves towards +∞ (-0.5 rounds to 0)
pub fn round_half_up(amount: f64) -> f64 {
    (amount + 0.5).floor()
}

/// Round a currency amount to whole units
pub fn to_currency(amount: f64) -> Result<Decimal> {
    Ok(Decimal::try_from(round_half_up(amount))?)
}
