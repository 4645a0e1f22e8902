//! Configuration management

use crate::decision::DecisionRules;
use crate::error::{AllocatorError, Result};
use crate::risk::CorrelationModel;
use crate::types::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Floor applied by `PortfolioConfig::reduce_risk`
pub const MIN_VOLATILITY_TARGET: f64 = 0.02;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub portfolio: PortfolioConfig,
    #[serde(default)]
    pub rules: DecisionRules,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub strategies: Vec<Strategy>,
}

/// Fund-wide allocation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// Capital under management
    pub total_capital: f64,
    /// Fraction of capital held back as cash (e.g., 0.25 = 25%)
    pub cash_buffer_fraction: f64,
    /// Annualized portfolio volatility target
    pub volatility_target: f64,
    /// Mix between inverse-vol (0) and Kelly (1) weights
    pub kelly_blend_factor: f64,
    /// Margin posted per unit of futures notional
    pub futures_margin_rate: f64,
    /// Correlation applied between every pair of strategies
    pub cross_strategy_correlation: f64,
    /// Full correlation matrix, overrides the scalar when present
    pub correlation_matrix: Option<Vec<Vec<f64>>>,
    /// Smallest adjustment worth executing
    pub min_adjustment_unit: f64,
    /// Share of the target gap closable per day
    pub max_daily_gap_fraction: f64,
    /// Share of deployable capital movable per strategy per day
    pub max_daily_deploy_fraction: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            total_capital: 30_000_000.0,
            cash_buffer_fraction: 0.25,
            volatility_target: 0.10,
            kelly_blend_factor: 0.30,
            futures_margin_rate: 0.10,
            cross_strategy_correlation: 0.20,
            correlation_matrix: None,
            min_adjustment_unit: 100_000.0,
            max_daily_gap_fraction: 0.20,
            max_daily_deploy_fraction: 0.05,
        }
    }
}

impl PortfolioConfig {
    /// Check every field against its documented range
    pub fn validate(&self) -> Result<()> {
        check(
            "total_capital",
            self.total_capital,
            self.total_capital > 0.0,
            "must be positive",
        )?;
        check(
            "cash_buffer_fraction",
            self.cash_buffer_fraction,
            (0.0..1.0).contains(&self.cash_buffer_fraction),
            "must be in [0, 1)",
        )?;
        check(
            "volatility_target",
            self.volatility_target,
            self.volatility_target > 0.0,
            "must be positive",
        )?;
        check(
            "kelly_blend_factor",
            self.kelly_blend_factor,
            (0.0..=1.0).contains(&self.kelly_blend_factor),
            "must be in [0, 1]",
        )?;
        check(
            "futures_margin_rate",
            self.futures_margin_rate,
            self.futures_margin_rate > 0.0 && self.futures_margin_rate <= 1.0,
            "must be in (0, 1]",
        )?;
        check(
            "cross_strategy_correlation",
            self.cross_strategy_correlation,
            self.cross_strategy_correlation > -1.0 && self.cross_strategy_correlation < 1.0,
            "must be in (-1, 1)",
        )?;
        check(
            "min_adjustment_unit",
            self.min_adjustment_unit,
            self.min_adjustment_unit >= 0.0,
            "must be non-negative",
        )?;
        check(
            "max_daily_gap_fraction",
            self.max_daily_gap_fraction,
            (0.0..=1.0).contains(&self.max_daily_gap_fraction),
            "must be in [0, 1]",
        )?;
        check(
            "max_daily_deploy_fraction",
            self.max_daily_deploy_fraction,
            (0.0..=1.0).contains(&self.max_daily_deploy_fraction),
            "must be in [0, 1]",
        )?;
        if let Some(rows) = &self.correlation_matrix {
            CorrelationModel::from_rows(rows, rows.len())?;
        }
        Ok(())
    }

    /// Capital available for allocation after the cash buffer
    pub fn deployable_capital(&self) -> f64 {
        self.total_capital * (1.0 - self.cash_buffer_fraction)
    }

    /// Capital held back as cash
    pub fn cash_buffer(&self) -> f64 {
        self.total_capital * self.cash_buffer_fraction
    }

    pub fn set_total_capital(&mut self, value: f64) -> Result<()> {
        self.update(|c| c.total_capital = value)
    }

    pub fn set_cash_buffer_fraction(&mut self, value: f64) -> Result<()> {
        self.update(|c| c.cash_buffer_fraction = value)
    }

    pub fn set_volatility_target(&mut self, value: f64) -> Result<()> {
        self.update(|c| c.volatility_target = value)
    }

    pub fn set_kelly_blend_factor(&mut self, value: f64) -> Result<()> {
        self.update(|c| c.kelly_blend_factor = value)
    }

    pub fn set_futures_margin_rate(&mut self, value: f64) -> Result<()> {
        self.update(|c| c.futures_margin_rate = value)
    }

    pub fn set_cross_strategy_correlation(&mut self, value: f64) -> Result<()> {
        self.update(|c| c.cross_strategy_correlation = value)
    }

    pub fn set_correlation_matrix(&mut self, matrix: Option<Vec<Vec<f64>>>) -> Result<()> {
        self.update(|c| c.correlation_matrix = matrix)
    }

    pub fn set_min_adjustment_unit(&mut self, value: f64) -> Result<()> {
        self.update(|c| c.min_adjustment_unit = value)
    }

    pub fn set_max_daily_gap_fraction(&mut self, value: f64) -> Result<()> {
        self.update(|c| c.max_daily_gap_fraction = value)
    }

    pub fn set_max_daily_deploy_fraction(&mut self, value: f64) -> Result<()> {
        self.update(|c| c.max_daily_deploy_fraction = value)
    }

    /// Cut the volatility target by 30%, never below `MIN_VOLATILITY_TARGET`
    pub fn reduce_risk(&mut self) {
        self.volatility_target = (self.volatility_target * 0.7).max(MIN_VOLATILITY_TARGET);
        tracing::info!(
            "Volatility target reduced to {:.2}%",
            self.volatility_target * 100.0
        );
    }

    /// Apply a change only if the result still validates
    fn update(&mut self, change: impl FnOnce(&mut Self)) -> Result<()> {
        let mut next = self.clone();
        change(&mut next);
        next.validate()?;
        *self = next;
        Ok(())
    }
}

/// Historical replay window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Number of past days to replay (10 to 120)
    pub days: u32,
    /// Seed for the synthetic noise stream
    pub seed: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            days: 30,
            seed: 20_240_101,
        }
    }
}

impl ReplayConfig {
    pub fn validate(&self) -> Result<()> {
        if !(10..=120).contains(&self.days) {
            return Err(AllocatorError::config(
                "replay.days",
                format!("must be in 10..=120, got {}", self.days),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("FUND").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations
    pub fn load_default() -> Result<Self> {
        let paths = [
            "config.toml",
            "config.yaml",
            "~/.config/fund-allocator/config.toml",
        ];

        for path in paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::load(expanded.as_ref());
            }
        }

        Err(AllocatorError::config("path", "no configuration file found"))
    }

    /// Validate every section and the strategy book
    pub fn validate(&self) -> Result<()> {
        self.portfolio.validate()?;
        self.rules.validate()?;
        self.replay.validate()?;
        validate_strategies(&self.strategies)?;

        if let Some(rows) = &self.portfolio.correlation_matrix {
            if rows.len() != self.strategies.len() {
                return Err(AllocatorError::DimensionMismatch {
                    expected: self.strategies.len(),
                    actual: rows.len(),
                });
            }
        }
        Ok(())
    }
}

/// Validate each strategy and reject duplicate codes
pub fn validate_strategies(strategies: &[Strategy]) -> Result<()> {
    let mut seen = HashSet::new();
    for strategy in strategies {
        strategy.validate()?;
        if !seen.insert(strategy.code.as_str()) {
            return Err(AllocatorError::strategy(&strategy.code, "duplicate code"));
        }
    }
    Ok(())
}

fn check(field: &str, value: f64, ok: bool, reason: &str) -> Result<()> {
    if value.is_finite() && ok {
        Ok(())
    } else {
        Err(AllocatorError::config(field, format!("{reason}, got {value}")))
    }
}
