//! End-to-end evaluation of a strategy book
//!
//! Covariance, weights, allocation, attribution and decisions are all pure
//! functions of the inputs, so a snapshot can be recomputed at will.

use crate::allocation::{Allocation, BlendedWeights, WeightBlender};
use crate::config::{validate_strategies, PortfolioConfig, ReplayConfig};
use crate::decision::{Decision, DecisionEngine, DecisionInput, DecisionRules};
use crate::error::{AllocatorError, Result};
use crate::replay::{self, ReplayPoint};
use crate::risk::{covariance_matrix, CorrelationModel, RiskAttribution};
use crate::types::{Action, HealthLight, Strategy};
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

/// Everything derived from one strategy book
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    #[serde(serialize_with = "serialize_rows")]
    pub covariance: DMatrix<f64>,
    pub weights: BlendedWeights,
    pub allocation: Allocation,
    pub attribution: RiskAttribution,
    pub average_correlations: Vec<f64>,
    pub health: Vec<HealthLight>,
    pub decisions: Vec<Decision>,
}

impl Evaluation {
    /// Sum of positive recommended deltas
    pub fn total_increase(&self) -> f64 {
        self.decisions
            .iter()
            .filter(|d| d.action == Action::Increase)
            .map(|d| d.recommended_delta)
            .sum()
    }

    /// Sum of |delta| over decreases
    pub fn total_decrease(&self) -> f64 {
        self.decisions
            .iter()
            .filter(|d| d.action == Action::Decrease)
            .map(|d| d.recommended_delta.abs())
            .sum()
    }

    pub fn margin_ok(&self, rules: &DecisionRules) -> bool {
        self.allocation.margin_ok(rules.min_margin_buffer_multiple)
    }
}

fn serialize_rows<S>(matrix: &DMatrix<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let rows: Vec<Vec<f64>> = matrix
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect();
    rows.serialize(serializer)
}

/// Evaluate a strategy book under one configuration
pub fn evaluate(
    strategies: &[Strategy],
    config: &PortfolioConfig,
    rules: &DecisionRules,
) -> Result<Evaluation> {
    config.validate()?;
    rules.validate()?;
    validate_strategies(strategies)?;

    let n = strategies.len();
    let correlation = CorrelationModel::from_config(config, n)?;
    let volatilities: Vec<f64> = strategies.iter().map(|s| s.realized_volatility).collect();
    let covariance = covariance_matrix(&volatilities, &correlation);

    let weights = WeightBlender::from_config(config).compute(strategies, &covariance)?;
    let allocation = Allocation::translate(&weights.weights, strategies, config);
    let attribution = RiskAttribution::compute(&covariance, &weights.weights)?;
    let average_correlations = correlation.average_correlations(n);

    if !allocation.margin_ok(rules.min_margin_buffer_multiple) {
        warn!(
            "Cash buffer covers margin {:.2}x, below the {:.2}x minimum",
            allocation.margin_buffer_multiple, rules.min_margin_buffer_multiple
        );
    }

    let engine = DecisionEngine::new(config, rules.clone());
    let decisions: Vec<Decision> = strategies
        .iter()
        .enumerate()
        .map(|(i, strategy)| {
            engine.decide(&DecisionInput {
                strategy,
                target_notional: allocation.notionals[i],
                average_correlation: average_correlations[i],
                deployable_capital: allocation.deployable_capital,
                margin_buffer_multiple: allocation.margin_buffer_multiple,
            })
        })
        .collect();

    let health = strategies
        .iter()
        .map(|s| s.health(config.volatility_target))
        .collect();

    let evaluation = Evaluation {
        covariance,
        weights,
        allocation,
        attribution,
        average_correlations,
        health,
        decisions,
    };

    debug!(
        strategies = n,
        portfolio_volatility = evaluation.attribution.portfolio_volatility,
        total_increase = evaluation.total_increase(),
        total_decrease = evaluation.total_decrease(),
        "Evaluated strategy book"
    );

    Ok(evaluation)
}

/// Replay the portfolio volatility of an evaluated book against its target
pub fn replay_portfolio(
    evaluation: &Evaluation,
    config: &PortfolioConfig,
    window: &ReplayConfig,
) -> Result<Vec<ReplayPoint>> {
    window.validate()?;
    Ok(replay::generate(
        window.days,
        evaluation.attribution.portfolio_volatility,
        config.volatility_target,
        window.seed,
    ))
}

/// Evaluate the book on an evenly spaced Kelly blend grid from 0 to 1
pub fn sweep_kelly_blend(
    strategies: &[Strategy],
    config: &PortfolioConfig,
    rules: &DecisionRules,
    steps: usize,
) -> Result<Vec<(f64, Evaluation)>> {
    if steps < 2 {
        return Err(AllocatorError::config(
            "steps",
            format!("need at least 2 grid points, got {steps}"),
        ));
    }

    (0..steps)
        .into_par_iter()
        .map(|i| {
            let alpha = i as f64 / (steps - 1) as f64;
            let mut snapshot = config.clone();
            snapshot.set_kelly_blend_factor(alpha)?;
            evaluate(strategies, &snapshot, rules).map(|e| (alpha, e))
        })
        .collect()
}
