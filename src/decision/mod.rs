//! Rule-Based Rebalancing Decisions
//!
//! Classifies each strategy as increase / decrease / hold and sizes the
//! step under several simultaneous caps:
//! - Decrease triggers are OR'd (any one is enough)
//! - Increases need a supermajority of positive signals and no blockers
//! - Steps below the minimum adjustment unit collapse to hold

mod reasons;
mod rules;


pub use reasons::{DecreaseReason, HoldReason, IncreaseReason};
pub use rules::DecisionRules;

use crate::config::PortfolioConfig;
use crate::types::{Action, Strategy};
use serde::Serialize;

/// Per-strategy inputs derived from the allocation
#[derive(Debug, Clone)]
pub struct DecisionInput<'a> {
    pub strategy: &'a Strategy,
    pub target_notional: f64,
    pub average_correlation: f64,
    pub deployable_capital: f64,
    pub margin_buffer_multiple: f64,
}

/// Recommended action for one strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub strategy_code: String,
    pub action: Action,
    /// Signed currency adjustment (positive adds capital)
    pub recommended_delta: f64,
    pub target_notional: f64,
    pub current_notional: f64,
    pub gap: f64,
    pub impact_cost_bps: f64,
    pub increase_reasons: Vec<IncreaseReason>,
    pub decrease_reasons: Vec<DecreaseReason>,
    pub hold_reasons: Vec<HoldReason>,
}

impl Decision {
    /// Up to `limit` reasons from the list that explains the action
    pub fn primary_reasons(&self, limit: usize) -> Vec<String> {
        match self.action {
            Action::Increase => take_reasons(&self.increase_reasons, limit),
            Action::Decrease => take_reasons(&self.decrease_reasons, limit),
            Action::Hold => take_reasons(&self.hold_reasons, limit),
        }
    }
}

fn take_reasons<T: ToString>(reasons: &[T], limit: usize) -> Vec<String> {
    reasons.iter().take(limit).map(ToString::to_string).collect()
}

/// Stateless evaluator of `DecisionRules` against one allocation snapshot
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    rules: DecisionRules,
    volatility_target: f64,
    min_adjustment_unit: f64,
    max_daily_gap_fraction: f64,
    max_daily_deploy_fraction: f64,
}

impl DecisionEngine {
    pub fn new(config: &PortfolioConfig, rules: DecisionRules) -> Self {
        Self {
            rules,
            volatility_target: config.volatility_target,
            min_adjustment_unit: config.min_adjustment_unit,
            max_daily_gap_fraction: config.max_daily_gap_fraction,
            max_daily_deploy_fraction: config.max_daily_deploy_fraction,
        }
    }

    pub fn rules(&self) -> &DecisionRules {
        &self.rules
    }

    /// Evaluate the rule set for one strategy
    pub fn decide(&self, input: &DecisionInput<'_>) -> Decision {
        let s = input.strategy;
        let rules = &self.rules;
        let target = input.target_notional;
        let current = s.current_notional;
        let gap = target - current;
        let margin_ok = input.margin_buffer_multiple >= rules.min_margin_buffer_multiple;

        // 1. Increase signals
        let mut increase_reasons = Vec::new();
        if s.sharpe > rules.strong_sharpe {
            increase_reasons.push(IncreaseReason::StrongSharpe);
        }
        if s.realized_volatility < self.volatility_target * rules.low_volatility_ratio {
            increase_reasons.push(IncreaseReason::LowRealizedVolatility);
        }
        if input.average_correlation < rules.low_correlation {
            increase_reasons.push(IncreaseReason::LowCorrelation);
        }
        let impact_ok = s.impact_cost_bps <= rules.max_impact_bps;
        if impact_ok {
            increase_reasons.push(IncreaseReason::LowImpactCost);
        }

        // 2. Decrease triggers
        let mut decrease_reasons = Vec::new();
        if s.sharpe < rules.negative_sharpe {
            decrease_reasons.push(DecreaseReason::NegativeSharpe);
        }
        if s.realized_volatility > self.volatility_target * rules.high_volatility_ratio {
            decrease_reasons.push(DecreaseReason::HighRealizedVolatility);
        }
        if s.drawdown >= rules.drawdown_limit {
            decrease_reasons.push(DecreaseReason::DrawdownBreach);
        }
        if input.average_correlation > rules.correlation_cluster {
            decrease_reasons.push(DecreaseReason::CorrelationCluster);
        }
        if s.kind.requires_margin() && !margin_ok {
            decrease_reasons.push(DecreaseReason::MarginBufferShort);
        }

        // 3. Blockers
        let mut hold_reasons = Vec::new();
        let yellow_freeze = rules.in_yellow_zone(s.drawdown);
        if yellow_freeze {
            hold_reasons.push(HoldReason::YellowZoneFreeze);
        }
        if s.paused {
            hold_reasons.push(HoldReason::Paused);
        }

        let cap_from_gap = gap.abs() * self.max_daily_gap_fraction;
        let cap_from_deploy = input.deployable_capital * self.max_daily_deploy_fraction;
        let adjustment_cap = cap_from_gap.min(cap_from_deploy);
        if adjustment_cap < self.min_adjustment_unit {
            hold_reasons.push(HoldReason::AdjustmentCapBelowMinimum {
                minimum: self.min_adjustment_unit,
            });
        }

        // 4. Classification
        let mut action = if !decrease_reasons.is_empty() {
            Action::Decrease
        } else if increase_reasons.len() >= rules.min_increase_signals
            && !s.paused
            && !yellow_freeze
            && impact_ok
            && margin_ok
        {
            Action::Increase
        } else {
            Action::Hold
        };

        // 5. Step sizing
        let mut step = 0.0;
        match action {
            Action::Increase => {
                step = gap.max(0.0).min(adjustment_cap);
                if !margin_ok {
                    hold_reasons.push(HoldReason::MarginBufferShort);
                    step = 0.0;
                    action = Action::Hold;
                }
                if step < self.min_adjustment_unit {
                    hold_reasons.push(HoldReason::IncreaseBelowMinimum);
                    step = 0.0;
                    action = Action::Hold;
                }
            }
            Action::Decrease => {
                let reduce_base = (-gap).max(0.0).max(current * rules.min_trim_fraction);
                let cap = adjustment_cap.max(current * rules.max_trim_fraction);
                step = -reduce_base.min(cap);
                if step.abs() < self.min_adjustment_unit {
                    hold_reasons.push(HoldReason::DecreaseBelowMinimum);
                    step = 0.0;
                    action = Action::Hold;
                }
            }
            Action::Hold => {
                if increase_reasons.len() < rules.min_increase_signals {
                    hold_reasons.push(HoldReason::InsufficientIncreaseSignals {
                        met: increase_reasons.len(),
                    });
                }
                if decrease_reasons.is_empty() {
                    hold_reasons.push(HoldReason::NoDecreaseTrigger);
                }
            }
        }

        if !step.is_finite() {
            step = 0.0;
            action = Action::Hold;
        }

        Decision {
            strategy_code: s.code.clone(),
            action,
            recommended_delta: step,
            target_notional: target,
            current_notional: current,
            gap,
            impact_cost_bps: s.impact_cost_bps,
            increase_reasons,
            decrease_reasons,
            hold_reasons,
        }
    }
}
