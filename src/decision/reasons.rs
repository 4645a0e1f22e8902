//! Explanations attached to each decision

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncreaseReason {
    StrongSharpe,
    LowRealizedVolatility,
    LowCorrelation,
    LowImpactCost,
}

impl fmt::Display for IncreaseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncreaseReason::StrongSharpe => write!(f, "trailing Sharpe above threshold"),
            IncreaseReason::LowRealizedVolatility => write!(f, "realized vol below target band"),
            IncreaseReason::LowCorrelation => write!(f, "low correlation with book"),
            IncreaseReason::LowImpactCost => write!(f, "impact cost within limit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecreaseReason {
    NegativeSharpe,
    HighRealizedVolatility,
    DrawdownBreach,
    CorrelationCluster,
    MarginBufferShort,
}

impl fmt::Display for DecreaseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecreaseReason::NegativeSharpe => write!(f, "trailing Sharpe negative"),
            DecreaseReason::HighRealizedVolatility => write!(f, "realized vol above target band"),
            DecreaseReason::DrawdownBreach => write!(f, "drawdown limit breached"),
            DecreaseReason::CorrelationCluster => write!(f, "correlation clustering"),
            DecreaseReason::MarginBufferShort => write!(f, "margin buffer insufficient"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldReason {
    YellowZoneFreeze,
    Paused,
    AdjustmentCapBelowMinimum { minimum: f64 },
    MarginBufferShort,
    IncreaseBelowMinimum,
    DecreaseBelowMinimum,
    InsufficientIncreaseSignals { met: usize },
    NoDecreaseTrigger,
}

impl fmt::Display for HoldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoldReason::YellowZoneFreeze => write!(f, "yellow zone: drawdown freezes increases"),
            HoldReason::Paused => write!(f, "strategy paused"),
            HoldReason::AdjustmentCapBelowMinimum { minimum } => {
                write!(f, "step cap below minimum adjustment unit {minimum:.0}")
            }
            HoldReason::MarginBufferShort => write!(f, "margin buffer below required multiple"),
            HoldReason::IncreaseBelowMinimum => write!(f, "increase below minimum adjustment unit"),
            HoldReason::DecreaseBelowMinimum => {
                write!(f, "decrease triggered but below minimum adjustment unit")
            }
            HoldReason::InsufficientIncreaseSignals { met } => {
                write!(f, "insufficient increase signals (only {met} met)")
            }
            HoldReason::NoDecreaseTrigger => write!(f, "no decrease trigger"),
        }
    }
}
