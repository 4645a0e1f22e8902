//! Fund Allocation & Rebalancing Engine
//!
//! Sizes capital across a book of trading strategies and recommends daily
//! rebalancing steps.
//!
//! - Inverse-volatility weights blended with Kelly-optimal weights
//! - Volatility targeting, pause masking, futures margin coverage
//! - Rule-based increase / decrease / hold decisions with explanations
//! - Risk contribution, order application, decision export and replay

pub mod allocation;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod executor;
pub mod export;
pub mod linalg;
pub mod replay;
pub mod risk;
pub mod types;
