//! Capital Allocation
//!
//! Weight pipeline and its currency translation:
//! - Inverse-volatility baseline blended with Kelly-optimal weights
//! - Per-strategy volatility targeting and pause masking
//! - Notionals, futures margin, and cash-buffer coverage

mod blender;
mod translator;

#[cfg(test)]
mod tests;

pub use blender::{BlendedWeights, WeightBlender};
pub use translator::{Allocation, MARGIN_COVERAGE_MULTIPLE};
