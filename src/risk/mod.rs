//! Portfolio Risk Model
//!
//! - Covariance from realized volatilities and a correlation model
//! - Risk contribution shares and portfolio volatility

mod attribution;
mod covariance;

#[cfg(test)]
mod tests;

pub use attribution::RiskAttribution;
pub use covariance::{covariance_matrix, CorrelationModel};
