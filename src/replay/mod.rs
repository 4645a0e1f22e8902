//! Synthetic volatility replay
//!
//! Reconstructs a plausible realized-volatility path for the last `days`
//! days around the portfolio volatility, plus the add/reduce marker the
//! decision rules would have leaned towards on each day. Every day draws
//! from its own ChaCha8 stream, so the path is reproducible from the seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Floor on the replayed realized volatility
pub const MIN_REPLAY_VOLATILITY: f64 = 0.01;

/// Signal magnitude needed to emit a marker
const MARKER_THRESHOLD: f64 = 0.3;

/// One replayed day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReplayPoint {
    /// 1 is the oldest day, `days` is today
    pub day: u32,
    pub target_volatility: f64,
    pub realized_volatility: f64,
    /// +1 add, -1 reduce, 0 none
    pub marker: i8,
}

pub fn generate(
    days: u32,
    base_volatility: f64,
    volatility_target: f64,
    seed: u64,
) -> Vec<ReplayPoint> {
    (1..=days)
        .map(|day| {
            let t = days - day + 1;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(u64::from(t));
            let u1: f64 = rng.random();
            let u2: f64 = rng.random();

            let noise = (u1 - 0.5) * 0.03;
            let seasonal = 0.02 * (f64::from(t) / 4.0).sin();
            let realized = (base_volatility * (1.0 + noise + seasonal)).max(MIN_REPLAY_VOLATILITY);

            let signal = (volatility_target - realized) * 10.0 + (u2 - 0.5);
            let marker = if signal > MARKER_THRESHOLD {
                1
            } else if signal < -MARKER_THRESHOLD {
                -1
            } else {
                0
            };

            ReplayPoint {
                day,
                target_volatility: volatility_target,
                realized_volatility: realized,
                marker,
            }
        })
        .collect()
}
