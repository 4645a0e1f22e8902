//! Tests for weight blending and allocation translation

use super::*;
use crate::config::PortfolioConfig;
use crate::risk::{covariance_matrix, CorrelationModel};
use crate::types::{Strategy, StrategyKind};
use approx::assert_relative_eq;
use proptest::prelude::{prop_assert, prop_assume, proptest};

fn sample_book() -> Vec<Strategy> {
    vec![
        Strategy::new("S1-Stock-A", StrategyKind::Equity, 0.10)
            .with_sharpe(0.8)
            .with_drawdown(0.04)
            .with_current_notional(1_000_000.0)
            .with_impact_cost_bps(10.0),
        Strategy::new("S2-Futures-B", StrategyKind::Futures, 0.15)
            .with_sharpe(1.1)
            .with_drawdown(0.06)
            .with_current_notional(5_000_000.0)
            .with_impact_cost_bps(12.0),
    ]
}

fn covariance_for(strategies: &[Strategy], rho: f64) -> nalgebra::DMatrix<f64> {
    let vols: Vec<f64> = strategies.iter().map(|s| s.realized_volatility).collect();
    covariance_matrix(&vols, &CorrelationModel::Uniform(rho))
}

#[test]
fn test_inverse_volatility_weights() {
    let w = WeightBlender::inverse_volatility_weights(&[0.10, 0.15]);
    assert_relative_eq!(w[0], 0.6, epsilon = 1e-12);
    assert_relative_eq!(w[1], 0.4, epsilon = 1e-12);
}

#[test]
fn test_inverse_volatility_skips_zero_vol() {
    let w = WeightBlender::inverse_volatility_weights(&[0.0, 0.20]);
    assert_eq!(w, vec![0.0, 1.0]);
}

#[test]
fn test_kelly_weights_sample_book() {
    let book = sample_book();
    let cov = covariance_for(&book, 0.2);
    let (kelly, degenerate) = WeightBlender::kelly_weights(&cov, &[0.08, 0.165]).unwrap();

    assert!(!degenerate);
    assert_relative_eq!(kelly[0], 0.480663, epsilon = 1e-6);
    assert_relative_eq!(kelly[1], 0.519337, epsilon = 1e-6);
}

#[test]
fn test_kelly_weights_singular_covariance() {
    // Equal vols with perfect correlation
    let cov = covariance_matrix(&[0.1, 0.1], &CorrelationModel::Uniform(1.0));
    let (kelly, degenerate) = WeightBlender::kelly_weights(&cov, &[0.05, 0.08]).unwrap();

    assert!(degenerate);
    assert_eq!(kelly, vec![0.5, 0.5]);
}

#[test]
fn test_kelly_weights_three_strategies() {
    let cov = covariance_matrix(&[0.1, 0.2, 0.3], &CorrelationModel::Uniform(0.0));
    let (kelly, degenerate) = WeightBlender::kelly_weights(&cov, &[0.1, 0.2, 0.3]).unwrap();

    // Diagonal covariance: raw_i = μ_i / σ_i² = 10, 5, 3.33
    assert!(!degenerate);
    let total = 10.0 + 5.0 + 10.0 / 3.0;
    assert_relative_eq!(kelly[0], 10.0 / total, epsilon = 1e-9);
    assert_relative_eq!(kelly[2], (10.0 / 3.0) / total, epsilon = 1e-9);
}

#[test]
fn test_full_pipeline_sample_book() {
    let book = sample_book();
    let cov = covariance_for(&book, 0.2);
    let blender = WeightBlender::from_config(&PortfolioConfig::default());
    let result = blender.compute(&book, &cov).unwrap();

    assert_relative_eq!(result.expected_returns[0], 0.08, epsilon = 1e-12);
    assert_relative_eq!(result.expected_returns[1], 0.165, epsilon = 1e-12);
    assert_relative_eq!(result.blended[0], 0.564199, epsilon = 1e-6);
    assert_relative_eq!(result.blended[1], 0.435801, epsilon = 1e-6);
    assert_relative_eq!(result.weights[0], 0.660088, epsilon = 1e-6);
    assert_relative_eq!(result.weights[1], 0.339912, epsilon = 1e-6);
    assert_eq!(result.weights, result.vol_scaled);
}

#[test]
fn test_blend_endpoints() {
    let base = vec![0.6, 0.4];
    let kelly = vec![0.2, 0.8];

    assert_eq!(WeightBlender::new(0.0, 0.1).blend(&base, &kelly), base);
    let full = WeightBlender::new(1.0, 0.1).blend(&base, &kelly);
    assert_relative_eq!(full[0], 0.2, epsilon = 1e-12);
    assert_relative_eq!(full[1], 0.8, epsilon = 1e-12);
}

#[test]
fn test_volatility_targeting_caps_high_vol() {
    let blender = WeightBlender::new(0.3, 0.10);
    let w = blender.target_volatility(&[0.5, 0.5], &[0.05, 0.20]);

    // Scale factors 1.0 and 0.5
    assert_relative_eq!(w[0], 2.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(w[1], 1.0 / 3.0, epsilon = 1e-12);
}

#[test]
fn test_pause_mask_redistributes() {
    let mut book = sample_book();
    book[1].paused = true;
    let w = WeightBlender::apply_pause_mask(&[0.66, 0.34], &book);
    assert_eq!(w, vec![1.0, 0.0]);
}

#[test]
fn test_all_paused_falls_back_to_uniform() {
    let book: Vec<Strategy> = sample_book().into_iter().map(Strategy::paused).collect();
    let cov = covariance_for(&book, 0.2);
    let result = WeightBlender::new(0.3, 0.1).compute(&book, &cov).unwrap();

    assert_eq!(result.weights, vec![0.5, 0.5]);
}

#[test]
fn test_translate_sample_book() {
    let config = PortfolioConfig::default();
    let allocation = Allocation::translate(&[0.660088, 0.339912], &sample_book(), &config);

    assert_eq!(allocation.deployable_capital, 22_500_000.0);
    assert_eq!(allocation.cash_buffer, 7_500_000.0);
    assert_relative_eq!(allocation.notionals[0], 14_851_980.0, epsilon = 1e-3);
    assert_relative_eq!(allocation.futures_notional, 7_648_020.0, epsilon = 1e-3);
    assert_relative_eq!(allocation.margin_required, 764_802.0, epsilon = 1e-3);
    assert_relative_eq!(
        allocation.margin_buffer_multiple,
        7_500_000.0 / (3.0 * 764_802.0),
        epsilon = 1e-9
    );
    assert!(allocation.margin_ok(1.0));
}

#[test]
fn test_translate_custom_capital() {
    let mut config = PortfolioConfig::default();
    config.set_total_capital(30_000_000.0).unwrap();
    config.set_cash_buffer_fraction(0.25).unwrap();
    let allocation = Allocation::translate(&[1.0], &sample_book()[..1], &config);

    assert_eq!(allocation.deployable_capital, 22_500_000.0);
    assert_eq!(allocation.cash_buffer, 7_500_000.0);
}

#[test]
fn test_no_futures_means_infinite_margin_multiple() {
    let book = vec![
        Strategy::new("E1", StrategyKind::Equity, 0.1),
        Strategy::new("E2", StrategyKind::Equity, 0.2),
    ];
    let allocation = Allocation::translate(&[0.5, 0.5], &book, &PortfolioConfig::default());

    assert_eq!(allocation.margin_required, 0.0);
    assert_eq!(allocation.margin_buffer_multiple, f64::INFINITY);
    assert!(allocation.margin_ok(1.0));
}

#[test]
fn test_zero_futures_weight_means_infinite_margin_multiple() {
    let book = sample_book();
    let allocation = Allocation::translate(&[1.0, 0.0], &book, &PortfolioConfig::default());

    assert_eq!(allocation.margin_required, 0.0);
    assert!(allocation.margin_buffer_multiple.is_infinite());
}

#[test]
fn test_margin_sums_multiple_futures() {
    let book = vec![
        Strategy::new("F1", StrategyKind::Futures, 0.1),
        Strategy::new("F2", StrategyKind::Futures, 0.2),
        Strategy::new("E1", StrategyKind::Equity, 0.1),
    ];
    let allocation =
        Allocation::translate(&[0.4, 0.4, 0.2], &book, &PortfolioConfig::default());

    assert_relative_eq!(allocation.futures_notional, 18_000_000.0, epsilon = 1e-6);
    assert_relative_eq!(allocation.margin_required, 1_800_000.0, epsilon = 1e-6);
    assert!(allocation.margin_ok(1.0));
    assert!(!allocation.margin_ok(2.0));
}

#[test]
fn test_margin_buffer_short() {
    let mut config = PortfolioConfig::default();
    config.set_cash_buffer_fraction(0.05).unwrap();
    config.set_futures_margin_rate(0.5).unwrap();
    let book = vec![Strategy::new("F1", StrategyKind::Futures, 0.1)];
    let allocation = Allocation::translate(&[1.0], &book, &config);

    // 1.5M / (3 * 14.25M)
    assert!(allocation.margin_buffer_multiple < 1.0);
    assert!(!allocation.margin_ok(1.0));
}

proptest! {
    #[test]
    fn prop_final_weights_sum_to_one(
        vols in proptest::collection::vec(0.02f64..0.40, 1..6),
        sharpes in proptest::collection::vec(-1.0f64..2.5, 6),
        paused in proptest::collection::vec(proptest::bool::ANY, 6),
        rho in 0.0f64..0.9,
        alpha in 0.0f64..0.99,
        target in 0.02f64..0.30,
    ) {
        let book: Vec<Strategy> = vols
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut s = Strategy::new(format!("S{i}"), StrategyKind::Equity, v)
                    .with_sharpe(sharpes[i]);
                s.paused = paused[i];
                s
            })
            .collect();
        prop_assume!(book.iter().any(|s| !s.paused));

        let cov = covariance_for(&book, rho);
        let result = WeightBlender::new(alpha, target).compute(&book, &cov).unwrap();

        prop_assert!(result.weights.iter().all(|w| *w >= 0.0));
        prop_assert!((result.weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        for (w, s) in result.weights.iter().zip(&book) {
            if s.paused {
                prop_assert!(*w == 0.0);
            }
        }
    }

    #[test]
    fn prop_blend_interpolates_linearly(
        vols in proptest::collection::vec(0.02f64..0.40, 2..5),
        sharpes in proptest::collection::vec(-1.0f64..2.5, 5),
        rho in 0.0f64..0.9,
        alpha in 0.0f64..=1.0,
    ) {
        let book: Vec<Strategy> = vols
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                Strategy::new(format!("S{i}"), StrategyKind::Equity, v).with_sharpe(sharpes[i])
            })
            .collect();
        let cov = covariance_for(&book, rho);
        let result = WeightBlender::new(alpha, 0.10).compute(&book, &cov).unwrap();

        for ((blended, base), kelly) in result.blended.iter().zip(&result.base).zip(&result.kelly) {
            let expected = (1.0 - alpha) * base + alpha * kelly;
            prop_assert!((blended - expected).abs() < 1e-9);
        }
    }
}
