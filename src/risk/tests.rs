//! Tests for the risk model

use super::*;
use crate::config::PortfolioConfig;
use crate::error::AllocatorError;
use approx::assert_relative_eq;
use nalgebra::DMatrix;

#[test]
fn test_uniform_covariance_two_strategies() {
    let cov = covariance_matrix(&[0.10, 0.15], &CorrelationModel::Uniform(0.2));

    assert_relative_eq!(cov[(0, 0)], 0.01, epsilon = 1e-12);
    assert_relative_eq!(cov[(0, 1)], 0.003, epsilon = 1e-12);
    assert_relative_eq!(cov[(1, 0)], 0.003, epsilon = 1e-12);
    assert_relative_eq!(cov[(1, 1)], 0.0225, epsilon = 1e-12);
}

#[test]
fn test_matrix_covariance_uses_pairwise_entries() {
    let model = CorrelationModel::from_rows(
        &[
            vec![1.0, 0.5, -0.2],
            vec![0.5, 1.0, 0.1],
            vec![-0.2, 0.1, 1.0],
        ],
        3,
    )
    .unwrap();
    let cov = covariance_matrix(&[0.1, 0.2, 0.3], &model);

    assert_relative_eq!(cov[(0, 1)], 0.01, epsilon = 1e-12);
    assert_relative_eq!(cov[(0, 2)], -0.006, epsilon = 1e-12);
    assert_relative_eq!(cov[(2, 2)], 0.09, epsilon = 1e-12);
    assert_eq!(cov, cov.transpose());
}

#[test]
fn test_zero_volatility_row_is_zero() {
    let cov = covariance_matrix(&[0.0, 0.15], &CorrelationModel::Uniform(0.2));
    assert_eq!(cov[(0, 0)], 0.0);
    assert_eq!(cov[(0, 1)], 0.0);
}

#[test]
fn test_from_config_prefers_matrix() {
    let mut config = PortfolioConfig::default();
    assert_eq!(
        CorrelationModel::from_config(&config, 2).unwrap(),
        CorrelationModel::Uniform(0.2)
    );

    config.correlation_matrix = Some(vec![vec![1.0, 0.7], vec![0.7, 1.0]]);
    let model = CorrelationModel::from_config(&config, 2).unwrap();
    assert_eq!(model.correlation(0, 1), 0.7);
}

#[test]
fn test_matrix_dimension_mismatch() {
    let err = CorrelationModel::from_rows(&[vec![1.0, 0.2], vec![0.2, 1.0]], 3).unwrap_err();
    assert!(matches!(
        err,
        AllocatorError::DimensionMismatch {
            expected: 3,
            actual: 2
        }
    ));

    let err = CorrelationModel::from_rows(&[vec![1.0, 0.2], vec![0.2]], 2).unwrap_err();
    assert!(matches!(err, AllocatorError::DimensionMismatch { .. }));
}

#[test]
fn test_matrix_rejects_bad_entries() {
    assert!(CorrelationModel::from_rows(&[vec![0.9, 0.2], vec![0.2, 1.0]], 2).is_err());
    assert!(CorrelationModel::from_rows(&[vec![1.0, 1.2], vec![1.2, 1.0]], 2).is_err());
    assert!(CorrelationModel::from_rows(&[vec![1.0, 0.2], vec![0.3, 1.0]], 2).is_err());
}

#[test]
fn test_average_correlations() {
    assert_eq!(CorrelationModel::Uniform(0.2).average_correlations(2), vec![0.2, 0.2]);
    assert_eq!(CorrelationModel::Uniform(0.2).average_correlations(1), vec![0.0]);

    let model = CorrelationModel::Matrix(DMatrix::from_row_slice(
        3,
        3,
        &[1.0, 0.4, 0.8, 0.4, 1.0, 0.0, 0.8, 0.0, 1.0],
    ));
    let avg = model.average_correlations(3);
    assert_relative_eq!(avg[0], 0.6, epsilon = 1e-12);
    assert_relative_eq!(avg[1], 0.2, epsilon = 1e-12);
    assert_relative_eq!(avg[2], 0.4, epsilon = 1e-12);
}

#[test]
fn test_risk_attribution_equal_weights() {
    let cov = covariance_matrix(&[0.10, 0.15], &CorrelationModel::Uniform(0.2));
    let attribution = RiskAttribution::compute(&cov, &[0.5, 0.5]).unwrap();

    assert_relative_eq!(attribution.contributions[0], 0.00325, epsilon = 1e-12);
    assert_relative_eq!(attribution.contributions[1], 0.006375, epsilon = 1e-12);
    assert_relative_eq!(attribution.portfolio_variance, 0.009625, epsilon = 1e-12);
    assert_relative_eq!(
        attribution.portfolio_volatility,
        0.009625f64.sqrt(),
        epsilon = 1e-12
    );
    assert_relative_eq!(attribution.shares.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(attribution.shares[0], 0.00325 / 0.009625, epsilon = 1e-12);
}

#[test]
fn test_risk_attribution_zero_variance_fallback() {
    let cov = DMatrix::zeros(2, 2);
    let attribution = RiskAttribution::compute(&cov, &[0.5, 0.5]).unwrap();

    assert_eq!(attribution.shares, vec![0.0, 0.0]);
    assert_eq!(attribution.portfolio_volatility, 0.0);
}

#[test]
fn test_risk_attribution_negative_variance_clamped() {
    // Not PSD: mimics floating-point noise on a near-singular covariance
    let cov = DMatrix::from_row_slice(2, 2, &[1e-18, -1.0, -1.0, 1e-18]);
    let attribution = RiskAttribution::compute(&cov, &[0.5, 0.5]).unwrap();

    assert!(attribution.portfolio_variance < 0.0);
    assert_eq!(attribution.portfolio_volatility, 0.0);
    assert!(attribution.shares.iter().all(|s| s.is_finite()));
}

#[test]
fn test_risk_attribution_dimension_mismatch() {
    let cov = DMatrix::zeros(2, 2);
    assert!(RiskAttribution::compute(&cov, &[1.0]).is_err());
}
