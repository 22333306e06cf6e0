//! # Portfolio Metrics
//!
//! $$
//! \mu_p=\mu^\top\mathbf w,\qquad \sigma_p=\sqrt{\max(0,\mathbf w^\top\Sigma\mathbf w)},\qquad
//! S=\frac{\mu_p-r_f}{\sigma_p}
//! $$
//!
//! Pure functions over [`Statistics`]. The metric functions expect a weight
//! vector that already passed [`validate_weights`].

use ndarray::ArrayView1;

use super::stats::Statistics;
use super::types::Bounds;
use crate::error::PortfolioError;
use crate::error::Result;

/// Default tolerance for the fully-invested check.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Volatilities at or below this are treated as zero.
pub const VOLATILITY_FLOOR: f64 = 1e-15;

/// Check length, finiteness, bounds and the sum-to-one constraint.
pub fn validate_weights(
  weights: &[f64],
  n_assets: usize,
  bounds: Bounds,
  tolerance: f64,
) -> Result<()> {
  if weights.is_empty() {
    return Err(PortfolioError::InvalidWeights(
      "weights must not be empty".into(),
    ));
  }
  if let Some((i, w)) = weights.iter().enumerate().find(|(_, w)| !w.is_finite()) {
    return Err(PortfolioError::InvalidWeights(format!(
      "weight {i} is not a finite number ({w})"
    )));
  }
  if weights.len() != n_assets {
    return Err(PortfolioError::InvalidWeights(format!(
      "expected {n_assets} weights, got {}",
      weights.len()
    )));
  }
  if let Some((i, w)) = weights
    .iter()
    .enumerate()
    .find(|&(_, &w)| w < bounds.lower - tolerance || w > bounds.upper + tolerance)
  {
    return Err(PortfolioError::InvalidWeights(format!(
      "weight {i} = {w} is outside [{}, {}]",
      bounds.lower, bounds.upper
    )));
  }

  let sum: f64 = weights.iter().sum();
  if (sum - 1.0).abs() >= tolerance {
    return Err(PortfolioError::InvalidWeights(format!(
      "weights must sum to 1, got {sum}"
    )));
  }

  Ok(())
}

/// Annualized expected portfolio return.
pub fn portfolio_return(stats: &Statistics, weights: &[f64]) -> f64 {
  debug_assert_eq!(weights.len(), stats.n_assets());
  stats.mean_returns.dot(&ArrayView1::from(weights))
}

/// Annualized portfolio volatility. Round-off below zero is clamped.
pub fn portfolio_volatility(stats: &Statistics, weights: &[f64]) -> f64 {
  debug_assert_eq!(weights.len(), stats.n_assets());
  let w = ArrayView1::from(weights);
  let variance = w.dot(&stats.covariance.dot(&w));
  variance.max(0.0).sqrt()
}

/// Sharpe ratio against the annualized mean risk-free rate.
pub fn sharpe_ratio(stats: &Statistics, weights: &[f64]) -> Result<f64> {
  let volatility = portfolio_volatility(stats, weights);
  if volatility <= VOLATILITY_FLOOR {
    return Err(PortfolioError::DegenerateVolatility { volatility });
  }

  Ok((portfolio_return(stats, weights) - stats.risk_free) / volatility)
}

/// Objective minimized by the optimizer.
pub fn negative_sharpe(stats: &Statistics, weights: &[f64]) -> Result<f64> {
  sharpe_ratio(stats, weights).map(|s| -s)
}
