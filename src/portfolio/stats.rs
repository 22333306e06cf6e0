//! # Return Statistics
//!
//! $$
//! \mu = k\,\bar{R},\qquad \Sigma = \frac{k}{T-1}\sum_{t}(R_t-\bar R)(R_t-\bar R)^\top
//! $$
//!
//! Annualized mean vector, sample covariance and risk-free rate, with `k` the
//! number of periods per year.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use ndarray_stats::CorrelationExt;
use tracing::debug;

use super::data::ReturnSeries;
use super::data::RiskFreeSeries;
use crate::error::PortfolioError;
use crate::error::Result;

/// Periods per year for monthly observations.
pub const MONTHLY: f64 = 12.0;

/// Annualized statistics derived once from a return history.
#[derive(Clone, Debug)]
pub struct Statistics {
  /// Annualized mean return per asset.
  pub mean_returns: Array1<f64>,
  /// Annualized sample covariance (`ddof = 1`).
  pub covariance: Array2<f64>,
  /// Annualized mean risk-free rate.
  pub risk_free: f64,
  /// Annualization factor used for all of the above.
  pub periods_per_year: f64,
}

impl Statistics {
  pub fn from_series(
    returns: &ReturnSeries,
    risk_free: &RiskFreeSeries,
    periods_per_year: f64,
  ) -> Result<Self> {
    let view = returns.view();
    let mean = view
      .mean_axis(Axis(0))
      .ok_or_else(|| PortfolioError::InvalidInput("return series has no periods".into()))?;
    // `cov` treats rows as variables and columns as observations.
    let cov = view
      .t()
      .cov(1.0)
      .map_err(|e| PortfolioError::InvalidInput(format!("cannot compute covariance: {e}")))?;

    let stats = Self {
      mean_returns: mean * periods_per_year,
      covariance: cov * periods_per_year,
      risk_free: risk_free.mean() * periods_per_year,
      periods_per_year,
    };

    debug!(
      assets = stats.n_assets(),
      periods = returns.n_periods(),
      periods_per_year,
      risk_free = stats.risk_free,
      "derived annualized return statistics"
    );

    Ok(stats)
  }

  pub fn n_assets(&self) -> usize {
    self.mean_returns.len()
  }

  /// Annualized per-asset volatilities.
  pub fn volatilities(&self) -> Array1<f64> {
    self.covariance.diag().mapv(|v| v.max(0.0).sqrt())
  }
}
