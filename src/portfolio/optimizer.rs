//! # Sharpe Optimizer
//!
//! $$
//! \mathbf{w}^\* = \arg\min_{\mathbf w}\ -\frac{\mu^\top\mathbf w-r_f}{\sqrt{\mathbf w^\top\Sigma\mathbf w}}
//! \quad\text{s.t.}\quad \mathbf 1^\top\mathbf w=1,\ \ell\le w_i\le u
//! $$
//!
//! Owns the return history and risk-free series, derives statistics on first
//! use and drives a [`ConstrainedMinimizer`] over the negative Sharpe ratio.

use std::sync::OnceLock;

use tracing::info;
use tracing::warn;

use super::data::ReturnSeries;
use super::data::RiskFreeSeries;
use super::metrics;
use super::metrics::VOLATILITY_FLOOR;
use super::metrics::WEIGHT_TOLERANCE;
use super::solver::AugmentedLagrangian;
use super::solver::ConstrainedMinimizer;
use super::solver::ConstrainedProblem;
use super::solver::Constraint;
use super::stats::Statistics;
use super::stats::MONTHLY;
use super::types::Bounds;
use super::types::OptimizationResult;
use crate::error::PortfolioError;
use crate::error::Result;

/// Runtime configuration for [`SharpeOptimizer`].
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
  /// Annualization factor for means, covariances and the risk-free rate.
  pub periods_per_year: f64,
  /// Bounds applied to every weight.
  pub bounds: Bounds,
  /// Tolerance of the fully-invested and bound checks.
  pub weight_tolerance: f64,
  /// Iteration cap of the default solver.
  pub max_iters: usize,
  /// Convergence tolerance of the default solver.
  pub tolerance: f64,
  /// Objective value used during the search where volatility vanishes.
  pub degenerate_penalty: f64,
}

impl Default for OptimizerConfig {
  fn default() -> Self {
    Self {
      periods_per_year: MONTHLY,
      bounds: Bounds::LONG_ONLY,
      weight_tolerance: WEIGHT_TOLERANCE,
      max_iters: 10_000,
      tolerance: 1e-8,
      degenerate_penalty: 1e10,
    }
  }
}

impl OptimizerConfig {
  fn validate(&self, n_assets: usize) -> Result<()> {
    if !(self.periods_per_year > 0.0) || !self.periods_per_year.is_finite() {
      return Err(PortfolioError::InvalidInput(format!(
        "periods per year must be positive, got {}",
        self.periods_per_year
      )));
    }
    if !(self.weight_tolerance > 0.0) {
      return Err(PortfolioError::InvalidInput(format!(
        "weight tolerance must be positive, got {}",
        self.weight_tolerance
      )));
    }
    if !self.bounds.admits_full_investment(n_assets) {
      return Err(PortfolioError::InvalidInput(format!(
        "bounds [{}, {}] cannot hold a fully invested portfolio of {n_assets} assets",
        self.bounds.lower, self.bounds.upper
      )));
    }
    Ok(())
  }

  /// Default solver built from the iteration cap and tolerance.
  pub fn solver(&self) -> AugmentedLagrangian {
    AugmentedLagrangian::new(self.max_iters, self.tolerance)
  }
}

/// Maximum-Sharpe optimizer over a fixed return history.
#[derive(Debug)]
pub struct SharpeOptimizer {
  returns: ReturnSeries,
  risk_free: RiskFreeSeries,
  config: OptimizerConfig,
  stats: OnceLock<Statistics>,
}

impl SharpeOptimizer {
  /// Construct from a return table and a risk-free series of the same length.
  pub fn new(
    returns: ReturnSeries,
    risk_free: RiskFreeSeries,
    config: OptimizerConfig,
  ) -> Result<Self> {
    if returns.n_periods() != risk_free.len() {
      return Err(PortfolioError::InvalidInput(format!(
        "return series has {} periods but risk-free series has {}",
        returns.n_periods(),
        risk_free.len()
      )));
    }
    config.validate(returns.n_assets())?;

    info!(
      assets = returns.n_assets(),
      periods = returns.n_periods(),
      lower = config.bounds.lower,
      upper = config.bounds.upper,
      "constructed Sharpe optimizer"
    );

    Ok(Self {
      returns,
      risk_free,
      config,
      stats: OnceLock::new(),
    })
  }

  /// Construct with [`OptimizerConfig::default`].
  pub fn with_defaults(returns: ReturnSeries, risk_free: RiskFreeSeries) -> Result<Self> {
    Self::new(returns, risk_free, OptimizerConfig::default())
  }

  pub fn config(&self) -> &OptimizerConfig {
    &self.config
  }

  pub fn returns(&self) -> &ReturnSeries {
    &self.returns
  }

  pub fn n_assets(&self) -> usize {
    self.returns.n_assets()
  }

  /// Annualized statistics, computed on first call.
  pub fn statistics(&self) -> Result<&Statistics> {
    if let Some(stats) = self.stats.get() {
      return Ok(stats);
    }
    let stats = Statistics::from_series(
      &self.returns,
      &self.risk_free,
      self.config.periods_per_year,
    )?;
    Ok(self.stats.get_or_init(|| stats))
  }

  /// Gate for every weight-dependent computation.
  pub fn validate_weights(&self, weights: &[f64]) -> Result<()> {
    metrics::validate_weights(
      weights,
      self.n_assets(),
      self.config.bounds,
      self.config.weight_tolerance,
    )
  }

  /// Annualized expected return of the portfolio.
  pub fn portfolio_return(&self, weights: &[f64]) -> Result<f64> {
    self.validate_weights(weights)?;
    Ok(metrics::portfolio_return(self.statistics()?, weights))
  }

  /// Annualized volatility of the portfolio.
  pub fn portfolio_volatility(&self, weights: &[f64]) -> Result<f64> {
    self.validate_weights(weights)?;
    Ok(metrics::portfolio_volatility(self.statistics()?, weights))
  }

  pub fn sharpe_ratio(&self, weights: &[f64]) -> Result<f64> {
    self.validate_weights(weights)?;
    metrics::sharpe_ratio(self.statistics()?, weights)
  }

  /// Objective minimized by [`Self::find_optimal_portfolio`].
  pub fn negative_sharpe(&self, weights: &[f64]) -> Result<f64> {
    self.validate_weights(weights)?;
    metrics::negative_sharpe(self.statistics()?, weights)
  }

  /// Maximize the Sharpe ratio with the default solver. Without an initial
  /// guess the search starts from equal weights.
  pub fn find_optimal_portfolio(&self, initial_guess: Option<&[f64]>) -> Result<OptimizationResult> {
    let solver = self.config.solver();
    self.find_optimal_portfolio_with(&solver, initial_guess)
  }

  /// Maximize the Sharpe ratio with a caller-supplied solver.
  pub fn find_optimal_portfolio_with(
    &self,
    solver: &dyn ConstrainedMinimizer,
    initial_guess: Option<&[f64]>,
  ) -> Result<OptimizationResult> {
    let n = self.n_assets();
    let x0 = match initial_guess {
      Some(guess) => {
        if guess.len() != n {
          return Err(PortfolioError::InvalidWeights(format!(
            "initial guess has {} entries for {n} assets",
            guess.len()
          )));
        }
        if guess.iter().any(|w| !w.is_finite()) {
          return Err(PortfolioError::InvalidWeights(
            "initial guess is not finite".into(),
          ));
        }
        guess.to_vec()
      }
      None => vec![1.0 / n as f64; n],
    };

    let stats = self.statistics()?;
    let penalty = self.config.degenerate_penalty;
    let objective = move |w: &[f64]| {
      let volatility = metrics::portfolio_volatility(stats, w);
      if volatility <= VOLATILITY_FLOOR {
        penalty
      } else {
        -(metrics::portfolio_return(stats, w) - stats.risk_free) / volatility
      }
    };
    let problem = ConstrainedProblem::new(objective, x0, self.config.bounds.per_asset(n))
      .with_constraint(Constraint::equality(|w: &[f64]| w.iter().sum::<f64>() - 1.0));

    let outcome = solver.minimize(&problem);
    if !outcome.success {
      warn!(
        solver = solver.name(),
        iterations = outcome.iterations,
        reason = %outcome.message,
        "optimization failed"
      );
      return Err(PortfolioError::OptimizationFailed {
        message: outcome.message,
        iterations: outcome.iterations,
      });
    }

    let weights = outcome.params;
    self.validate_weights(&weights).map_err(|e| PortfolioError::OptimizationFailed {
      message: format!("{} reported success with an infeasible point: {e}", solver.name()),
      iterations: outcome.iterations,
    })?;
    let sharpe = metrics::sharpe_ratio(stats, &weights)?;

    let result = OptimizationResult {
      expected_return: metrics::portfolio_return(stats, &weights),
      volatility: metrics::portfolio_volatility(stats, &weights),
      sharpe,
      objective: -sharpe,
      iterations: outcome.iterations,
      success: true,
      message: outcome.message,
      weights,
    };

    info!(
      solver = solver.name(),
      iterations = result.iterations,
      sharpe = result.sharpe,
      expected_return = result.expected_return,
      volatility = result.volatility,
      "optimal portfolio found"
    );

    Ok(result)
  }
}
