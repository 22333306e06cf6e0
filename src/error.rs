//! # Errors
//!
//! $$
//! \text{fail fast: validate}(\text{inputs}) \prec \text{numerics}
//! $$
//!
//! Error taxonomy shared by construction, weight validation, metric evaluation
//! and optimization.

use thiserror::Error;

/// Error type for portfolio construction, metrics and optimization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortfolioError {
  /// Malformed or mismatched construction inputs or configuration.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// Weight vector with the wrong length, non-finite entries, out-of-bounds
  /// entries, or a sum away from one.
  #[error("invalid weights: {0}")]
  InvalidWeights(String),

  /// Portfolio volatility is zero, so the Sharpe ratio is undefined.
  #[error("degenerate portfolio volatility ({volatility:e}): Sharpe ratio is undefined")]
  DegenerateVolatility { volatility: f64 },

  /// The constrained minimizer did not converge.
  #[error("optimization failed after {iterations} iterations: {message}")]
  OptimizationFailed { message: String, iterations: usize },
}

/// Result type for portfolio operations.
pub type Result<T> = std::result::Result<T, PortfolioError>;
