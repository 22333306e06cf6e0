//! # Portfolio Types
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}} \frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! $$
//!
//! Shared bounds and result containers for portfolio optimization.

/// Per-weight box constraint applied to every asset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
  /// Smallest admissible weight.
  pub lower: f64,
  /// Largest admissible weight.
  pub upper: f64,
}

impl Bounds {
  /// Long-only, no leverage.
  pub const LONG_ONLY: Self = Self {
    lower: 0.0,
    upper: 1.0,
  };

  pub fn new(lower: f64, upper: f64) -> Self {
    Self { lower, upper }
  }

  /// Whether `n` weights inside these bounds can sum to one.
  pub fn admits_full_investment(&self, n: usize) -> bool {
    let n = n as f64;
    self.lower <= self.upper && n * self.lower <= 1.0 && n * self.upper >= 1.0
  }

  /// Repeat the bound for each of `n` variables in solver form.
  pub fn per_asset(&self, n: usize) -> Vec<(f64, f64)> {
    vec![(self.lower, self.upper); n]
  }
}

impl Default for Bounds {
  fn default() -> Self {
    Self::LONG_ONLY
  }
}

/// Output of a maximum-Sharpe optimization run.
#[derive(Clone, Debug, Default)]
pub struct OptimizationResult {
  /// Optimal weights, in the column order of the return series.
  pub weights: Vec<f64>,
  /// Annualized expected portfolio return.
  pub expected_return: f64,
  /// Annualized portfolio volatility.
  pub volatility: f64,
  /// Sharpe ratio computed as `(expected_return - risk_free) / volatility`.
  pub sharpe: f64,
  /// Achieved objective value, i.e. the negative Sharpe ratio.
  pub objective: f64,
  /// Iterations reported by the solver.
  pub iterations: usize,
  /// Solver convergence flag.
  pub success: bool,
  /// Solver diagnostic text.
  pub message: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn long_only_bounds_admit_any_universe() {
    for n in 1..10 {
      assert!(Bounds::LONG_ONLY.admits_full_investment(n));
    }
  }

  #[test]
  fn tight_upper_bound_rejects_small_universe() {
    let bounds = Bounds::new(0.0, 0.3);
    assert!(!bounds.admits_full_investment(3));
    assert!(bounds.admits_full_investment(4));
  }

  #[test]
  fn per_asset_repeats_bound() {
    assert_eq!(Bounds::new(-0.5, 1.5).per_asset(2), vec![(-0.5, 1.5), (-0.5, 1.5)]);
  }
}
