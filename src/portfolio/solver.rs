//! # Constrained Minimizers
//!
//! $$
//! \min_{\mathbf x} f(\mathbf x)\quad\text{s.t.}\quad c_j(\mathbf x)=0,\ g_k(\mathbf x)\ge 0,\ \ell\le\mathbf x\le u
//! $$
//!
//! The optimization primitive the portfolio optimizer calls through. A solver
//! receives an objective, an initial guess, per-variable bounds and a list of
//! constraints, and reports the parameters it reached, the objective value,
//! and whether it converged.

pub mod augmented_lagrangian;
pub mod nelder_mead;

pub use augmented_lagrangian::AugmentedLagrangian;
pub use nelder_mead::PenaltyNelderMead;

/// Scalar function of the decision vector.
pub type ScalarFn<'a> = Box<dyn Fn(&[f64]) -> f64 + 'a>;

/// A constraint on the decision vector.
pub enum Constraint<'a> {
  /// `f(x) = 0`
  Equality(ScalarFn<'a>),
  /// `g(x) >= 0`
  Inequality(ScalarFn<'a>),
}

impl<'a> Constraint<'a> {
  pub fn equality(f: impl Fn(&[f64]) -> f64 + 'a) -> Self {
    Self::Equality(Box::new(f))
  }

  pub fn inequality(g: impl Fn(&[f64]) -> f64 + 'a) -> Self {
    Self::Inequality(Box::new(g))
  }

  /// Amount by which `x` violates this constraint, zero when satisfied.
  pub fn violation(&self, x: &[f64]) -> f64 {
    match self {
      Self::Equality(f) => f(x).abs(),
      Self::Inequality(g) => (-g(x)).max(0.0),
    }
  }
}

/// Problem handed to a [`ConstrainedMinimizer`].
pub struct ConstrainedProblem<'a> {
  pub objective: ScalarFn<'a>,
  pub initial_guess: Vec<f64>,
  pub bounds: Vec<(f64, f64)>,
  pub constraints: Vec<Constraint<'a>>,
}

impl<'a> ConstrainedProblem<'a> {
  pub fn new(
    objective: impl Fn(&[f64]) -> f64 + 'a,
    initial_guess: Vec<f64>,
    bounds: Vec<(f64, f64)>,
  ) -> Self {
    Self {
      objective: Box::new(objective),
      initial_guess,
      bounds,
      constraints: Vec::new(),
    }
  }

  pub fn with_constraint(mut self, constraint: Constraint<'a>) -> Self {
    self.constraints.push(constraint);
    self
  }

  pub fn dim(&self) -> usize {
    self.initial_guess.len()
  }

  pub fn objective(&self, x: &[f64]) -> f64 {
    (self.objective)(x)
  }

  /// Largest violation over all constraints.
  pub fn max_violation(&self, x: &[f64]) -> f64 {
    self
      .constraints
      .iter()
      .map(|c| c.violation(x))
      .fold(0.0, f64::max)
  }

  /// Clamp `x` into the bound box in place.
  pub fn project(&self, x: &mut [f64]) {
    for (xi, &(lo, hi)) in x.iter_mut().zip(&self.bounds) {
      *xi = (*xi).clamp(lo, hi);
    }
  }

  /// Structural problems that make the run meaningless.
  pub fn check(&self) -> Option<String> {
    if self.initial_guess.is_empty() {
      return Some("initial guess is empty".into());
    }
    if self.bounds.len() != self.initial_guess.len() {
      return Some(format!(
        "got {} bounds for {} variables",
        self.bounds.len(),
        self.initial_guess.len()
      ));
    }
    if let Some((i, (lo, hi))) = self
      .bounds
      .iter()
      .enumerate()
      .find(|&(_, &(lo, hi))| !(lo <= hi))
    {
      return Some(format!("bound {i} is empty: [{lo}, {hi}]"));
    }
    if self.initial_guess.iter().any(|x| !x.is_finite()) {
      return Some("initial guess is not finite".into());
    }
    None
  }
}

/// What a solver reports back.
#[derive(Clone, Debug, Default)]
pub struct SolverOutcome {
  /// Final decision vector.
  pub params: Vec<f64>,
  /// Objective at `params`.
  pub value: f64,
  /// Whether the solver met its convergence criteria.
  pub success: bool,
  /// Iterations spent.
  pub iterations: usize,
  /// Diagnostic text.
  pub message: String,
}

impl SolverOutcome {
  pub(crate) fn failure(params: Vec<f64>, iterations: usize, message: impl Into<String>) -> Self {
    Self {
      params,
      value: f64::NAN,
      success: false,
      iterations,
      message: message.into(),
    }
  }
}

/// General-purpose constrained nonlinear minimizer.
pub trait ConstrainedMinimizer {
  /// Human-readable solver name used in logs.
  fn name(&self) -> &str;

  /// Minimize the problem's objective subject to its bounds and constraints.
  fn minimize(&self, problem: &ConstrainedProblem<'_>) -> SolverOutcome;
}

/// Central finite-difference gradient.
pub(crate) fn central_gradient(f: &dyn Fn(&[f64]) -> f64, x: &[f64]) -> Vec<f64> {
  let step = f64::EPSILON.cbrt();
  let mut probe = x.to_vec();
  let mut grad = vec![0.0; x.len()];

  for i in 0..x.len() {
    let h = step * x[i].abs().max(1.0);
    probe[i] = x[i] + h;
    let f_plus = f(&probe);
    probe[i] = x[i] - h;
    let f_minus = f(&probe);
    probe[i] = x[i];
    grad[i] = (f_plus - f_minus) / (2.0 * h);
  }

  grad
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn inequality_constraints_mean_non_negative() {
    let eq = Constraint::equality(|x: &[f64]| x[0] - 1.0);
    let ineq = Constraint::inequality(|x: &[f64]| x[0] - 1.0);

    assert_eq!(eq.violation(&[0.5]), 0.5);
    assert_eq!(eq.violation(&[1.5]), 0.5);
    assert_eq!(ineq.violation(&[1.5]), 0.0);
    assert_eq!(ineq.violation(&[0.5]), 0.5);
  }

  #[test]
  fn check_reports_malformed_problems() {
    let ok = ConstrainedProblem::new(|x: &[f64]| x[0], vec![0.5], vec![(0.0, 1.0)]);
    assert!(ok.check().is_none());

    let short = ConstrainedProblem::new(|x: &[f64]| x[0], vec![0.5, 0.5], vec![(0.0, 1.0)]);
    assert!(short.check().is_some());

    let empty_box = ConstrainedProblem::new(|x: &[f64]| x[0], vec![0.5], vec![(1.0, 0.0)]);
    assert!(empty_box.check().is_some());

    let nan_guess = ConstrainedProblem::new(|x: &[f64]| x[0], vec![f64::NAN], vec![(0.0, 1.0)]);
    assert!(nan_guess.check().is_some());
  }

  #[test]
  fn central_gradient_of_quadratic() {
    let f = |x: &[f64]| x[0] * x[0] + 3.0 * x[0] * x[1];
    let g = central_gradient(&f, &[1.0, 2.0]);

    assert!((g[0] - 8.0).abs() < 1e-8);
    assert!((g[1] - 3.0).abs() < 1e-8);
  }
}
