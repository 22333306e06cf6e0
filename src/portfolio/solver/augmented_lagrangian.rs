//! # Augmented Lagrangian
//!
//! $$
//! \mathcal L_\rho(\mathbf x,\lambda,\nu)=f(\mathbf x)+\sum_j\Big(\lambda_j c_j+\tfrac{\rho}{2}c_j^2\Big)
//! +\frac{1}{2\rho}\sum_k\Big(\max(0,\nu_k-\rho g_k)^2-\nu_k^2\Big)
//! $$
//!
//! Each subproblem minimizes $\mathcal L_\rho$ over the bound box with a
//! projected gradient method (Barzilai-Borwein step, Armijo backtracking).
//! Multipliers are updated between subproblems and the penalty grows while the
//! constraint violation stalls.

use impl_new_derive::ImplNew;
use tracing::debug;

use super::central_gradient;
use super::ConstrainedMinimizer;
use super::ConstrainedProblem;
use super::Constraint;
use super::SolverOutcome;

const INITIAL_PENALTY: f64 = 10.0;
const PENALTY_GROWTH: f64 = 10.0;
const MAX_PENALTY: f64 = 1e10;
const MAX_OUTER_ITERS: usize = 100;
const MAX_BACKTRACKS: usize = 60;
const ARMIJO_C: f64 = 1e-4;
const MIN_STEP: f64 = 1e-10;
const MAX_STEP: f64 = 1e10;

/// Default constrained minimizer.
#[derive(ImplNew, Clone, Debug)]
pub struct AugmentedLagrangian {
  /// Cap on projected-gradient iterations across all subproblems.
  pub max_iters: usize,
  /// Bound on both the projected-gradient step and the constraint violation.
  pub tolerance: f64,
}

impl Default for AugmentedLagrangian {
  fn default() -> Self {
    Self {
      max_iters: 10_000,
      tolerance: 1e-8,
    }
  }
}

enum InnerExit {
  Stationary,
  Stalled,
  Budget,
  NonFinite,
}

struct Inner {
  exit: InnerExit,
  iterations: usize,
  stationarity: f64,
}

fn lagrangian(problem: &ConstrainedProblem<'_>, x: &[f64], multipliers: &[f64], rho: f64) -> f64 {
  let mut value = problem.objective(x);
  if !value.is_finite() {
    return f64::INFINITY;
  }

  for (constraint, &m) in problem.constraints.iter().zip(multipliers) {
    match constraint {
      Constraint::Equality(c) => {
        let cv = c(x);
        value += m * cv + 0.5 * rho * cv * cv;
      }
      Constraint::Inequality(g) => {
        let shifted = (m - rho * g(x)).max(0.0);
        value += (shifted * shifted - m * m) / (2.0 * rho);
      }
    }
  }

  value
}

fn update_multipliers(
  problem: &ConstrainedProblem<'_>,
  x: &[f64],
  multipliers: &mut [f64],
  rho: f64,
) {
  for (constraint, m) in problem.constraints.iter().zip(multipliers.iter_mut()) {
    match constraint {
      Constraint::Equality(c) => *m += rho * c(x),
      Constraint::Inequality(g) => *m = (*m - rho * g(x)).max(0.0),
    }
  }
}

/// `max |P(x - g) - x|`, zero exactly at a box-constrained stationary point.
fn projected_gradient_norm(problem: &ConstrainedProblem<'_>, x: &[f64], g: &[f64]) -> f64 {
  x.iter()
    .zip(g)
    .zip(&problem.bounds)
    .map(|((&xi, &gi), &(lo, hi))| ((xi - gi).clamp(lo, hi) - xi).abs())
    .fold(0.0, f64::max)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
  a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

impl AugmentedLagrangian {
  fn solve_subproblem(
    &self,
    problem: &ConstrainedProblem<'_>,
    x: &mut Vec<f64>,
    multipliers: &[f64],
    rho: f64,
    budget: usize,
  ) -> Inner {
    let merit = |z: &[f64]| lagrangian(problem, z, multipliers, rho);
    let mut fx = merit(x.as_slice());
    let mut g = central_gradient(&merit, x.as_slice());
    let mut alpha: f64 = 1.0;
    let mut iterations = 0;

    loop {
      if !fx.is_finite() || g.iter().any(|v| !v.is_finite()) {
        return Inner {
          exit: InnerExit::NonFinite,
          iterations,
          stationarity: f64::NAN,
        };
      }

      let stationarity = projected_gradient_norm(problem, x.as_slice(), &g);
      if stationarity <= self.tolerance {
        return Inner {
          exit: InnerExit::Stationary,
          iterations,
          stationarity,
        };
      }
      if iterations >= budget {
        return Inner {
          exit: InnerExit::Budget,
          iterations,
          stationarity,
        };
      }
      iterations += 1;

      let mut step = alpha;
      let mut accepted = None;
      for _ in 0..MAX_BACKTRACKS {
        let mut trial: Vec<f64> = x.iter().zip(&g).map(|(xi, gi)| xi - step * gi).collect();
        problem.project(&mut trial);
        let descent: f64 = g
          .iter()
          .zip(trial.iter().zip(x.iter()))
          .map(|(gi, (t, xi))| gi * (t - xi))
          .sum();

        if descent < 0.0 {
          let ft = merit(&trial);
          if ft <= fx + ARMIJO_C * descent {
            accepted = Some((trial, ft));
            break;
          }
        }
        step *= 0.5;
      }

      let Some((trial, ft)) = accepted else {
        return Inner {
          exit: InnerExit::Stalled,
          iterations,
          stationarity,
        };
      };

      let g_new = central_gradient(&merit, &trial);
      let s: Vec<f64> = trial.iter().zip(x.iter()).map(|(a, b)| a - b).collect();
      let y: Vec<f64> = g_new.iter().zip(g.iter()).map(|(a, b)| a - b).collect();
      let sy = dot(&s, &y);
      alpha = if sy > 0.0 {
        (dot(&s, &s) / sy).clamp(MIN_STEP, MAX_STEP)
      } else {
        (2.0 * step).clamp(MIN_STEP, MAX_STEP)
      };

      *x = trial;
      fx = ft;
      g = g_new;
    }
  }
}

impl ConstrainedMinimizer for AugmentedLagrangian {
  fn name(&self) -> &str {
    "augmented-lagrangian"
  }

  fn minimize(&self, problem: &ConstrainedProblem<'_>) -> SolverOutcome {
    if let Some(msg) = problem.check() {
      return SolverOutcome::failure(problem.initial_guess.clone(), 0, msg);
    }

    let mut x = problem.initial_guess.clone();
    problem.project(&mut x);
    if !problem.objective(&x).is_finite() {
      return SolverOutcome::failure(x, 0, "objective is not finite at the initial guess");
    }

    let mut multipliers = vec![0.0; problem.constraints.len()];
    let mut rho = INITIAL_PENALTY;
    let mut previous_violation = f64::INFINITY;
    let mut iterations = 0;

    for outer in 0..MAX_OUTER_ITERS {
      let budget = self.max_iters.saturating_sub(iterations);
      let inner = self.solve_subproblem(problem, &mut x, &multipliers, rho, budget);
      iterations += inner.iterations;
      let violation = problem.max_violation(&x);

      debug!(
        outer,
        iterations,
        rho,
        violation,
        stationarity = inner.stationarity,
        "augmented Lagrangian subproblem solved"
      );

      match inner.exit {
        InnerExit::NonFinite => {
          return SolverOutcome::failure(
            x,
            iterations,
            "objective or its gradient became non-finite",
          );
        }
        InnerExit::Stationary | InnerExit::Stalled if violation <= self.tolerance => {
          let message = match inner.exit {
            InnerExit::Stationary => {
              "converged: projected gradient and constraint violation within tolerance"
            }
            _ => "converged: feasible point, no further descent along the projected gradient",
          };
          let value = problem.objective(&x);
          return SolverOutcome {
            params: x,
            value,
            success: true,
            iterations,
            message: message.into(),
          };
        }
        _ => {}
      }

      if iterations >= self.max_iters {
        return SolverOutcome::failure(
          x,
          iterations,
          format!(
            "iteration limit of {} reached (constraint violation {violation:e}, projected gradient {:e})",
            self.max_iters, inner.stationarity
          ),
        );
      }

      update_multipliers(problem, &x, &mut multipliers, rho);
      if violation > 0.25 * previous_violation {
        rho = (rho * PENALTY_GROWTH).min(MAX_PENALTY);
      }
      previous_violation = violation;
    }

    let violation = problem.max_violation(&x);
    SolverOutcome::failure(
      x,
      iterations,
      format!("no feasible stationary point after {MAX_OUTER_ITERS} multiplier updates (constraint violation {violation:e})"),
    )
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  fn simplex_problem<'a>(target: &'a [f64]) -> ConstrainedProblem<'a> {
    let n = target.len();
    ConstrainedProblem::new(
      move |x: &[f64]| x.iter().zip(target).map(|(a, b)| (a - b).powi(2)).sum(),
      vec![1.0 / n as f64; n],
      vec![(0.0, 1.0); n],
    )
    .with_constraint(Constraint::equality(|x: &[f64]| x.iter().sum::<f64>() - 1.0))
  }

  #[test]
  fn box_only_problem_clamps_to_bound() {
    let problem = ConstrainedProblem::new(|x: &[f64]| (x[0] - 2.0).powi(2), vec![0.5], vec![(0.0, 1.0)]);
    let outcome = AugmentedLagrangian::default().minimize(&problem);

    assert!(outcome.success, "{}", outcome.message);
    assert_abs_diff_eq!(outcome.params[0], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(outcome.value, 1.0, epsilon = 1e-10);
  }

  #[test]
  fn projects_target_onto_simplex() {
    let target = [0.6, 0.6, -0.2];
    let outcome = AugmentedLagrangian::default().minimize(&simplex_problem(&target));

    // Euclidean projection of the target onto the probability simplex.
    assert!(outcome.success, "{}", outcome.message);
    assert_abs_diff_eq!(outcome.params[0], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.params[1], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.params[2], 0.0, epsilon = 1e-6);
    assert!((outcome.params.iter().sum::<f64>() - 1.0).abs() <= 1e-8);
  }

  #[test]
  fn inequality_constraint_is_respected() {
    // min (x - 1)^2 + (y - 1)^2  s.t.  1 - x - y >= 0
    let problem = ConstrainedProblem::new(
      |x: &[f64]| (x[0] - 1.0).powi(2) + (x[1] - 1.0).powi(2),
      vec![0.0, 0.0],
      vec![(-5.0, 5.0), (-5.0, 5.0)],
    )
    .with_constraint(Constraint::inequality(|x: &[f64]| 1.0 - x[0] - x[1]));
    let outcome = AugmentedLagrangian::default().minimize(&problem);

    assert!(outcome.success, "{}", outcome.message);
    assert_abs_diff_eq!(outcome.params[0], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(outcome.params[1], 0.5, epsilon = 1e-6);
  }

  #[test]
  fn reports_iteration_limit() {
    let target = [0.9, 0.3, 0.1];
    let solver = AugmentedLagrangian::new(1, 1e-12);
    let outcome = solver.minimize(&simplex_problem(&target));

    assert!(!outcome.success);
    assert!(outcome.message.contains("iteration limit"), "{}", outcome.message);
    assert_eq!(outcome.iterations, 1);
  }

  #[test]
  fn rejects_non_finite_start() {
    let problem = ConstrainedProblem::new(|x: &[f64]| 1.0 / x[0], vec![0.0], vec![(0.0, 1.0)]);
    let outcome = AugmentedLagrangian::default().minimize(&problem);

    assert!(!outcome.success);
    assert!(outcome.message.contains("not finite"));
  }

  #[test]
  fn deterministic_for_identical_inputs() {
    let target = [0.7, 0.1, 0.4];
    let a = AugmentedLagrangian::default().minimize(&simplex_problem(&target));
    let b = AugmentedLagrangian::default().minimize(&simplex_problem(&target));

    assert_eq!(a.params, b.params);
    assert_eq!(a.iterations, b.iterations);
  }
}
