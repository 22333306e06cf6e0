//! # Penalized Nelder-Mead
//!
//! $$
//! \phi(\mathbf x)=f(\Pi(\mathbf x))+\kappa\Big(\sum_j v_j(\Pi(\mathbf x))^2+\lVert\mathbf x-\Pi(\mathbf x)\rVert^2\Big)
//! $$
//!
//! Derivative-free alternative: argmin's Nelder-Mead on the objective evaluated
//! at the box projection $\Pi$, plus quadratic penalties for constraint
//! violation and for leaving the box.

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::core::State;
use argmin::core::TerminationReason;
use argmin::solver::neldermead::NelderMead;
use impl_new_derive::ImplNew;

use super::ConstrainedMinimizer;
use super::ConstrainedProblem;
use super::SolverOutcome;

/// Cost assigned where the objective is not finite.
const NON_FINITE_COST: f64 = 1e150;

#[derive(ImplNew, Clone, Debug)]
pub struct PenaltyNelderMead {
  /// Maximum Nelder-Mead iterations.
  pub max_iters: u64,
  /// Standard deviation of simplex costs below which the search stops.
  pub sd_tolerance: f64,
  /// Weight of the quadratic penalty terms.
  pub penalty: f64,
  /// Edge length of the starting simplex.
  pub initial_step: f64,
  /// Largest constraint violation accepted at the final point.
  pub feasibility_tolerance: f64,
}

impl Default for PenaltyNelderMead {
  fn default() -> Self {
    Self {
      max_iters: 20_000,
      sd_tolerance: 1e-12,
      penalty: 1e6,
      initial_step: 0.1,
      feasibility_tolerance: 1e-6,
    }
  }
}

struct PenalizedCost<'p, 'a> {
  problem: &'p ConstrainedProblem<'a>,
  penalty: f64,
}

impl CostFunction for PenalizedCost<'_, '_> {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
    let mut inside = x.clone();
    self.problem.project(&mut inside);

    let outside: f64 = x
      .iter()
      .zip(inside.iter())
      .map(|(a, b)| (a - b).powi(2))
      .sum();
    let violation: f64 = self
      .problem
      .constraints
      .iter()
      .map(|c| c.violation(&inside).powi(2))
      .sum();
    let f = self.problem.objective(&inside);
    let f = if f.is_finite() { f } else { NON_FINITE_COST };

    Ok(f + self.penalty * (violation + outside))
  }
}

impl PenaltyNelderMead {
  fn simplex(&self, x0: &[f64]) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.to_vec());
    for i in 0..x0.len() {
      let mut point = x0.to_vec();
      point[i] += self.initial_step;
      simplex.push(point);
    }
    simplex
  }
}

impl ConstrainedMinimizer for PenaltyNelderMead {
  fn name(&self) -> &str {
    "penalty-nelder-mead"
  }

  fn minimize(&self, problem: &ConstrainedProblem<'_>) -> SolverOutcome {
    if let Some(msg) = problem.check() {
      return SolverOutcome::failure(problem.initial_guess.clone(), 0, msg);
    }

    let mut x0 = problem.initial_guess.clone();
    problem.project(&mut x0);
    if !problem.objective(&x0).is_finite() {
      return SolverOutcome::failure(x0, 0, "objective is not finite at the initial guess");
    }

    let cost = PenalizedCost {
      problem,
      penalty: self.penalty,
    };
    let solver = match NelderMead::new(self.simplex(&x0)).with_sd_tolerance(self.sd_tolerance) {
      Ok(solver) => solver,
      Err(e) => return SolverOutcome::failure(x0, 0, format!("invalid Nelder-Mead setup: {e}")),
    };

    let res = match Executor::new(cost, solver)
      .configure(|state| state.max_iters(self.max_iters))
      .run()
    {
      Ok(res) => res,
      Err(e) => return SolverOutcome::failure(x0, 0, format!("Nelder-Mead aborted: {e}")),
    };

    let state = res.state();
    let iterations = state.get_iter() as usize;
    let converged = matches!(
      state.get_termination_reason(),
      Some(TerminationReason::SolverConverged)
    );
    let mut params = state.get_best_param().cloned().unwrap_or(x0);
    problem.project(&mut params);
    let violation = problem.max_violation(&params);

    if !converged {
      let reason = state
        .get_termination_reason()
        .map(|r| format!("terminated before convergence: {r:?}"))
        .unwrap_or_else(|| "terminated without a reason".into());
      return SolverOutcome::failure(params, iterations, reason);
    }
    if violation > self.feasibility_tolerance {
      return SolverOutcome::failure(
        params,
        iterations,
        format!(
          "penalty too weak: constraint violation {violation:e} exceeds {:e}",
          self.feasibility_tolerance
        ),
      );
    }

    let value = problem.objective(&params);
    SolverOutcome {
      params,
      value,
      success: true,
      iterations,
      message: "converged: simplex cost spread within tolerance".into(),
    }
  }
}
