use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use sharpe_rs::portfolio::Bounds;
use sharpe_rs::portfolio::OptimizerConfig;
use sharpe_rs::portfolio::PenaltyNelderMead;
use sharpe_rs::portfolio::ReturnSeries;
use sharpe_rs::portfolio::RiskFreeSeries;
use sharpe_rs::portfolio::SharpeOptimizer;
use sharpe_rs::PortfolioError;

/// Mutually orthogonal, zero-mean columns: sample covariances vanish exactly.
const PATTERNS: [[f64; 4]; 3] = [
  [1.0, -1.0, 1.0, -1.0],
  [1.0, 1.0, -1.0, -1.0],
  [1.0, -1.0, -1.0, 1.0],
];

fn uncorrelated(annual_means: &[f64], scale: f64) -> ReturnSeries {
  let columns: Vec<Vec<f64>> = annual_means
    .iter()
    .zip(PATTERNS.iter())
    .map(|(m, p)| p.iter().map(|x| m / 12.0 + scale * x).collect())
    .collect();
  ReturnSeries::from_columns(&columns).unwrap()
}

fn flat_rate(annual: f64, periods: usize) -> RiskFreeSeries {
  RiskFreeSeries::new(vec![annual / 12.0; periods]).unwrap()
}

fn dirichlet_like(rng: &mut StdRng, n: usize) -> Vec<f64> {
  let raw: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..1.0)).collect();
  let total: f64 = raw.iter().sum();
  raw.into_iter().map(|x| x / total).collect()
}

#[test]
fn higher_mean_asset_dominates() {
  let optimizer =
    SharpeOptimizer::with_defaults(uncorrelated(&[0.10, 0.04], 0.05), flat_rate(0.02, 4)).unwrap();
  let result = optimizer.find_optimal_portfolio(None).unwrap();

  assert!(result.weights[0] > result.weights[1]);
  assert_abs_diff_eq!(result.weights[0], 0.8, epsilon = 1e-4);
  assert_abs_diff_eq!(result.weights[1], 0.2, epsilon = 1e-4);
  assert!(optimizer.validate_weights(&result.weights).is_ok());
}

#[test]
fn identical_assets_converge_to_feasible_weights() {
  let optimizer = SharpeOptimizer::with_defaults(
    uncorrelated(&[0.08, 0.08, 0.08], 0.04),
    flat_rate(0.02, 4),
  )
  .unwrap();
  let result = optimizer.find_optimal_portfolio(None).unwrap();

  assert!(optimizer.validate_weights(&result.weights).is_ok());
  for w in &result.weights {
    assert_abs_diff_eq!(*w, 1.0 / 3.0, epsilon = 1e-6);
  }
}

#[test]
fn mismatched_series_lengths_fail_construction() {
  let returns = ReturnSeries::from_columns(&[vec![0.01; 10], vec![0.02; 10]]).unwrap();
  let rf = RiskFreeSeries::new(vec![0.001; 9]).unwrap();

  assert!(matches!(
    SharpeOptimizer::with_defaults(returns, rf),
    Err(PortfolioError::InvalidInput(_))
  ));
}

#[test]
fn sum_check_is_tolerance_based() {
  let optimizer =
    SharpeOptimizer::with_defaults(uncorrelated(&[0.10, 0.04], 0.05), flat_rate(0.02, 4)).unwrap();

  assert!(optimizer.validate_weights(&[0.5, 0.499999999]).is_ok());
  assert!(matches!(
    optimizer.validate_weights(&[0.5, 0.4]),
    Err(PortfolioError::InvalidWeights(_))
  ));
}

#[test]
fn optimization_is_idempotent() {
  let optimizer =
    SharpeOptimizer::with_defaults(uncorrelated(&[0.10, 0.06, 0.03], 0.05), flat_rate(0.01, 4))
      .unwrap();

  let first = optimizer.find_optimal_portfolio(None).unwrap();
  let second = optimizer.find_optimal_portfolio(None).unwrap();
  assert_eq!(first.weights, second.weights);
  assert_eq!(first.sharpe, second.sharpe);
}

#[test]
fn optimum_beats_random_feasible_portfolios() {
  let mut rng = StdRng::seed_from_u64(42);
  let n_assets = 5;
  let n_periods = 60;
  let rows: Vec<Vec<f64>> = (0..n_periods)
    .map(|_| {
      let market = rng.gen_range(-0.04..0.05);
      (0..n_assets)
        .map(|i| 0.002 * i as f64 + 0.5 * market + rng.gen_range(-0.03..0.03))
        .collect()
    })
    .collect();
  let returns = ReturnSeries::from_rows(&rows).unwrap();
  let optimizer = SharpeOptimizer::with_defaults(returns, flat_rate(0.01, n_periods)).unwrap();
  let best = optimizer.find_optimal_portfolio(None).unwrap();

  assert!(optimizer.validate_weights(&best.weights).is_ok());
  for _ in 0..500 {
    let w = dirichlet_like(&mut rng, n_assets);
    assert!(optimizer.sharpe_ratio(&w).unwrap() <= best.sharpe + 1e-6);
  }
}

#[test]
fn short_bounds_are_respected() {
  let config = OptimizerConfig {
    bounds: Bounds::new(-0.5, 1.5),
    ..Default::default()
  };
  let optimizer = SharpeOptimizer::new(
    uncorrelated(&[0.10, 0.01], 0.05),
    flat_rate(0.02, 4),
    config,
  )
  .unwrap();
  let result = optimizer.find_optimal_portfolio(None).unwrap();

  // Unconstrained tangency: w ∝ (0.08, -0.01)
  assert_abs_diff_eq!(result.weights[0], 8.0 / 7.0, epsilon = 1e-4);
  assert_abs_diff_eq!(result.weights[1], -1.0 / 7.0, epsilon = 1e-4);
}

#[test]
fn nelder_mead_result_is_feasible_when_it_succeeds() {
  let optimizer =
    SharpeOptimizer::with_defaults(uncorrelated(&[0.10, 0.04], 0.05), flat_rate(0.02, 4)).unwrap();

  match optimizer.find_optimal_portfolio_with(&PenaltyNelderMead::default(), None) {
    Ok(result) => {
      assert!(optimizer.validate_weights(&result.weights).is_ok());
      assert_abs_diff_eq!(result.weights[0], 0.8, epsilon = 1e-2);
    }
    Err(err) => assert!(matches!(err, PortfolioError::OptimizationFailed { .. })),
  }
}
