//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Return statistics, portfolio metrics and maximum-Sharpe optimization.

pub mod data;
pub mod metrics;
pub mod optimizer;
pub mod solver;
pub mod stats;
pub mod types;

pub use data::ReturnSeries;
pub use data::RiskFreeSeries;
pub use optimizer::OptimizerConfig;
pub use optimizer::SharpeOptimizer;
pub use solver::AugmentedLagrangian;
pub use solver::ConstrainedMinimizer;
pub use solver::ConstrainedProblem;
pub use solver::Constraint;
pub use solver::PenaltyNelderMead;
pub use solver::SolverOutcome;
pub use stats::Statistics;
pub use types::Bounds;
pub use types::OptimizationResult;
