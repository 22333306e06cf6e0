//! # sharpe-rs
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}\in\Delta} \frac{\mu^\top\mathbf{w}-r_f}{\sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}}
//! $$
//!
//! Maximum-Sharpe-ratio allocation across a fixed asset universe, computed from
//! historical periodic returns and a matching risk-free rate series.
//!
//! ```ignore
//! use sharpe_rs::portfolio::{ReturnSeries, RiskFreeSeries, SharpeOptimizer};
//!
//! let returns = ReturnSeries::from_columns(&columns)?;
//! let rf = RiskFreeSeries::new(rf_rates)?;
//! let optimizer = SharpeOptimizer::with_defaults(returns, rf)?;
//! let result = optimizer.find_optimal_portfolio(None)?;
//! println!("{:?}", result.weights);
//! ```

pub mod error;
pub mod portfolio;

pub use error::PortfolioError;
pub use error::Result;
