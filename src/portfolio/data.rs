//! # Portfolio Data
//!
//! $$
//! R\in\mathbb R^{T\times N},\qquad r_f\in\mathbb R^{T}
//! $$
//!
//! Validated containers for periodic asset returns and risk-free rates.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;

use crate::error::PortfolioError;
use crate::error::Result;

/// Minimum number of periods needed for a sample covariance.
pub const MIN_PERIODS: usize = 2;

/// Periodic asset returns, rows are periods and columns are assets.
#[derive(Clone, Debug)]
pub struct ReturnSeries {
  data: Array2<f64>,
  asset_names: Vec<String>,
}

impl ReturnSeries {
  /// Wrap a `periods x assets` matrix.
  pub fn new(data: Array2<f64>) -> Result<Self> {
    let (periods, assets) = data.dim();
    if assets == 0 {
      return Err(PortfolioError::InvalidInput(
        "return series must contain at least one asset column".into(),
      ));
    }
    if periods < MIN_PERIODS {
      return Err(PortfolioError::InvalidInput(format!(
        "return series must contain at least {MIN_PERIODS} periods, got {periods}"
      )));
    }
    if let Some(((row, col), v)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
      return Err(PortfolioError::InvalidInput(format!(
        "return series value at period {row}, asset {col} is not finite ({v})"
      )));
    }

    let asset_names = (0..assets).map(|i| format!("asset_{i}")).collect();
    Ok(Self { data, asset_names })
  }

  /// Build from one vector per asset. All columns must share the same length.
  pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self> {
    let assets = columns.len();
    let periods = columns.first().map(|c| c.len()).unwrap_or(0);
    if let Some((i, c)) = columns.iter().enumerate().find(|(_, c)| c.len() != periods) {
      return Err(PortfolioError::InvalidInput(format!(
        "return series is not tabular: asset {i} has {} periods, asset 0 has {periods}",
        c.len()
      )));
    }

    let data = Array2::from_shape_fn((periods, assets), |(t, i)| columns[i][t]);
    Self::new(data)
  }

  /// Build from one vector per period. All rows must share the same length.
  pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
    let periods = rows.len();
    let assets = rows.first().map(|r| r.len()).unwrap_or(0);
    if let Some((t, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != assets) {
      return Err(PortfolioError::InvalidInput(format!(
        "return series is not tabular: period {t} has {} assets, period 0 has {assets}",
        r.len()
      )));
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    let data = Array2::from_shape_vec((periods, assets), flat)
      .map_err(|e| PortfolioError::InvalidInput(format!("return series is not tabular: {e}")))?;
    Self::new(data)
  }

  /// Attach asset names, one per column.
  pub fn with_asset_names<S: Into<String>>(mut self, names: Vec<S>) -> Result<Self> {
    if names.len() != self.n_assets() {
      return Err(PortfolioError::InvalidInput(format!(
        "got {} asset names for {} asset columns",
        names.len(),
        self.n_assets()
      )));
    }
    self.asset_names = names.into_iter().map(Into::into).collect();
    Ok(self)
  }

  pub fn n_periods(&self) -> usize {
    self.data.nrows()
  }

  pub fn n_assets(&self) -> usize {
    self.data.ncols()
  }

  pub fn asset_names(&self) -> &[String] {
    &self.asset_names
  }

  pub fn view(&self) -> ArrayView2<'_, f64> {
    self.data.view()
  }
}

/// Periodic risk-free rates, one value per period.
#[derive(Clone, Debug)]
pub struct RiskFreeSeries {
  rates: Array1<f64>,
}

impl RiskFreeSeries {
  pub fn new(rates: impl Into<Array1<f64>>) -> Result<Self> {
    let rates = rates.into();
    if rates.is_empty() {
      return Err(PortfolioError::InvalidInput(
        "risk-free series must not be empty".into(),
      ));
    }
    if let Some((t, v)) = rates.indexed_iter().find(|(_, v)| !v.is_finite()) {
      return Err(PortfolioError::InvalidInput(format!(
        "risk-free series is not a flat numeric sequence: value at period {t} is {v}"
      )));
    }

    Ok(Self { rates })
  }

  pub fn len(&self) -> usize {
    self.rates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rates.is_empty()
  }

  /// Mean periodic rate.
  pub fn mean(&self) -> f64 {
    self.rates.mean().unwrap_or(0.0)
  }

  pub fn view(&self) -> ArrayView1<'_, f64> {
    self.rates.view()
  }
}
