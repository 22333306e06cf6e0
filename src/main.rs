use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use prettytable::row;
use prettytable::Table;
use sharpe_rs::portfolio::stats::MONTHLY;
use sharpe_rs::portfolio::OptimizerConfig;
use sharpe_rs::portfolio::ReturnSeries;
use sharpe_rs::portfolio::RiskFreeSeries;
use sharpe_rs::portfolio::SharpeOptimizer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Maximum-Sharpe portfolio weights from a table of periodic returns
#[derive(Parser, Debug)]
#[command(name = "sharpe-rs", version, about, long_about = None)]
struct Args {
  /// Delimited returns file: a header row, one row per period
  returns_file: PathBuf,

  /// Column holding the periodic risk-free rate
  #[arg(long, default_value = "rf")]
  rf_column: String,

  /// Field delimiter
  #[arg(long, default_value_t = ',')]
  delimiter: char,

  /// Periods per year used to annualize
  #[arg(long, default_value_t = MONTHLY)]
  periods: f64,

  /// Iteration cap of the solver
  #[arg(long, default_value_t = 10_000)]
  max_iters: usize,

  /// Convergence tolerance of the solver
  #[arg(long, default_value_t = 1e-8)]
  tolerance: f64,
}

impl Args {
  fn config(&self) -> OptimizerConfig {
    OptimizerConfig {
      periods_per_year: self.periods,
      max_iters: self.max_iters,
      tolerance: self.tolerance,
      ..Default::default()
    }
  }
}

/// Split a headed table into asset returns and the named risk-free column.
/// Blank lines and lines starting with `#` are skipped.
fn read_returns<R: Read>(
  reader: R,
  delimiter: u8,
  rf_column: &str,
) -> Result<(ReturnSeries, RiskFreeSeries)> {
  let mut rdr = csv::ReaderBuilder::new()
    .delimiter(delimiter)
    .comment(Some(b'#'))
    .trim(csv::Trim::All)
    .from_reader(reader);

  let headers = rdr.headers().context("cannot read header row")?.clone();
  let rf_index = headers
    .iter()
    .position(|h| h == rf_column)
    .with_context(|| format!("no risk-free column named {rf_column}"))?;
  let names: Vec<&str> = headers
    .iter()
    .enumerate()
    .filter(|&(i, _)| i != rf_index)
    .map(|(_, h)| h)
    .collect();

  let mut rf = Vec::new();
  let mut rows = Vec::new();
  for (period, record) in rdr.records().enumerate() {
    let record = record.with_context(|| format!("malformed row for period {period}"))?;
    let mut row = Vec::with_capacity(names.len());
    for (i, field) in record.iter().enumerate() {
      let value: f64 = field.parse().with_context(|| {
        format!("period {period}, column {}: {field:?} is not a number", &headers[i])
      })?;
      if i == rf_index {
        rf.push(value);
      } else {
        row.push(value);
      }
    }
    rows.push(row);
  }

  let returns = ReturnSeries::from_rows(&rows)
    .context("invalid return table")?
    .with_asset_names(names)
    .context("invalid asset names")?;
  let risk_free = RiskFreeSeries::new(rf).context("invalid risk-free column")?;
  Ok((returns, risk_free))
}

fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sharpe_rs=info")),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let args = Args::parse();
  let delimiter = u8::try_from(args.delimiter)
    .ok()
    .filter(u8::is_ascii)
    .with_context(|| format!("delimiter {:?} is not a single ASCII character", args.delimiter))?;
  let file = File::open(&args.returns_file)
    .with_context(|| format!("cannot open {}", args.returns_file.display()))?;
  let (returns, risk_free) = read_returns(file, delimiter, &args.rf_column)
    .with_context(|| format!("cannot read {}", args.returns_file.display()))?;

  let optimizer = SharpeOptimizer::new(returns, risk_free, args.config())?;
  let result = optimizer
    .find_optimal_portfolio(None)
    .context("optimization failed")?;
  let volatilities = optimizer.statistics()?.volatilities();

  let mut table = Table::new();
  table.set_titles(row!["asset", "weight", "volatility"]);
  for ((name, w), vol) in optimizer
    .returns()
    .asset_names()
    .iter()
    .zip(&result.weights)
    .zip(volatilities.iter())
  {
    table.add_row(row![name, format!("{w:.6}"), format!("{vol:.6}")]);
  }
  table.printstd();

  let mut summary = Table::new();
  summary.add_row(row!["expected return", format!("{:.6}", result.expected_return)]);
  summary.add_row(row!["volatility", format!("{:.6}", result.volatility)]);
  summary.add_row(row!["sharpe ratio", format!("{:.6}", result.sharpe)]);
  summary.add_row(row!["iterations", result.iterations]);
  summary.printstd();

  Ok(())
}
