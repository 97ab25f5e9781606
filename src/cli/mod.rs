//! Command-line parsing for the profit trend forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the forecasting code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::data::{MAX_SALES_PER_DAY, MAX_SAMPLE_DAYS};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ptrend", version, about = "Daily profit trend forecaster for shop sales exports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate sales into daily profit, fit a trend, and project it forward.
    Forecast(ForecastArgs),
    /// Per-product profit table with badges, low stock, and the overall trend.
    Report(ReportArgs),
    /// Write joined sales in spreadsheet layout.
    Export(ExportArgs),
    /// List stock items, optionally filtered by name, unit, and price.
    Stock(StockArgs),
    /// Sell from stock: record the sale and reduce the item's quantity.
    Sell(SellArgs),
    /// Sales history with revenue and profit per sale, newest first.
    Sales(SalesArgs),
    /// Generate a synthetic `sale_date,profit` CSV.
    Sample(SampleArgs),
}

/// Inclusive sale date window shared by the data-reading commands.
#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    /// First day to include (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Sales CSV. Pre-joined (`sale_date,profit`) unless `--stock` is given.
    #[arg(long, value_name = "CSV")]
    pub sales: PathBuf,

    /// Stock CSV; when set, `--sales` is the raw sales table and is joined on `stock_id`.
    #[arg(long, value_name = "CSV")]
    pub stock: Option<PathBuf>,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Days past the last sale day to project (defaults to PTREND_HORIZON_DAYS or 7).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub horizon: Option<u32>,

    /// Print the forecast as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Render an ASCII plot of the daily series and trend line.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Write the forecast to a JSON file.
    #[arg(long = "export-json", value_name = "PATH")]
    pub export_json: Option<PathBuf>,

    /// Write the daily series with fitted values to CSV.
    #[arg(long = "export-daily", value_name = "PATH")]
    pub export_daily: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    /// Stock CSV.
    #[arg(long, value_name = "CSV")]
    pub stock: PathBuf,

    /// Raw sales CSV.
    #[arg(long, value_name = "CSV")]
    pub sales: PathBuf,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Days past the last sale day to project (defaults to PTREND_HORIZON_DAYS or 7).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub horizon: Option<u32>,

    /// Also fit a trend per product.
    #[arg(long)]
    pub per_product: bool,

    /// Render an ASCII plot of the overall trend.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Stock CSV.
    #[arg(long, value_name = "CSV")]
    pub stock: PathBuf,

    /// Raw sales CSV.
    #[arg(long, value_name = "CSV")]
    pub sales: PathBuf,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Output CSV path.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct StockArgs {
    /// Stock CSV.
    #[arg(long, value_name = "CSV")]
    pub stock: PathBuf,

    /// Case-insensitive substring of the item name.
    #[arg(long)]
    pub name: Option<String>,

    /// Exact unit (e.g. `kg`).
    #[arg(long)]
    pub unit: Option<String>,

    /// Lowest selling price to include.
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Highest selling price to include.
    #[arg(long)]
    pub max_price: Option<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct SellArgs {
    /// Stock CSV (rewritten with the reduced quantity).
    #[arg(long, value_name = "CSV")]
    pub stock: PathBuf,

    /// Raw sales CSV (the sale is appended; created if missing).
    #[arg(long, value_name = "CSV")]
    pub sales: PathBuf,

    /// Stock item id.
    #[arg(long)]
    pub id: i64,

    /// Quantity sold, in the item's unit.
    #[arg(long, allow_negative_numbers = true)]
    pub qty: f64,
}

#[derive(Debug, Args, Clone)]
pub struct SalesArgs {
    /// Stock CSV.
    #[arg(long, value_name = "CSV")]
    pub stock: PathBuf,

    /// Raw sales CSV.
    #[arg(long, value_name = "CSV")]
    pub sales: PathBuf,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Number of days of history.
    #[arg(
        long,
        default_value_t = 60,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_SAMPLE_DAYS))
    )]
    pub days: u32,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Expected daily profit on the first day.
    #[arg(long, default_value_t = 200.0)]
    pub base: f64,

    /// Change in expected daily profit per day.
    #[arg(long, default_value_t = 1.5, allow_negative_numbers = true)]
    pub drift: f64,

    /// Standard deviation of daily noise.
    #[arg(long, default_value_t = 25.0)]
    pub noise: f64,

    /// Sales recorded per day.
    #[arg(
        long,
        default_value_t = 4,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_SALES_PER_DAY))
    )]
    pub sales_per_day: u32,

    /// Last day of history (defaults to today).
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,

    /// Output CSV path.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_forecast_flags() {
        let cli = Cli::try_parse_from([
            "ptrend",
            "forecast",
            "--sales",
            "s.csv",
            "--start",
            "2024-01-01",
            "--horizon",
            "3",
            "--json",
        ])
        .unwrap();
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.horizon, Some(3));
        assert_eq!(args.range.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(args.range.end.is_none());
        assert!(args.json);
    }

    #[test]
    fn rejects_zero_horizon() {
        let res = Cli::try_parse_from(["ptrend", "forecast", "--sales", "s.csv", "--horizon", "0"]);
        assert!(res.is_err());
    }

    #[test]
    fn sample_accepts_negative_drift() {
        let cli =
            Cli::try_parse_from(["ptrend", "sample", "--drift", "-2.5", "--out", "x.csv"]).unwrap();
        let Command::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        assert_eq!(args.drift, -2.5);
        assert_eq!(args.days, 60);
    }

    #[test]
    fn parses_stock_filters_and_sell() {
        let cli = Cli::try_parse_from([
            "ptrend", "stock", "--stock", "s.csv", "--name", "rice", "--max-price", "3",
        ])
        .unwrap();
        let Command::Stock(args) = cli.command else {
            panic!("expected stock");
        };
        assert_eq!(args.name.as_deref(), Some("rice"));
        assert_eq!(args.max_price, Some(3.0));
        assert!(args.unit.is_none());

        let cli = Cli::try_parse_from([
            "ptrend", "sell", "--stock", "s.csv", "--sales", "t.csv", "--id", "2", "--qty", "-1",
        ])
        .unwrap();
        let Command::Sell(args) = cli.command else {
            panic!("expected sell");
        };
        assert_eq!((args.id, args.qty), (2, -1.0));
    }

    #[test]
    fn sample_days_are_bounded() {
        let argv = ["ptrend", "sample", "--days", "4294967295", "--out", "x.csv"];
        let res = Cli::try_parse_from(argv);
        assert!(res.is_err());
        let res = Cli::try_parse_from(["ptrend", "sample", "--days", "0", "--out", "x.csv"]);
        assert!(res.is_err());
    }
}
