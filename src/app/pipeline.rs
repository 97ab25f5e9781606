//! Shared "load -> aggregate -> forecast" logic behind the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> (optional) stock join -> daily aggregation -> trend fit -> report
//!
//! The command handlers can then focus on presentation (printing vs exports).

use std::path::Path;

use chrono::NaiveDateTime;
use tracing::info;

use crate::domain::{
    DateRange, ForecastConfig, ForecastResult, ProductForecast, ReportConfig, SaleEntry, SaleLine,
    StockItem,
};
use crate::error::AppError;
use crate::forecast::{forecast_by_product, forecast_profit_trend};
use crate::inventory::{StockFilter, apply_sale, filter_stock};
use crate::io::export::{append_sale_entry, write_stock_csv};
use crate::io::ingest::{Ingested, join_sales, load_sale_entries, load_sale_rows, load_stock_items};
use crate::report::{ProfitReport, build_profit_report, low_stock_items};

/// Row accounting for a run, summed across the files read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub rows_read: usize,
    pub rows_used: usize,
    pub rows_filtered: usize,
    pub row_errors: usize,
    /// Sales whose `stock_id` matched no stock item.
    pub orphan_sales: usize,
}

impl IngestStats {
    fn add<T>(&mut self, ingested: &Ingested<T>) {
        self.rows_read += ingested.rows_read;
        self.rows_used += ingested.rows_used();
        self.rows_filtered += ingested.rows_filtered;
        self.row_errors += ingested.row_errors.len();
    }

    /// One line per kind of row that was read but not used.
    pub fn notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.row_errors > 0 {
            notes.push(format!("Skipped {} malformed rows (see warnings).", self.row_errors));
        }
        if self.orphan_sales > 0 {
            notes.push(format!("Ignored {} sales with unknown stock ids.", self.orphan_sales));
        }
        notes
    }
}

/// Outputs of a `ptrend forecast` run.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub forecast: ForecastResult,
    pub stats: IngestStats,
}

/// Outputs of a `ptrend report` run.
#[derive(Debug, Clone)]
pub struct ReportRun {
    pub report: ProfitReport,
    pub low_stock: Vec<StockItem>,
    pub per_product: Vec<ProductForecast>,
    pub stats: IngestStats,
}

/// Load sales (joining with stock when given) and forecast the daily profit trend.
pub fn run_forecast(config: &ForecastConfig) -> Result<ForecastRun, AppError> {
    let mut stats = IngestStats::default();

    let forecast = match &config.stock_path {
        Some(stock_path) => {
            let lines = load_joined(stock_path, &config.sales_path, config.range, &mut stats)?.1;
            forecast_profit_trend(&lines, config.horizon_days)
        }
        None => {
            let rows = load_sale_rows(&config.sales_path, config.range)?;
            stats.add(&rows);
            forecast_profit_trend(&rows.rows, config.horizon_days)
        }
    };

    info!(
        status = ?forecast.status,
        days = forecast.daily_points.len(),
        horizon = config.horizon_days,
        "forecast complete"
    );

    Ok(ForecastRun { forecast, stats })
}

/// Load stock and sales, build the profit report, and optionally per-product trends.
pub fn run_report(config: &ReportConfig) -> Result<ReportRun, AppError> {
    let mut stats = IngestStats::default();
    let (stock, lines) =
        load_joined(&config.stock_path, &config.sales_path, config.range, &mut stats)?;

    let report = build_profit_report(&stock, &lines, config.horizon_days);
    let low_stock = low_stock_items(&stock).into_iter().cloned().collect();
    let per_product = if config.per_product {
        forecast_by_product(&lines, config.horizon_days)
    } else {
        Vec::new()
    };

    info!(
        products = report.products.len(),
        sales = lines.len(),
        "report complete"
    );

    Ok(ReportRun {
        report,
        low_stock,
        per_product,
        stats,
    })
}

/// Outputs of a `ptrend sell` run.
#[derive(Debug, Clone)]
pub struct SellOutcome {
    pub sale: SaleEntry,
    /// The item after its quantity was reduced.
    pub item: StockItem,
}

/// Load the stock CSV and keep the items matching `filter`.
pub fn list_stock(stock_path: &Path, filter: &StockFilter) -> Result<Vec<StockItem>, AppError> {
    let stock = load_stock_items(stock_path)?;
    Ok(filter_stock(&stock.rows, filter).into_iter().cloned().collect())
}

/// Sell `quantity` of item `stock_id`: append the sale, then rewrite the stock CSV.
///
/// Refuses to run when the stock CSV has malformed rows, since rewriting it
/// would drop them.
pub fn run_sell(
    stock_path: &Path,
    sales_path: &Path,
    stock_id: i64,
    quantity: f64,
    sold_at: NaiveDateTime,
) -> Result<SellOutcome, AppError> {
    let mut stock = load_stock_items(stock_path)?;
    if let Some(bad) = stock.row_errors.first() {
        return Err(AppError::input(format!(
            "Stock CSV has {} malformed row(s) (first at line {}: {}); fix them before selling.",
            stock.row_errors.len(),
            bad.line,
            bad.message
        )));
    }

    let existing = if sales_path.exists() {
        load_sale_entries(sales_path, DateRange::default())?.rows
    } else {
        Vec::new()
    };

    let sale = apply_sale(&mut stock.rows, &existing, stock_id, quantity, sold_at)?;
    append_sale_entry(sales_path, &sale)?;
    write_stock_csv(stock_path, &stock.rows)?;

    let item = stock
        .rows
        .into_iter()
        .find(|item| item.id == stock_id)
        .ok_or_else(|| AppError::io(format!("Item {stock_id} vanished after the sale.")))?;

    info!(sale_id = sale.id, stock_id, quantity, remaining = item.quantity, "sale recorded");
    Ok(SellOutcome { sale, item })
}

/// Load stock and sales and join them on `stock_id`.
pub fn load_joined(
    stock_path: &Path,
    sales_path: &Path,
    range: DateRange,
    stats: &mut IngestStats,
) -> Result<(Vec<StockItem>, Vec<SaleLine>), AppError> {
    let stock = load_stock_items(stock_path)?;
    let sales = load_sale_entries(sales_path, range)?;
    stats.add(&stock);
    stats.add(&sales);

    let lines = join_sales(&stock.rows, &sales.rows);
    stats.orphan_sales = sales.rows.len() - lines.len();

    Ok((stock.rows, lines))
}
