//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by CSV ingest
//! - consumed by the forecaster and the profit report
//! - exported to JSON/CSV

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Horizon used when neither the CLI nor the environment supplies one.
pub const DEFAULT_HORIZON_DAYS: u32 = 7;

/// A sale timestamp as handed to the forecaster.
///
/// Text is parsed leniently (see `forecast::parse_sale_date`); native values
/// are taken as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleDate<'a> {
    Text(&'a str),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

/// A row the forecaster can read: something with a sale date and a profit.
///
/// Storage rows are adapted to this explicitly; the forecaster never guesses
/// how to read a field.
pub trait SaleRecord {
    /// `None` means the row has no date at all (it will be skipped).
    fn sale_date(&self) -> Option<SaleDate<'_>>;

    /// Realized profit. `None` (null) counts as `0.0` during aggregation.
    fn profit(&self) -> Option<f64>;
}

impl<T: SaleRecord + ?Sized> SaleRecord for &T {
    fn sale_date(&self) -> Option<SaleDate<'_>> {
        (**self).sale_date()
    }

    fn profit(&self) -> Option<f64> {
        (**self).profit()
    }
}

impl SaleRecord for (NaiveDateTime, Option<f64>) {
    fn sale_date(&self) -> Option<SaleDate<'_>> {
        Some(SaleDate::DateTime(self.0))
    }

    fn profit(&self) -> Option<f64> {
        self.1
    }
}

impl SaleRecord for (NaiveDate, Option<f64>) {
    fn sale_date(&self) -> Option<SaleDate<'_>> {
        Some(SaleDate::Date(self.0))
    }

    fn profit(&self) -> Option<f64> {
        self.1
    }
}

/// A pre-joined sale row: `sale_date,profit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRow {
    pub sale_date: String,
    pub profit: Option<f64>,
}

impl SaleRow {
    pub fn new(sale_date: impl Into<String>, profit: Option<f64>) -> Self {
        Self {
            sale_date: sale_date.into(),
            profit,
        }
    }
}

impl SaleRecord for SaleRow {
    fn sale_date(&self) -> Option<SaleDate<'_>> {
        Some(SaleDate::Text(&self.sale_date))
    }

    fn profit(&self) -> Option<f64> {
        self.profit
    }
}

/// One row of the `stock` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub quantity: f64,
    pub cost_price: f64,
    pub selling_price: f64,
    #[serde(default)]
    pub low_stock_threshold: Option<f64>,
}

impl StockItem {
    pub fn profit_per_unit(&self) -> f64 {
        self.selling_price - self.cost_price
    }

    /// At or below the reorder threshold. Items without a threshold never are.
    pub fn is_low_stock(&self) -> bool {
        self.low_stock_threshold
            .is_some_and(|threshold| self.quantity <= threshold)
    }
}

/// One row of the `sales` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleEntry {
    pub id: i64,
    pub stock_id: i64,
    pub quantity_sold: f64,
    pub sale_date: String,
}

/// A sale joined with its stock item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleLine {
    pub sale_id: i64,
    pub stock_id: i64,
    pub product_name: String,
    pub quantity_sold: f64,
    pub sale_date: String,
    pub revenue: f64,
    pub profit: f64,
}

impl SaleRecord for SaleLine {
    fn sale_date(&self) -> Option<SaleDate<'_>> {
        Some(SaleDate::Text(&self.sale_date))
    }

    fn profit(&self) -> Option<f64> {
        Some(self.profit)
    }
}

/// Total profit for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyProfitPoint {
    pub date: NaiveDate,
    #[serde(rename = "profit")]
    pub total_profit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastStatus {
    InsufficientData,
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Flat,
    Upward,
    Downward,
}

impl TrendLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendLabel::Flat => "flat",
            TrendLabel::Upward => "upward",
            TrendLabel::Downward => "downward",
        }
    }
}

impl std::fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fitted line parameters (rounded to 4dp) and the number of days fitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelDetails {
    pub slope: f64,
    pub intercept: f64,
    pub training_points: usize,
}

/// The parts of a forecast that only exist when a line could be fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendForecast {
    pub trend_label: TrendLabel,
    pub trend_strength: f64,
    pub projected_profit: f64,
    pub horizon_days: u32,
    pub model_details: ModelDetails,
}

/// Output of `forecast::forecast_profit_trend`.
///
/// Serializes to a flat JSON object; the trend fields are absent (not zero)
/// when `status` is `insufficient_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub status: ForecastStatus,
    pub insight: String,
    pub daily_points: Vec<DailyProfitPoint>,
    #[serde(flatten)]
    pub trend: Option<TrendForecast>,
}

impl ForecastResult {
    pub fn projected_profit(&self) -> Option<f64> {
        self.trend.as_ref().map(|t| t.projected_profit)
    }
}

/// A forecast restricted to one product's sales.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductForecast {
    pub stock_id: i64,
    pub product_name: String,
    pub forecast: ForecastResult,
}

/// Inclusive calendar-day bounds applied to sales before forecasting/reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start.is_none_or(|s| day >= s) && self.end.is_none_or(|e| day <= e)
    }
}

/// A forecast run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags plus `config::Settings`.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Sales CSV: pre-joined (`sale_date,profit`) unless `stock_path` is set,
    /// in which case it is the raw `sales` table.
    pub sales_path: PathBuf,
    pub stock_path: Option<PathBuf>,
    pub range: DateRange,
    pub horizon_days: u32,

    pub json: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_json: Option<PathBuf>,
    pub export_daily: Option<PathBuf>,
}

/// Profit report configuration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub stock_path: PathBuf,
    pub sales_path: PathBuf,
    pub range: DateRange,
    pub horizon_days: u32,
    pub per_product: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}
