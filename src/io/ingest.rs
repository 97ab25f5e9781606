//! CSV ingest for the inventory exports.
//!
//! Three shapes are accepted:
//! - a `stock` table export (`load_stock_items`)
//! - a raw `sales` table export (`load_sale_entries`), joined later with `join_sales`
//! - a pre-joined sales file with `sale_date` and `profit` (`load_sale_rows`)
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **No forecasting logic here**: unparseable sale dates are passed through
//!   and left for the forecaster to skip

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{DateRange, SaleDate, SaleEntry, SaleLine, SaleRow, StockItem};
use crate::error::AppError;
use crate::forecast::sale_day;

type HeaderMap = HashMap<String, usize>;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed rows plus what went wrong along the way.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub rows: Vec<T>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Rows that parsed but fell outside the requested date range.
    pub rows_filtered: usize,
}

impl<T> Ingested<T> {
    pub fn rows_used(&self) -> usize {
        self.rows.len()
    }
}

/// How a pre-joined sales file carries profit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProfitSource {
    /// A `profit` column (empty cells are null).
    Column,
    /// `(selling_price - cost_price) * quantity_sold`.
    Computed,
}

/// Load a pre-joined sales file (`sale_date` plus `profit`, or the three
/// columns profit is derived from).
pub fn load_sale_rows(path: &Path, range: DateRange) -> Result<Ingested<SaleRow>, AppError> {
    read_rows(path, "sales", |headers| {
        require_columns(headers, &["sale_date"], "sales")?;
        let source = if headers.contains_key("profit") {
            ProfitSource::Column
        } else if ["quantity_sold", "selling_price", "cost_price"]
            .iter()
            .all(|c| headers.contains_key(*c))
        {
            ProfitSource::Computed
        } else {
            return Err(AppError::input(
                "Sales CSV needs a `profit` column, or `quantity_sold`, `selling_price` \
                 and `cost_price`.",
            ));
        };

        Ok(move |record: &StringRecord, headers: &HeaderMap| -> Result<Option<SaleRow>, String> {
            let sale_date =
                get_optional(record, headers, "sale_date").unwrap_or_default().to_string();
            if !within_range(&range, &sale_date) {
                return Ok(None);
            }

            let profit = match source {
                ProfitSource::Column => parse_opt_f64(record, headers, "profit")?,
                ProfitSource::Computed => {
                    let qty = parse_required_f64(record, headers, "quantity_sold")?;
                    let sell = parse_required_f64(record, headers, "selling_price")?;
                    let cost = parse_required_f64(record, headers, "cost_price")?;
                    Some((sell - cost) * qty)
                }
            };

            Ok(Some(SaleRow { sale_date, profit }))
        })
    })
}

/// Load a `stock` table export.
pub fn load_stock_items(path: &Path) -> Result<Ingested<StockItem>, AppError> {
    read_rows(path, "stock", |headers| {
        require_columns(
            headers,
            &["id", "name", "unit", "quantity", "cost_price", "selling_price"],
            "stock",
        )?;

        Ok(|record: &StringRecord, headers: &HeaderMap| -> Result<Option<StockItem>, String> {
            Ok(Some(StockItem {
                id: parse_required_i64(record, headers, "id")?,
                name: get_required(record, headers, "name")?.to_string(),
                unit: get_required(record, headers, "unit")?.to_string(),
                quantity: parse_required_f64(record, headers, "quantity")?,
                cost_price: parse_required_f64(record, headers, "cost_price")?,
                selling_price: parse_required_f64(record, headers, "selling_price")?,
                low_stock_threshold: parse_opt_f64(record, headers, "low_stock_threshold")?,
            }))
        })
    })
}

/// Load a raw `sales` table export, keeping only rows inside `range`.
pub fn load_sale_entries(path: &Path, range: DateRange) -> Result<Ingested<SaleEntry>, AppError> {
    read_rows(path, "sales", |headers| {
        require_columns(headers, &["id", "stock_id", "quantity_sold", "sale_date"], "sales")?;

        Ok(move |record: &StringRecord, headers: &HeaderMap| -> Result<Option<SaleEntry>, String> {
            let sale_date =
                get_optional(record, headers, "sale_date").unwrap_or_default().to_string();
            if !within_range(&range, &sale_date) {
                return Ok(None);
            }
            Ok(Some(SaleEntry {
                id: parse_required_i64(record, headers, "id")?,
                stock_id: parse_required_i64(record, headers, "stock_id")?,
                quantity_sold: parse_required_f64(record, headers, "quantity_sold")?,
                sale_date,
            }))
        })
    })
}

/// Inner join of sales with their stock items.
///
/// Sales pointing at a missing stock id are dropped.
pub fn join_sales(stock: &[StockItem], sales: &[SaleEntry]) -> Vec<SaleLine> {
    let by_id: HashMap<i64, &StockItem> = stock.iter().map(|item| (item.id, item)).collect();

    let mut orphans = 0usize;
    let lines: Vec<SaleLine> = sales
        .iter()
        .filter_map(|sale| {
            let Some(item) = by_id.get(&sale.stock_id) else {
                orphans += 1;
                return None;
            };
            Some(SaleLine {
                sale_id: sale.id,
                stock_id: sale.stock_id,
                product_name: item.name.clone(),
                quantity_sold: sale.quantity_sold,
                sale_date: sale.sale_date.clone(),
                revenue: sale.quantity_sold * item.selling_price,
                profit: sale.quantity_sold * item.profit_per_unit(),
            })
        })
        .collect();

    if orphans > 0 {
        tracing::warn!(orphans, "sales reference unknown stock ids; dropped from join");
    }
    lines
}

/// Whether a raw sale date falls inside `range`.
///
/// An unbounded range admits everything (including unparseable dates). A
/// bounded range admits only dates it can place on the calendar.
pub fn within_range(range: &DateRange, sale_date: &str) -> bool {
    if !range.is_bounded() {
        return true;
    }
    sale_day(SaleDate::Text(sale_date)).is_some_and(|day| range.contains(day))
}

/// Shared CSV loop: open, resolve headers, hand each record to a row parser.
///
/// `prepare` validates the header set and returns the row parser. A parser
/// returns `Ok(None)` for rows that are valid but filtered out.
fn read_rows<T, P, F>(path: &Path, what: &str, prepare: P) -> Result<Ingested<T>, AppError>
where
    P: FnOnce(&HeaderMap) -> Result<F, AppError>,
    F: Fn(&StringRecord, &HeaderMap) -> Result<Option<T>, String>,
{
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open {what} CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read {what} CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let parse_row = prepare(&header_map)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_filtered = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let outcome = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map));

        match outcome {
            Ok(Some(row)) => rows.push(row),
            Ok(None) => rows_filtered += 1,
            Err(message) => {
                tracing::warn!(file = %path.display(), line, %message, "skipping {what} row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    tracing::info!(
        file = %path.display(),
        rows_read,
        rows_used = rows.len(),
        rows_filtered,
        row_errors = row_errors.len(),
        "loaded {what} CSV"
    );

    Ok(Ingested {
        rows,
        row_errors,
        rows_read,
        rows_filtered,
    })
}

fn build_header_map(headers: &StringRecord) -> HeaderMap {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn require_columns(headers: &HeaderMap, columns: &[&str], what: &str) -> Result<(), AppError> {
    for column in columns {
        if !headers.contains_key(*column) {
            return Err(AppError::input(format!(
                "Missing required column in {what} CSV: `{column}`"
            )));
        }
    }
    Ok(())
}

fn get_required<'a>(
    record: &'a StringRecord,
    headers: &HeaderMap,
    name: &str,
) -> Result<&'a str, String> {
    get_optional(record, headers, name).ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, headers: &HeaderMap, name: &str) -> Option<&'a str> {
    let idx = headers.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_required_f64(
    record: &StringRecord,
    headers: &HeaderMap,
    name: &str,
) -> Result<f64, String> {
    parse_opt_f64(record, headers, name)?.ok_or_else(|| format!("Missing required value: `{name}`"))
}

/// Empty cell -> `None`; present but not a finite number -> error.
fn parse_opt_f64(
    record: &StringRecord,
    headers: &HeaderMap,
    name: &str,
) -> Result<Option<f64>, String> {
    let Some(raw) = get_optional(record, headers, name) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("Invalid number for `{name}`: '{raw}'")),
    }
}

fn parse_required_i64(
    record: &StringRecord,
    headers: &HeaderMap,
    name: &str,
) -> Result<i64, String> {
    let raw = get_required(record, headers, name)?;
    raw.parse::<i64>()
        .map_err(|_| format!("Invalid integer for `{name}`: '{raw}'"))
}
