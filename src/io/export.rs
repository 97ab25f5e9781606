//! File exports: forecast JSON, daily series CSV, and the sales spreadsheet.
//!
//! The CSV exports are meant to be easy to consume in spreadsheets or
//! downstream scripts.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::domain::{ForecastResult, SaleEntry, SaleLine, StockItem};
use crate::error::AppError;
use crate::math::round_dp;

/// Write the forecast as pretty-printed JSON.
pub fn write_forecast_json(path: &Path, forecast: &ForecastResult) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::io(format!("Failed to create forecast JSON '{}': {e}", path.display()))
    })?;

    serde_json::to_writer_pretty(file, forecast)
        .map_err(|e| AppError::io(format!("Failed to write forecast JSON: {e}")))?;

    Ok(())
}

/// Read a forecast JSON previously written by `write_forecast_json`.
pub fn read_forecast_json(path: &Path) -> Result<ForecastResult, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open forecast JSON '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid forecast JSON: {e}")))
}

/// Write the daily series used for fitting: `date,profit,fitted`.
///
/// `fitted` is the trend line at that day, empty when no line was fitted.
pub fn write_daily_csv(path: &Path, forecast: &ForecastResult) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::io(format!("Failed to create daily CSV '{}': {e}", path.display()))
    })?;

    writer
        .write_record(["date", "profit", "fitted"])
        .map_err(|e| AppError::io(format!("Failed to write daily CSV header: {e}")))?;

    let start = forecast.daily_points.first().map(|p| p.date);
    for point in &forecast.daily_points {
        let fitted = match (&forecast.trend, start) {
            (Some(trend), Some(start)) => {
                let x = (point.date - start).num_days() as f64;
                let y = trend.model_details.slope * x + trend.model_details.intercept;
                format!("{:.2}", round_dp(y, 2))
            }
            _ => String::new(),
        };
        writer
            .write_record([
                point.date.to_string(),
                format!("{:.2}", point.total_profit),
                fitted,
            ])
            .map_err(|e| AppError::io(format!("Failed to write daily CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush daily CSV: {e}")))?;
    Ok(())
}

/// Write joined sales in the spreadsheet layout of the back office's export.
pub fn write_sales_csv(path: &Path, lines: &[SaleLine]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::io(format!("Failed to create sales CSV '{}': {e}", path.display()))
    })?;

    writer
        .write_record(["Sale ID", "Product Name", "Quantity Sold", "Sale Date", "Profit"])
        .map_err(|e| AppError::io(format!("Failed to write sales CSV header: {e}")))?;

    for line in lines {
        writer
            .write_record([
                line.sale_id.to_string(),
                line.product_name.clone(),
                line.quantity_sold.to_string(),
                line.sale_date.clone(),
                line.profit.to_string(),
            ])
            .map_err(|e| AppError::io(format!("Failed to write sales CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush sales CSV: {e}")))?;
    Ok(())
}

/// Rewrite a stock CSV with the standard column set.
pub fn write_stock_csv(path: &Path, items: &[StockItem]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::io(format!("Failed to create stock CSV '{}': {e}", path.display()))
    })?;

    writer
        .write_record([
            "id",
            "name",
            "unit",
            "quantity",
            "cost_price",
            "selling_price",
            "low_stock_threshold",
        ])
        .map_err(|e| AppError::io(format!("Failed to write stock CSV header: {e}")))?;

    for item in items {
        writer
            .write_record([
                item.id.to_string(),
                item.name.clone(),
                item.unit.clone(),
                item.quantity.to_string(),
                item.cost_price.to_string(),
                item.selling_price.to_string(),
                item.low_stock_threshold.map(|t| t.to_string()).unwrap_or_default(),
            ])
            .map_err(|e| AppError::io(format!("Failed to write stock CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush stock CSV: {e}")))?;
    Ok(())
}

/// Append one sale to a sales CSV.
///
/// The row follows the file's existing header order (unknown columns are left
/// empty). A missing or empty file gets `id,stock_id,quantity_sold,sale_date`.
pub fn append_sale_entry(path: &Path, sale: &SaleEntry) -> Result<(), AppError> {
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| AppError::io(format!("Failed to open sales CSV '{}': {e}", path.display())))?;

    let mut existing = String::new();
    file.read_to_string(&mut existing)
        .map_err(|e| AppError::io(format!("Failed to read sales CSV '{}': {e}", path.display())))?;
    file.seek(SeekFrom::End(0))
        .map_err(|e| AppError::io(format!("Failed to seek sales CSV: {e}")))?;

    let headers: Vec<String> = if existing.trim().is_empty() {
        Vec::new()
    } else {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(existing.as_bytes());
        reader
            .headers()
            .map_err(|e| AppError::input(format!("Failed to read sales CSV headers: {e}")))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_ascii_lowercase())
            .collect()
    };

    if !existing.is_empty() && !existing.ends_with('\n') {
        file.write_all(b"\n")
            .map_err(|e| AppError::io(format!("Failed to write sales CSV: {e}")))?;
    }

    let mut writer = csv::Writer::from_writer(file);
    let headers = if headers.is_empty() {
        let defaults = ["id", "stock_id", "quantity_sold", "sale_date"];
        writer
            .write_record(defaults)
            .map_err(|e| AppError::io(format!("Failed to write sales CSV header: {e}")))?;
        defaults.iter().map(|h| h.to_string()).collect()
    } else {
        headers
    };

    let record: Vec<String> = headers
        .iter()
        .map(|h| match h.as_str() {
            "id" => sale.id.to_string(),
            "stock_id" => sale.stock_id.to_string(),
            "quantity_sold" => sale.quantity_sold.to_string(),
            "sale_date" => sale.sale_date.clone(),
            _ => String::new(),
        })
        .collect();
    writer
        .write_record(&record)
        .map_err(|e| AppError::io(format!("Failed to write sales CSV row: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush sales CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SaleRow;
    use crate::forecast::forecast_profit_trend;
    use tempfile::tempdir;

    fn sample_forecast() -> ForecastResult {
        let rows = vec![
            SaleRow::new("2024-01-01", Some(100.0)),
            SaleRow::new("2024-01-01", Some(50.0)),
            SaleRow::new("2024-01-02", Some(200.0)),
        ];
        forecast_profit_trend(&rows, 7)
    }

    #[test]
    fn forecast_json_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("forecast.json");
        let forecast = sample_forecast();

        write_forecast_json(&path, &forecast).unwrap();
        assert_eq!(read_forecast_json(&path).unwrap(), forecast);
    }

    #[test]
    fn daily_csv_includes_fitted_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("daily.csv");

        write_daily_csv(&path, &sample_forecast()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "date,profit,fitted\n2024-01-01,150.00,150.00\n2024-01-02,200.00,200.00\n"
        );
    }

    #[test]
    fn daily_csv_for_insufficient_data_is_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("daily.csv");
        let forecast = forecast_profit_trend(Vec::<SaleRow>::new(), 7);

        write_daily_csv(&path, &forecast).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "date,profit,fitted\n");
    }

    fn sale(id: i64) -> SaleEntry {
        SaleEntry {
            id,
            stock_id: 2,
            quantity_sold: 1.5,
            sale_date: "2024-05-01 12:00:00".to_string(),
        }
    }

    #[test]
    fn append_sale_creates_header_for_new_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sales.csv");

        append_sale_entry(&path, &sale(1)).unwrap();
        append_sale_entry(&path, &sale(2)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "id,stock_id,quantity_sold,sale_date\n\
             1,2,1.5,2024-05-01 12:00:00\n\
             2,2,1.5,2024-05-01 12:00:00\n"
        );
    }

    #[test]
    fn append_sale_follows_existing_column_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        let existing = "sale_date,id,note,stock_id,quantity_sold\n2024-01-01,1,x,2,3";
        std::fs::write(&path, existing).unwrap();

        append_sale_entry(&path, &sale(2)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "sale_date,id,note,stock_id,quantity_sold\n\
             2024-01-01,1,x,2,3\n\
             2024-05-01 12:00:00,2,,2,1.5\n"
        );
    }

    #[test]
    fn stock_csv_loads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stock.csv");
        let items = vec![
            StockItem {
                id: 1,
                name: "Flour, white".to_string(),
                unit: "kg".to_string(),
                quantity: 12.5,
                cost_price: 0.9,
                selling_price: 1.4,
                low_stock_threshold: Some(5.0),
            },
            StockItem {
                id: 2,
                name: "Eggs".to_string(),
                unit: "dozen".to_string(),
                quantity: 4.0,
                cost_price: 2.0,
                selling_price: 3.1,
                low_stock_threshold: None,
            },
        ];

        write_stock_csv(&path, &items).unwrap();
        let loaded = crate::io::ingest::load_stock_items(&path).unwrap();
        assert!(loaded.row_errors.is_empty());
        assert_eq!(loaded.rows, items);
    }

    #[test]
    fn sales_csv_quotes_awkward_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        let lines = vec![SaleLine {
            sale_id: 4,
            stock_id: 1,
            product_name: "Flour, white".to_string(),
            quantity_sold: 2.0,
            sale_date: "2024-01-01 10:00:00".to_string(),
            revenue: 6.0,
            profit: 1.5,
        }];

        write_sales_csv(&path, &lines).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Sale ID,Product Name,Quantity Sold,Sale Date,Profit\n\
             4,\"Flour, white\",2,2024-01-01 10:00:00,1.5\n"
        );
    }
}
