//! Formatted terminal output for forecasts and the profit report.
//!
//! We keep formatting code in one place so:
//! - the math/forecasting code stays clean and testable
//! - output changes are localized (and covered by snapshot tests)

use crate::domain::{ForecastResult, ProductForecast, SaleLine, StockItem};
use crate::report::ProfitReport;

/// Format a forecast: status, trend, model, and the insight sentence.
pub fn format_forecast_summary(forecast: &ForecastResult) -> String {
    let mut out = String::new();

    out.push_str("=== ptrend - profit trend forecast ===\n");
    let Some(trend) = &forecast.trend else {
        out.push_str("Status: insufficient data\n");
        out.push_str(&format!("{}\n", forecast.insight));
        return out;
    };

    out.push_str("Status: ok\n");
    let points = &forecast.daily_points;
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        out.push_str(&format!(
            "History: {} days with sales | {} .. {}\n",
            forecast.daily_points.len(),
            first.date,
            last.date
        ));
    }
    out.push_str(&format!(
        "Trend: {} (strength {:.2})\n",
        trend.trend_label, trend.trend_strength
    ));
    out.push_str(&format!(
        "Model: slope={:.4}/day intercept={:.4} n={}\n",
        trend.model_details.slope,
        trend.model_details.intercept,
        trend.model_details.training_points
    ));
    out.push_str(&format!(
        "Projected profit (+{}d): {:.2}\n",
        trend.horizon_days, trend.projected_profit
    ));
    out.push('\n');
    out.push_str(&forecast.insight);
    out.push('\n');

    out
}

/// Format the per-product report table and its summary block.
pub fn format_profit_report(report: &ProfitReport) -> String {
    let mut out = String::new();

    out.push_str(
        format!(
            "{:<24} {:>10} {:<6} {:>10} {:>10} {:>10} {:>12}  {}\n",
            "product", "sold", "unit", "cost", "price", "unit_pft", "total_pft", "badges"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<24} {:-<10} {:-<6} {:-<10} {:-<10} {:-<10} {:-<12}  {:-<6}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for p in &report.products {
        let badges: Vec<&str> = p.badges.iter().map(|b| b.label()).collect();
        out.push_str(
            format!(
                "{:<24} {:>10.2} {:<6} {:>10.2} {:>10.2} {:>10.2} {:>12.2}  {}\n",
                truncate(&p.name, 24),
                p.quantity_sold,
                truncate(&p.unit, 6),
                p.cost_price,
                p.selling_price,
                p.profit_per_unit,
                p.total_profit,
                badges.join(", "),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    let s = &report.summary;
    out.push('\n');
    out.push_str(&format!("Total profit: {:.2}\n", s.total_profit));
    out.push_str(&format!("Units sold: {:.2}\n", s.total_units_sold));
    out.push_str(&format!(
        "Products: {} ({} low on stock)\n",
        s.product_count, s.low_stock_count
    ));
    match s.projected_profit {
        Some(p) => out.push_str(&format!("Projected daily profit: {p:.2}\n")),
        None => out.push_str("Projected daily profit: n/a\n"),
    }

    out
}

/// Format one line per product forecast.
pub fn format_product_forecasts(forecasts: &[ProductForecast]) -> String {
    let mut out = String::new();
    out.push_str("Per-product trends:\n");
    out.push_str(
        format!(
            "{:<24} {:>6} {:<10} {:>8} {:>12}\n",
            "product", "days", "trend", "strength", "projected"
        )
        .trim_end(),
    );
    out.push('\n');

    for pf in forecasts {
        let days = pf.forecast.daily_points.len();
        let line = match &pf.forecast.trend {
            Some(t) => format!(
                "{:<24} {:>6} {:<10} {:>8.2} {:>12.2}\n",
                truncate(&pf.product_name, 24),
                days,
                t.trend_label.as_str(),
                t.trend_strength,
                t.projected_profit
            ),
            None => format!(
                "{:<24} {:>6} {:<10}\n",
                truncate(&pf.product_name, 24),
                days,
                "n/a"
            ),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Format items at or below their reorder threshold.
pub fn format_low_stock(items: &[&StockItem]) -> String {
    if items.is_empty() {
        return "Low stock: none\n".to_string();
    }

    let mut out = String::from("Low stock:\n");
    for item in items {
        let threshold = item.low_stock_threshold.unwrap_or_default();
        out.push_str(&format!(
            "- {} {:.2} {} (threshold {:.2})\n",
            item.name, item.quantity, item.unit, threshold
        ));
    }
    out
}

/// Format a stock listing.
pub fn format_stock_table(items: &[StockItem]) -> String {
    if items.is_empty() {
        return "No stock items match.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(
        format!(
            "{:>5} {:<24} {:<6} {:>10} {:>10} {:>10} {:>10}\n",
            "id", "name", "unit", "quantity", "cost", "price", "reorder"
        )
        .trim_end(),
    );
    out.push('\n');

    for item in items {
        let reorder = item
            .low_stock_threshold
            .map(|t| format!("{t:.2}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(
            format!(
                "{:>5} {:<24} {:<6} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
                item.id,
                truncate(&item.name, 24),
                truncate(&item.unit, 6),
                item.quantity,
                item.cost_price,
                item.selling_price,
                reorder,
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Format joined sales (newest first, as ordered by `sales_history`).
pub fn format_sales_history(lines: &[&SaleLine]) -> String {
    if lines.is_empty() {
        return "No sales recorded.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(
        format!(
            "{:>6} {:<24} {:>10} {:>12} {:>12}  {}\n",
            "sale", "product", "qty", "revenue", "profit", "date"
        )
        .trim_end(),
    );
    out.push('\n');

    for line in lines {
        out.push_str(
            format!(
                "{:>6} {:<24} {:>10.2} {:>12.2} {:>12.2}  {}\n",
                line.sale_id,
                truncate(&line.product_name, 24),
                line.quantity_sold,
                line.revenue,
                line.profit,
                line.sale_date,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    let revenue: f64 = lines.iter().map(|l| l.revenue).sum();
    let profit: f64 = lines.iter().map(|l| l.profit).sum();
    out.push_str(&format!(
        "{} sales | revenue {revenue:.2} | profit {profit:.2}\n",
        lines.len()
    ));
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SaleRow;
    use crate::forecast::forecast_profit_trend;

    #[test]
    fn forecast_summary_ok() {
        let rows = vec![
            SaleRow::new("2024-01-01", Some(150.0)),
            SaleRow::new("2024-01-02", Some(200.0)),
        ];
        let txt = format_forecast_summary(&forecast_profit_trend(&rows, 7));

        assert!(txt.contains("History: 2 days with sales | 2024-01-01 .. 2024-01-02\n"));
        assert!(txt.contains("Trend: upward (strength 1.00)\n"));
        assert!(txt.contains("Model: slope=50.0000/day intercept=150.0000 n=2\n"));
        assert!(txt.contains("Projected profit (+7d): 550.00\n"));
    }

    #[test]
    fn forecast_summary_insufficient() {
        let txt = format_forecast_summary(&forecast_profit_trend(Vec::<SaleRow>::new(), 7));
        assert!(txt.contains("Status: insufficient data\n"));
        assert!(!txt.contains("Trend:"));
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("Basmati rice", 8), "Basmati.");
        assert_eq!(truncate("Rice", 8), "Rice");
    }

    #[test]
    fn sales_history_shows_revenue_and_profit() {
        let line = SaleLine {
            sale_id: 12,
            stock_id: 1,
            product_name: "Oil".to_string(),
            quantity_sold: 3.0,
            sale_date: "2024-02-01 10:00:00".to_string(),
            revenue: 7.5,
            profit: 2.25,
        };
        let txt = format_sales_history(&[&line]);
        let rows: Vec<&str> = txt.lines().collect();
        assert_eq!(
            rows[1],
            concat!(
                "    12 Oil                            3.00",
                "         7.50         2.25  2024-02-01 10:00:00"
            )
        );
        assert_eq!(rows[2], "1 sales | revenue 7.50 | profit 2.25");
        assert_eq!(format_sales_history(&[]), "No sales recorded.\n");
    }

    #[test]
    fn stock_table_marks_missing_threshold() {
        let item = StockItem {
            id: 3,
            name: "Tea".to_string(),
            unit: "box".to_string(),
            quantity: 9.0,
            cost_price: 1.0,
            selling_price: 1.75,
            low_stock_threshold: None,
        };
        let txt = format_stock_table(&[item]);
        assert!(txt.lines().nth(1).unwrap().ends_with(" 1.75          -"));
        assert_eq!(format_stock_table(&[]), "No stock items match.\n");
    }

    #[test]
    fn low_stock_lines() {
        let item = StockItem {
            id: 1,
            name: "Oil".to_string(),
            unit: "l".to_string(),
            quantity: 2.0,
            cost_price: 1.0,
            selling_price: 2.0,
            low_stock_threshold: Some(5.0),
        };
        assert_eq!(format_low_stock(&[&item]), "Low stock:\n- Oil 2.00 l (threshold 5.00)\n");
        assert_eq!(format_low_stock(&[]), "Low stock: none\n");
    }
}
