//! Profit report: per-product totals, badges, summary, and the trend forecast.
//!
//! Formatting lives in `format` so output changes stay localized.

use serde::Serialize;

use crate::domain::{ForecastResult, SaleDate, SaleLine, StockItem};
use crate::forecast::{forecast_profit_trend, parse_sale_date};
use crate::math::round_dp;

pub mod format;

pub use format::*;

/// Highlight attached to a product row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Badge {
    LowStock,
    TopEarner,
    BiggestLoss,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::LowStock => "Low Stock",
            Badge::TopEarner => "Top Earner",
            Badge::BiggestLoss => "Biggest Loss",
        }
    }
}

/// One product's line in the report. Money values are rounded to 2dp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductProfit {
    pub stock_id: i64,
    pub name: String,
    pub unit: String,
    pub quantity_sold: f64,
    pub cost_price: f64,
    pub selling_price: f64,
    pub profit_per_unit: f64,
    pub total_profit: f64,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_profit: f64,
    pub total_units_sold: f64,
    pub product_count: usize,
    pub low_stock_count: usize,
    /// Only present when the forecast could fit a trend.
    pub projected_profit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitReport {
    /// Highest total profit first.
    pub products: Vec<ProductProfit>,
    pub summary: ReportSummary,
    pub forecast: ForecastResult,
}

/// Build the profit report.
///
/// Every stock item appears, including ones with no sales in `lines`.
/// `lines` should already be restricted to the reporting window.
pub fn build_profit_report(
    stock: &[StockItem],
    lines: &[SaleLine],
    horizon_days: u32,
) -> ProfitReport {
    let mut rows: Vec<(f64, ProductProfit)> = stock
        .iter()
        .map(|item| {
            let (sold, profit) = lines
                .iter()
                .filter(|l| l.stock_id == item.id)
                .fold((0.0, 0.0), |(q, p), l| (q + l.quantity_sold, p + l.profit));

            let mut badges = Vec::new();
            if item.is_low_stock() {
                badges.push(Badge::LowStock);
            }

            let row = ProductProfit {
                stock_id: item.id,
                name: item.name.clone(),
                unit: item.unit.clone(),
                quantity_sold: sold,
                cost_price: round_dp(item.cost_price, 2),
                selling_price: round_dp(item.selling_price, 2),
                profit_per_unit: round_dp(item.profit_per_unit(), 2),
                total_profit: round_dp(profit, 2),
                badges,
            };
            (profit, row)
        })
        .collect();

    rows.sort_by(|(a, ra), (b, rb)| b.total_cmp(a).then(ra.stock_id.cmp(&rb.stock_id)));
    let mut products: Vec<ProductProfit> = rows.into_iter().map(|(_, row)| row).collect();

    assign_rank_badges(&mut products);

    let low_stock_count = stock.iter().filter(|item| item.is_low_stock()).count();
    let total_profit = round_dp(products.iter().map(|p| p.total_profit).sum(), 2);
    let total_units_sold = round_dp(products.iter().map(|p| p.quantity_sold).sum(), 2);

    let forecast = forecast_profit_trend(lines, horizon_days);

    ProfitReport {
        summary: ReportSummary {
            total_profit,
            total_units_sold,
            product_count: products.len(),
            low_stock_count,
            projected_profit: forecast.projected_profit(),
        },
        products,
        forecast,
    }
}

/// `Top Earner` on the first highest total (if positive), `Biggest Loss` on
/// the first lowest total (if negative). `products` must be sorted descending.
fn assign_rank_badges(products: &mut [ProductProfit]) {
    let Some(top) = products.first_mut() else {
        return;
    };
    if top.total_profit > 0.0 {
        top.badges.push(Badge::TopEarner);
    }

    let min = products
        .iter()
        .map(|p| p.total_profit)
        .fold(f64::INFINITY, f64::min);
    if min < 0.0 {
        if let Some(loss) = products.iter_mut().find(|p| p.total_profit == min) {
            loss.badges.push(Badge::BiggestLoss);
        }
    }
}

/// Items at or below their reorder threshold, lowest quantity first.
pub fn low_stock_items(stock: &[StockItem]) -> Vec<&StockItem> {
    let mut items: Vec<&StockItem> = stock.iter().filter(|item| item.is_low_stock()).collect();
    items.sort_by(|a, b| a.quantity.total_cmp(&b.quantity));
    items
}

/// Joined sales, newest first. Lines with unparseable dates go last.
pub fn sales_history(lines: &[SaleLine]) -> Vec<&SaleLine> {
    let mut sorted: Vec<&SaleLine> = lines.iter().collect();
    sorted.sort_by(|a, b| {
        let da = parse_sale_date(SaleDate::Text(&a.sale_date));
        let db = parse_sale_date(SaleDate::Text(&b.sale_date));
        db.cmp(&da).then_with(|| b.sale_id.cmp(&a.sale_id))
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ForecastStatus;

    fn item(
        id: i64,
        name: &str,
        quantity: f64,
        cost: f64,
        sell: f64,
        threshold: Option<f64>,
    ) -> StockItem {
        StockItem {
            id,
            name: name.to_string(),
            unit: "pc".to_string(),
            quantity,
            cost_price: cost,
            selling_price: sell,
            low_stock_threshold: threshold,
        }
    }

    fn line(sale_id: i64, stock: &StockItem, qty: f64, date: &str) -> SaleLine {
        SaleLine {
            sale_id,
            stock_id: stock.id,
            product_name: stock.name.clone(),
            quantity_sold: qty,
            sale_date: date.to_string(),
            revenue: qty * stock.selling_price,
            profit: qty * stock.profit_per_unit(),
        }
    }

    #[test]
    fn report_totals_badges_and_forecast() {
        let soap = item(1, "Soap", 2.0, 1.0, 3.0, Some(5.0));
        let milk = item(2, "Milk", 50.0, 2.0, 1.5, Some(10.0));
        let pens = item(3, "Pens", 20.0, 0.5, 1.0, None);
        let stock = vec![soap.clone(), milk.clone(), pens.clone()];
        let lines = vec![
            line(1, &soap, 10.0, "2024-03-01 09:00:00"),
            line(2, &milk, 4.0, "2024-03-01 10:00:00"),
            line(3, &soap, 5.0, "2024-03-02 12:00:00"),
        ];

        let report = build_profit_report(&stock, &lines, 7);
        let names: Vec<&str> = report.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Soap", "Pens", "Milk"]);

        assert_eq!(report.products[0].total_profit, 30.0);
        assert_eq!(report.products[0].quantity_sold, 15.0);
        assert_eq!(report.products[0].badges, vec![Badge::LowStock, Badge::TopEarner]);
        assert!(report.products[1].badges.is_empty());
        assert_eq!(report.products[2].total_profit, -2.0);
        assert_eq!(report.products[2].badges, vec![Badge::BiggestLoss]);

        assert_eq!(report.summary.total_profit, 28.0);
        assert_eq!(report.summary.total_units_sold, 19.0);
        assert_eq!(report.summary.product_count, 3);
        assert_eq!(report.summary.low_stock_count, 1);

        // Day totals 18 then 10: a falling two-point line.
        assert_eq!(report.forecast.status, ForecastStatus::Ok);
        assert_eq!(report.summary.projected_profit, Some(-46.0));
    }

    #[test]
    fn no_top_earner_when_nothing_is_profitable() {
        let stock = vec![item(1, "A", 1.0, 1.0, 1.0, None)];
        let report = build_profit_report(&stock, &[], 7);
        assert!(report.products[0].badges.is_empty());
        assert_eq!(report.summary.projected_profit, None);
        assert_eq!(report.forecast.status, ForecastStatus::InsufficientData);
    }

    #[test]
    fn low_stock_sorted_by_quantity() {
        let stock = vec![
            item(1, "A", 4.0, 1.0, 2.0, Some(5.0)),
            item(2, "B", 1.0, 1.0, 2.0, Some(5.0)),
            item(3, "C", 9.0, 1.0, 2.0, Some(5.0)),
            item(4, "D", 0.0, 1.0, 2.0, None),
        ];
        let ids: Vec<i64> = low_stock_items(&stock).iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn history_is_newest_first() {
        let a = item(1, "A", 1.0, 1.0, 2.0, None);
        let lines = vec![
            line(1, &a, 1.0, "2024-01-02"),
            line(2, &a, 1.0, "garbage"),
            line(3, &a, 1.0, "2024-01-05 08:00:00"),
            line(4, &a, 1.0, "2024-01-05T07:00:00"),
        ];
        let ids: Vec<i64> = sales_history(&lines).iter().map(|l| l.sale_id).collect();
        assert_eq!(ids, vec![3, 4, 1, 2]);
    }
}
