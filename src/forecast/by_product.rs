//! Per-product forecasts.
//!
//! Each product's series is independent, so the fits run in parallel.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::domain::{ProductForecast, SaleLine};
use crate::forecast::trend::forecast_profit_trend;

/// Forecast every product that appears in `lines`, ordered by stock id.
pub fn forecast_by_product(lines: &[SaleLine], horizon_days: u32) -> Vec<ProductForecast> {
    let mut groups: BTreeMap<i64, (&str, Vec<&SaleLine>)> = BTreeMap::new();
    for line in lines {
        groups
            .entry(line.stock_id)
            .or_insert_with(|| (line.product_name.as_str(), Vec::new()))
            .1
            .push(line);
    }

    let groups: Vec<(i64, &str, Vec<&SaleLine>)> = groups
        .into_iter()
        .map(|(id, (name, product_lines))| (id, name, product_lines))
        .collect();

    groups
        .par_iter()
        .map(|(stock_id, name, product_lines)| ProductForecast {
            stock_id: *stock_id,
            product_name: (*name).to_string(),
            forecast: forecast_profit_trend(product_lines.iter().copied(), horizon_days),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastStatus, TrendLabel};

    fn line(sale_id: i64, stock_id: i64, name: &str, date: &str, profit: f64) -> SaleLine {
        SaleLine {
            sale_id,
            stock_id,
            product_name: name.to_string(),
            quantity_sold: 1.0,
            sale_date: date.to_string(),
            revenue: profit,
            profit,
        }
    }

    #[test]
    fn groups_by_product_and_keeps_id_order() {
        let lines = vec![
            line(1, 7, "Rice", "2024-02-01", 10.0),
            line(2, 3, "Beans", "2024-02-01", 40.0),
            line(3, 7, "Rice", "2024-02-02", 20.0),
            line(4, 3, "Beans", "2024-02-02", 30.0),
            line(5, 9, "Salt", "2024-02-02", 5.0),
        ];

        let out = forecast_by_product(&lines, 7);
        let ids: Vec<i64> = out.iter().map(|p| p.stock_id).collect();
        assert_eq!(ids, vec![3, 7, 9]);

        let beans = &out[0].forecast;
        assert_eq!(beans.trend.as_ref().unwrap().trend_label, TrendLabel::Downward);
        let rice = &out[1].forecast;
        assert_eq!(rice.trend.as_ref().unwrap().trend_label, TrendLabel::Upward);
        assert_eq!(out[2].product_name, "Salt");
        assert_eq!(out[2].forecast.status, ForecastStatus::InsufficientData);
    }

    #[test]
    fn empty_input_yields_no_products() {
        assert!(forecast_by_product(&[], 7).is_empty());
    }
}
