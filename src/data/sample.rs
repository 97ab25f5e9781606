//! Synthetic sales history for demos and tests.
//!
//! Each day's profit is `base + drift * day + noise * N(0, 1)`, split evenly
//! across `sales_per_day` sales placed at random times during opening hours.

use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveTime};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::SaleRow;
use crate::error::AppError;
use crate::math::round_dp;

const OPENING_HOUR: u32 = 8;
const CLOSING_HOUR: u32 = 20;

/// About a century of history.
pub const MAX_SAMPLE_DAYS: u32 = 36_500;
pub const MAX_SALES_PER_DAY: u32 = 1_000;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    /// Number of consecutive days, ending at `end`.
    pub days: u32,
    pub end: NaiveDate,
    pub seed: u64,
    /// Expected daily profit on the first day.
    pub base: f64,
    /// Change in expected daily profit per day.
    pub drift: f64,
    /// Standard deviation of the daily noise.
    pub noise: f64,
    pub sales_per_day: u32,
}

/// Generate sales rows, oldest first. Same config and seed give the same rows.
pub fn generate_sample(config: &SampleConfig) -> Result<Vec<SaleRow>, AppError> {
    if !(1..=MAX_SAMPLE_DAYS).contains(&config.days) {
        return Err(AppError::input(format!(
            "Sample days must be between 1 and {MAX_SAMPLE_DAYS}."
        )));
    }
    if !(1..=MAX_SALES_PER_DAY).contains(&config.sales_per_day) {
        return Err(AppError::input(format!(
            "Sales per day must be between 1 and {MAX_SALES_PER_DAY}."
        )));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::input("Noise must be a finite, non-negative number."));
    }
    if !(config.base.is_finite() && config.drift.is_finite()) {
        return Err(AppError::input("Base and drift must be finite."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::io(format!("Noise distribution error: {e}")))?;

    let first_day = config
        .end
        .checked_sub_signed(Duration::days(i64::from(config.days) - 1))
        .ok_or_else(|| {
            AppError::input(format!(
                "{} days ending {} is outside the calendar.",
                config.days, config.end
            ))
        })?;
    let per_day = config.sales_per_day as usize;
    let mut rows = Vec::with_capacity(config.days as usize * per_day);

    for i in 0..config.days {
        let day = first_day + Duration::days(i64::from(i));
        let shock: f64 = normal.sample(&mut rng);
        let daily = config.base + config.drift * f64::from(i) + config.noise * shock;
        let share = round_dp(daily / f64::from(config.sales_per_day), 2);

        let mut times: Vec<NaiveTime> = (0..per_day)
            .filter_map(|_| {
                let secs = rng.gen_range(OPENING_HOUR * 3600..CLOSING_HOUR * 3600);
                NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
            })
            .collect();
        times.sort();

        for t in times {
            let stamp = day.and_time(t).format("%Y-%m-%d %H:%M:%S").to_string();
            rows.push(SaleRow::new(stamp, Some(share)));
        }
    }

    Ok(rows)
}

/// Write rows as a `sale_date,profit` CSV, readable by the `forecast` command.
pub fn write_sample_csv(path: &Path, rows: &[SaleRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::io(format!("Failed to create sample CSV '{}': {e}", path.display()))
    })?;

    writer
        .write_record(["sale_date", "profit"])
        .map_err(|e| AppError::io(format!("Failed to write sample CSV header: {e}")))?;

    for row in rows {
        let profit = row.profit.map(|p| format!("{p:.2}")).unwrap_or_default();
        writer
            .write_record([row.sale_date.as_str(), profit.as_str()])
            .map_err(|e| AppError::io(format!("Failed to write sample CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush sample CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateRange, TrendLabel};
    use crate::forecast::forecast_profit_trend;
    use crate::io::ingest::load_sale_rows;

    fn config() -> SampleConfig {
        SampleConfig {
            days: 30,
            end: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            seed: 7,
            base: 100.0,
            drift: 2.0,
            noise: 5.0,
            sales_per_day: 3,
        }
    }

    #[test]
    fn same_seed_same_rows() {
        let a = generate_sample(&config()).unwrap();
        let b = generate_sample(&config()).unwrap();
        assert_eq!(a, b);

        let c = generate_sample(&SampleConfig { seed: 8, ..config() }).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn row_count_and_date_span() {
        let rows = generate_sample(&config()).unwrap();
        assert_eq!(rows.len(), 90);
        assert!(rows[0].sale_date.starts_with("2024-06-01 "));
        assert!(rows[89].sale_date.starts_with("2024-06-30 "));
    }

    #[test]
    fn noiseless_drift_trends_upward() {
        let rows = generate_sample(&SampleConfig { noise: 0.0, ..config() }).unwrap();
        let forecast = forecast_profit_trend(&rows, 7);
        let trend = forecast.trend.unwrap();
        assert_eq!(trend.trend_label, TrendLabel::Upward);
        assert_eq!(forecast.daily_points.len(), 30);
    }

    #[test]
    fn rejects_bad_settings() {
        assert!(generate_sample(&SampleConfig { days: 0, ..config() }).is_err());
        assert!(generate_sample(&SampleConfig { sales_per_day: 0, ..config() }).is_err());
        assert!(
            generate_sample(&SampleConfig {
                sales_per_day: MAX_SALES_PER_DAY + 1,
                ..config()
            })
            .is_err()
        );
        assert!(generate_sample(&SampleConfig { noise: -1.0, ..config() }).is_err());
        let err = generate_sample(&SampleConfig { noise: f64::NAN, ..config() }).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn oversized_history_is_an_input_error() {
        let err = generate_sample(&SampleConfig {
            days: u32::MAX,
            ..config()
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = generate_sample(&SampleConfig {
            days: MAX_SAMPLE_DAYS,
            end: NaiveDate::MIN,
            ..config()
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn written_csv_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv");
        let rows = generate_sample(&SampleConfig { days: 3, ..config() }).unwrap();

        write_sample_csv(&path, &rows).unwrap();
        let loaded = load_sale_rows(&path, DateRange::default()).unwrap();
        assert_eq!(loaded.rows, rows);
    }
}
