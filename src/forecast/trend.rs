//! Linear profit trend: fit daily totals, project `horizon_days` ahead.
//!
//! Daily totals are regressed on the day offset from the first observed day;
//! the fitted line is evaluated `horizon_days` past the last observed day.
//!
//! `trend_strength` is `|slope| / std(y)`, capped at 1.

use crate::domain::{
    DailyProfitPoint, ForecastResult, ForecastStatus, ModelDetails, SaleRecord, TrendForecast,
    TrendLabel,
};
use crate::forecast::aggregate::aggregate_daily_profit;
use crate::math::{LineFit, fit_line, mean, round_dp, std_dev};

/// A line needs two distinct days.
pub const MIN_TRAINING_DAYS: usize = 2;

/// Below this the series is treated as constant.
const FLAT_STD_TOLERANCE: f64 = 1e-8;

/// Keeps the strength ratio finite for near-constant series.
const STRENGTH_EPSILON: f64 = 1e-6;

const INSUFFICIENT_DATA_INSIGHT: &str =
    "At least two days of sales history are needed before a profit trend can be projected.";

/// Forecast profit `horizon_days` beyond the latest sale day.
///
/// Never fails: unusable records are skipped, and sparse history yields
/// `status = insufficient_data`.
pub fn forecast_profit_trend<I>(records: I, horizon_days: u32) -> ForecastResult
where
    I: IntoIterator,
    I::Item: SaleRecord,
{
    let daily = aggregate_daily_profit(records);
    forecast_daily_series(&daily.points(), horizon_days)
}

/// Forecast from an already aggregated series.
///
/// `points` must be ascending with one entry per day (as produced by
/// `DailyProfit::points`).
pub fn forecast_daily_series(points: &[DailyProfitPoint], horizon_days: u32) -> ForecastResult {
    if points.len() < MIN_TRAINING_DAYS {
        return ForecastResult {
            status: ForecastStatus::InsufficientData,
            insight: INSUFFICIENT_DATA_INSIGHT.to_string(),
            daily_points: Vec::new(),
            trend: None,
        };
    }

    let start = points[0].date;
    let x: Vec<f64> = points.iter().map(|p| (p.date - start).num_days() as f64).collect();
    let y: Vec<f64> = points.iter().map(|p| p.total_profit).collect();

    let mean_y = mean(&y).unwrap_or(0.0);
    let std_y = std_dev(&y).unwrap_or(0.0);
    let flat = LineFit {
        slope: 0.0,
        intercept: mean_y,
    };

    let (trend_label, line) = if std_y <= FLAT_STD_TOLERANCE {
        (TrendLabel::Flat, flat)
    } else {
        match fit_line(&x, &y) {
            Some(fit) => (classify_slope(fit.slope), fit),
            None => {
                tracing::warn!(points = points.len(), "line fit failed; falling back to flat mean");
                (TrendLabel::Flat, flat)
            }
        }
    };

    let last_x = x[x.len() - 1];
    let projection = line.predict(last_x + f64::from(horizon_days));
    let strength = (line.slope.abs() / (std_y + STRENGTH_EPSILON)).min(1.0).clamp(0.0, 1.0);

    tracing::debug!(
        slope = line.slope,
        intercept = line.intercept,
        projection,
        strength,
        training_points = points.len(),
        "fitted profit trend"
    );

    ForecastResult {
        status: ForecastStatus::Ok,
        insight: insight_text(trend_label, horizon_days, projection),
        daily_points: points
            .iter()
            .map(|p| DailyProfitPoint {
                date: p.date,
                total_profit: round_dp(p.total_profit, 2),
            })
            .collect(),
        trend: Some(TrendForecast {
            trend_label,
            trend_strength: round_dp(strength, 2),
            projected_profit: round_dp(projection, 2),
            horizon_days,
            model_details: ModelDetails {
                slope: round_dp(line.slope, 4),
                intercept: round_dp(line.intercept, 4),
                training_points: points.len(),
            },
        }),
    }
}

/// Direction of a fitted (non-constant) series.
///
/// Only a strictly positive slope is `Upward`; an exact zero falls to `Downward`.
fn classify_slope(slope: f64) -> TrendLabel {
    if slope > 0.0 { TrendLabel::Upward } else { TrendLabel::Downward }
}

fn insight_text(label: TrendLabel, horizon_days: u32, projection: f64) -> String {
    match label {
        TrendLabel::Flat => format!(
            "Profit is holding roughly flat; expect about {projection:.2} per day \
             {horizon_days} days from the last sale."
        ),
        TrendLabel::Upward | TrendLabel::Downward => format!(
            "Profit is trending {label}; the fitted line projects ~{projection:.2} per day \
             {horizon_days} days from the last sale."
        ),
    }
}
