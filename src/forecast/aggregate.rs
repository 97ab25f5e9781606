//! Daily profit aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{DailyProfitPoint, SaleRecord};
use crate::forecast::dates::sale_day;

/// Per-day profit totals plus counts of what was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyProfit {
    /// Day -> total profit. Ordered ascending by construction.
    pub totals: BTreeMap<NaiveDate, f64>,
    pub records_used: usize,
    /// Records whose date was missing or unparseable.
    pub skipped_dates: usize,
    /// Records whose profit was NaN or infinite.
    pub skipped_profits: usize,
}

impl DailyProfit {
    pub fn days(&self) -> usize {
        self.totals.len()
    }

    /// Ascending, unrounded series.
    pub fn points(&self) -> Vec<DailyProfitPoint> {
        self.totals
            .iter()
            .map(|(&date, &total_profit)| DailyProfitPoint { date, total_profit })
            .collect()
    }
}

/// Sum record profits into one total per calendar day.
///
/// - A missing profit counts as `0.0`.
/// - Records without a parseable date are skipped.
/// - Records with a non-finite profit are skipped.
///
/// Each day's profits are summed in sorted order, so the totals do not depend
/// on the order records arrive in (floating-point addition is not associative).
pub fn aggregate_daily_profit<I>(records: I) -> DailyProfit
where
    I: IntoIterator,
    I::Item: SaleRecord,
{
    let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    let mut out = DailyProfit::default();

    for record in records {
        let Some(day) = record.sale_date().and_then(sale_day) else {
            out.skipped_dates += 1;
            continue;
        };

        let profit = record.profit().unwrap_or(0.0);
        if !profit.is_finite() {
            out.skipped_profits += 1;
            continue;
        }

        by_day.entry(day).or_default().push(profit);
        out.records_used += 1;
    }

    for (day, mut profits) in by_day {
        profits.sort_by(f64::total_cmp);
        out.totals.insert(day, profits.iter().sum());
    }

    if out.skipped_dates > 0 || out.skipped_profits > 0 {
        tracing::debug!(
            skipped_dates = out.skipped_dates,
            skipped_profits = out.skipped_profits,
            records_used = out.records_used,
            "skipped sale records during daily aggregation"
        );
    }

    out
}
