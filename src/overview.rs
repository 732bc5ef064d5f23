//! Network-wide headline figures and per-column summary statistics.

use crate::records::RidershipRecord;
use crate::transforms::utility::{mean, pct, percentile, round2, stddev};
use crate::vocab::CoverageStatus;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkOverview {
    pub total_weekly_rides: f64,
    pub total_daily_rides: f64,
    pub daily_passengers: f64,
    /// Daily rides per 100 daily passengers.
    pub coverage_ratio: f64,
    pub coverage_status: CoverageStatus,
    pub total_routes: usize,
}

/// Totals over the whole ridership table.
pub fn overview(records: &[RidershipRecord]) -> NetworkOverview {
    let total_weekly_rides: f64 = records.iter().map(|r| r.weekly_rides).sum();
    let total_daily_rides: f64 = records.iter().map(|r| r.daily_rides).sum();
    let daily_passengers: f64 = records.iter().map(|r| r.daily_passengers).sum::<f64>().trunc();
    let coverage_ratio = round2(pct(total_daily_rides, daily_passengers));

    NetworkOverview {
        total_weekly_rides,
        total_daily_rides,
        daily_passengers,
        coverage_ratio,
        coverage_status: CoverageStatus::from_ratio(coverage_ratio),
        total_routes: records
            .iter()
            .map(|r| r.route_id.as_str())
            .collect::<HashSet<_>>()
            .len(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// Count, mean, population spread and quartiles of a column.
pub fn describe(values: &[f64]) -> ColumnSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let avg = mean(&sorted);

    ColumnSummary {
        count: sorted.len(),
        mean: avg,
        std: stddev(&sorted, avg),
        min: percentile(&sorted, 0.0),
        p25: percentile(&sorted, 0.25),
        p50: percentile(&sorted, 0.5),
        p75: percentile(&sorted, 0.75),
        max: percentile(&sorted, 1.0),
    }
}
