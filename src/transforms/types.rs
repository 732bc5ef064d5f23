//! Derived tables produced by the transforms.

use crate::vocab::{DayName, DayType, DelayCategory, MetroArea, TimeRange};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Demand and supply share of one grouping value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRegion {
    pub name: String,
    pub passengers: f64,
    pub rides: f64,
    pub demand_pct: f64,
    pub supply_pct: f64,
}

/// Number of scheduled trips falling in one (day-type, time-range) bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeBucketCount {
    pub day_type: DayType,
    pub time_range: TimeRange,
    pub trip_count: u64,
}

impl TimeBucketCount {
    /// Trip count averaged over `observation_days`.
    pub fn per_day(&self, observation_days: f64) -> f64 {
        if observation_days == 0.0 {
            0.0
        } else {
            self.trip_count as f64 / observation_days
        }
    }
}

/// One melted cell of the wide ridership table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongPassengerRow {
    pub route_id: String,
    pub region: String,
    pub day_type: DayType,
    pub time_period: String,
    pub time_range: String,
    pub passengers: Option<f64>,
}

/// A performance record after delay derivation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPerformance {
    /// Index of the source record in the performance table.
    pub row: usize,
    pub line_id: String,
    pub operator: String,
    pub cluster: String,
    pub metro_area: MetroArea,
    pub planned_time: NaiveDateTime,
    pub actual_time: NaiveDateTime,
    pub weekday_code: String,
    pub delay_minutes: f64,
    pub delay_category: DelayCategory,
    pub hour: u32,
    pub date: NaiveDate,
}

/// A record dropped by delay derivation or bucketing and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedRecord {
    pub row: usize,
    pub reason: String,
}

/// Output of the delay-derivation stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Enrichment {
    pub trips: Vec<TripPerformance>,
    pub excluded: Vec<ExcludedRecord>,
}

/// Output of the time bucketer: counts plus records whose scheduled time
/// could not be read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeBuckets {
    pub counts: Vec<TimeBucketCount>,
    pub excluded: Vec<ExcludedRecord>,
}

/// Grouping key for the per-route summary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RouteKey {
    pub line_id: String,
    pub operator: String,
    pub cluster: String,
}

/// Delay statistics for one group of trips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePerformanceStat<K> {
    pub key: K,
    pub avg_delay: f64,
    pub std_delay: f64,
    pub trip_count: usize,
    pub on_time_ratio: f64,
}

/// Mean delay and trip count for one bucket of a time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelayPoint<K> {
    pub key: K,
    pub avg_delay: f64,
    pub std_delay: f64,
    pub trip_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: DelayCategory,
    pub count: usize,
}

/// Five-number summary of the delays observed on one day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayNameSpread {
    pub day_name: DayName,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub trip_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Drill-down view for a single route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDetail {
    pub line_id: String,
    pub histogram: Vec<HistogramBin>,
    pub hourly: Vec<DelayPoint<u32>>,
}

/// Headline indicators for a (possibly area-filtered) set of trips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionalKpis {
    pub avg_delay: f64,
    pub delay_threshold: f64,
    pub delayed_pct: f64,
    pub on_time_pct: f64,
    pub trip_count: usize,
}

/// Passengers and trips side by side for one time range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandSupplyPoint {
    pub time_range: String,
    pub passengers: Option<f64>,
    pub trips_per_day: Option<f64>,
    pub passengers_per_trip: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandPoint {
    pub day_type: DayType,
    pub time_range: String,
    pub passengers: f64,
}

/// Flat form of a per-route stat, one column per key field, for CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStatRow {
    pub line_id: String,
    pub operator: String,
    pub cluster: String,
    pub avg_delay: f64,
    pub std_delay: f64,
    pub trip_count: usize,
    pub on_time_ratio: f64,
}

impl From<RoutePerformanceStat<RouteKey>> for RouteStatRow {
    fn from(stat: RoutePerformanceStat<RouteKey>) -> Self {
        Self {
            line_id: stat.key.line_id,
            operator: stat.key.operator,
            cluster: stat.key.cluster,
            avg_delay: stat.avg_delay,
            std_delay: stat.std_delay,
            trip_count: stat.trip_count,
            on_time_ratio: stat.on_time_ratio,
        }
    }
}
