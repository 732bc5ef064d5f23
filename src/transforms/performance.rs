//! Delay statistics over derived performance records.
//!
//! All spreads are population standard deviations (see
//! [`stddev`](crate::transforms::utility::stddev)); a single-trip group has
//! a spread of 0.

use crate::error::TransformError;
use crate::transforms::types::{
    CategoryCount, DayNameSpread, DelayPoint, HistogramBin, RegionalKpis, RouteDetail, RouteKey,
    RoutePerformanceStat, TripPerformance,
};
use crate::transforms::utility::{mean, pct, percentile, stddev};
use crate::vocab::{DayName, DelayCategory, MetroArea, parse_weekday_code};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const HISTOGRAM_BINS: usize = 30;

/// Delays within this many minutes either side of schedule count as on time.
pub const ON_TIME_WINDOW_MINUTES: f64 = 2.0;

fn group_by<'a, K: Ord>(
    trips: &'a [TripPerformance],
    key: impl Fn(&TripPerformance) -> K,
) -> BTreeMap<K, Vec<&'a TripPerformance>> {
    let mut groups: BTreeMap<K, Vec<&'a TripPerformance>> = BTreeMap::new();
    for trip in trips {
        groups.entry(key(trip)).or_default().push(trip);
    }
    groups
}

fn delays(trips: &[&TripPerformance]) -> Vec<f64> {
    trips.iter().map(|t| t.delay_minutes).collect()
}

/// Groups trips by `key` and computes mean delay, spread, trip count and the
/// share of on-time trips. Groups are ordered by key.
pub fn summarize<K: Ord>(
    trips: &[TripPerformance],
    key: impl Fn(&TripPerformance) -> K,
) -> Vec<RoutePerformanceStat<K>> {
    group_by(trips, key)
        .into_iter()
        .map(|(key, group)| {
            let series = delays(&group);
            let avg = mean(&series);
            let on_time = group
                .iter()
                .filter(|t| t.delay_category == DelayCategory::OnTime)
                .count();

            RoutePerformanceStat {
                key,
                avg_delay: avg,
                std_delay: stddev(&series, avg),
                trip_count: group.len(),
                on_time_ratio: pct(on_time as f64, group.len() as f64) / 100.0,
            }
        })
        .collect()
}

/// Per line, operator and cluster.
pub fn summarize_routes(trips: &[TripPerformance]) -> Vec<RoutePerformanceStat<RouteKey>> {
    summarize(trips, |t| RouteKey {
        line_id: t.line_id.clone(),
        operator: t.operator.clone(),
        cluster: t.cluster.clone(),
    })
}

/// Per cluster only.
pub fn summarize_clusters(trips: &[TripPerformance]) -> Vec<RoutePerformanceStat<String>> {
    summarize(trips, |t| t.cluster.clone())
}

/// Picks the `top_n` groups with the largest mean delay among those with at
/// least `min_trips` trips.
///
/// Ties go to the larger trip count, then to the smaller key, so the order is
/// fully deterministic.
pub fn worst_routes<K: Ord + Clone>(
    stats: &[RoutePerformanceStat<K>],
    min_trips: usize,
    top_n: usize,
) -> Vec<RoutePerformanceStat<K>> {
    let mut eligible: Vec<_> = stats
        .iter()
        .filter(|s| s.trip_count >= min_trips)
        .cloned()
        .collect();

    eligible.sort_by(|a, b| {
        b.avg_delay
            .total_cmp(&a.avg_delay)
            .then_with(|| b.trip_count.cmp(&a.trip_count))
            .then_with(|| a.key.cmp(&b.key))
    });
    eligible.truncate(top_n);
    eligible
}

fn delay_points<K: Ord>(
    trips: &[TripPerformance],
    key: impl Fn(&TripPerformance) -> K,
) -> Vec<DelayPoint<K>> {
    group_by(trips, key)
        .into_iter()
        .map(|(key, group)| {
            let series = delays(&group);
            let avg = mean(&series);
            DelayPoint {
                key,
                avg_delay: avg,
                std_delay: stddev(&series, avg),
                trip_count: group.len(),
            }
        })
        .collect()
}

/// Mean delay per scheduled hour of day.
pub fn hourly_delays(trips: &[TripPerformance]) -> Vec<DelayPoint<u32>> {
    delay_points(trips, |t| t.hour)
}

/// Mean delay per scheduled date.
pub fn daily_trend(trips: &[TripPerformance]) -> Vec<DelayPoint<NaiveDate>> {
    delay_points(trips, |t| t.date)
}

/// Trip count per delay category, most frequent first. Empty categories are
/// included.
pub fn delay_distribution(trips: &[TripPerformance]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = DelayCategory::ALL
        .into_iter()
        .map(|category| CategoryCount {
            category,
            count: trips.iter().filter(|t| t.delay_category == category).count(),
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Five-number delay summary per day of the week.
pub fn delays_by_day_name(trips: &[TripPerformance]) -> Result<Vec<DayNameSpread>, TransformError> {
    let mut groups: BTreeMap<DayName, Vec<f64>> = BTreeMap::new();
    for trip in trips {
        let day_name = parse_weekday_code(&trip.weekday_code)
            .and_then(DayName::from_weekday_code)
            .ok_or_else(|| TransformError::UnmappedWeekday {
                row: trip.row,
                code: trip.weekday_code.trim().to_string(),
            })?;
        groups.entry(day_name).or_default().push(trip.delay_minutes);
    }

    Ok(groups
        .into_iter()
        .map(|(day_name, mut series)| {
            series.sort_by(f64::total_cmp);
            DayNameSpread {
                day_name,
                min: percentile(&series, 0.0),
                q1: percentile(&series, 0.25),
                median: percentile(&series, 0.5),
                q3: percentile(&series, 0.75),
                max: percentile(&series, 1.0),
                trip_count: series.len(),
            }
        })
        .collect())
}

/// Equal-width histogram between the smallest and largest delay.
pub fn delay_histogram(delays: &[f64], bins: usize) -> Vec<HistogramBin> {
    if delays.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = delays.iter().copied().fold(f64::INFINITY, f64::min);
    let max = delays.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: delays.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for delay in delays {
        let idx = (((delay - min) / width).floor() as usize).min(bins - 1);
        histogram[idx].count += 1;
    }

    histogram
}

/// Drill-down for one line: delay histogram and hourly delays.
/// Returns `None` when the line has no trips.
pub fn route_detail(trips: &[TripPerformance], line_id: &str) -> Option<RouteDetail> {
    let route: Vec<TripPerformance> = trips
        .iter()
        .filter(|t| t.line_id == line_id)
        .cloned()
        .collect();
    if route.is_empty() {
        return None;
    }

    let series: Vec<f64> = route.iter().map(|t| t.delay_minutes).collect();

    Some(RouteDetail {
        line_id: line_id.to_string(),
        histogram: delay_histogram(&series, HISTOGRAM_BINS),
        hourly: hourly_delays(&route),
    })
}

/// Keeps the trips of one metro area; `None` keeps everything.
pub fn filter_metro_area(trips: &[TripPerformance], area: Option<MetroArea>) -> Vec<TripPerformance> {
    match area {
        Some(area) => trips.iter().filter(|t| t.metro_area == area).cloned().collect(),
        None => trips.to_vec(),
    }
}

/// Average delay, share of trips later than `delay_threshold` minutes, and
/// share on time. All zero for an empty set.
pub fn regional_kpis(trips: &[TripPerformance], delay_threshold: f64) -> RegionalKpis {
    let series: Vec<f64> = trips.iter().map(|t| t.delay_minutes).collect();
    let total = series.len() as f64;
    let delayed = series.iter().filter(|d| **d > delay_threshold).count();
    let on_time = series
        .iter()
        .filter(|d| d.abs() <= ON_TIME_WINDOW_MINUTES)
        .count();

    RegionalKpis {
        avg_delay: mean(&series),
        delay_threshold,
        delayed_pct: pct(delayed as f64, total),
        on_time_pct: pct(on_time as f64, total),
        trip_count: series.len(),
    }
}
