//! Passenger demand and trip supply through the day.

use crate::transforms::types::{DemandPoint, DemandSupplyPoint, LongPassengerRow, TimeBucketCount};
use crate::vocab::{DayType, TimeRange};
use std::collections::BTreeMap;

/// Sort key placing the fixed time ranges first, in chart order, and any
/// other label after them alphabetically.
fn time_order(label: &str) -> (usize, &str) {
    let position = TimeRange::ALL
        .iter()
        .position(|r| r.label() == label)
        .unwrap_or(TimeRange::ALL.len());
    (position, label)
}

fn passengers_by_range<'a>(
    rows: impl Iterator<Item = &'a LongPassengerRow>,
) -> BTreeMap<(usize, &'a str), f64> {
    let mut totals = BTreeMap::new();
    for row in rows {
        *totals.entry(time_order(&row.time_range)).or_insert(0.0) += row.passengers.unwrap_or(0.0);
    }
    totals
}

/// Total passengers per time range for one day-type.
pub fn demand_by_time_range(rows: &[LongPassengerRow], day_type: DayType) -> Vec<DemandPoint> {
    passengers_by_range(rows.iter().filter(|r| r.day_type == day_type))
        .into_iter()
        .map(|((_, time_range), passengers)| DemandPoint {
            day_type,
            time_range: time_range.to_string(),
            passengers,
        })
        .collect()
}

/// Total passengers per (day-type, time range) across all day-types.
pub fn demand_all_days(rows: &[LongPassengerRow]) -> Vec<DemandPoint> {
    DayType::ALL
        .into_iter()
        .flat_map(|day_type| demand_by_time_range(rows, day_type))
        .collect()
}

/// Lines passenger totals up against trips per observed day for one
/// day-type.
///
/// Time ranges present on either side are kept; a missing side is `None`,
/// as is the passengers-per-trip ratio when either side is missing or no
/// trips ran.
pub fn demand_vs_trips(
    rows: &[LongPassengerRow],
    buckets: &[TimeBucketCount],
    day_type: DayType,
    observation_days: f64,
) -> Vec<DemandSupplyPoint> {
    let mut joined: BTreeMap<(usize, &str), (Option<f64>, Option<f64>)> = BTreeMap::new();

    for (key, passengers) in passengers_by_range(rows.iter().filter(|r| r.day_type == day_type)) {
        joined.entry(key).or_default().0 = Some(passengers);
    }
    for bucket in buckets.iter().filter(|b| b.day_type == day_type) {
        let trips = joined.entry(time_order(bucket.time_range.label())).or_default();
        trips.1 = Some(trips.1.unwrap_or(0.0) + bucket.per_day(observation_days));
    }

    joined
        .into_iter()
        .map(|((_, time_range), (passengers, trips_per_day))| DemandSupplyPoint {
            time_range: time_range.to_string(),
            passengers,
            trips_per_day,
            passengers_per_trip: match (passengers, trips_per_day) {
                (Some(p), Some(t)) if t > 0.0 => Some(p / t),
                _ => None,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(route: &str, day_type: DayType, time_range: &str, passengers: Option<f64>) -> LongPassengerRow {
        LongPassengerRow {
            route_id: route.to_string(),
            region: "Center".to_string(),
            day_type,
            time_period: format!("{day_type} - {time_range}"),
            time_range: time_range.to_string(),
            passengers,
        }
    }

    fn rows() -> Vec<LongPassengerRow> {
        vec![
            row("A", DayType::WorkDay, "15:00-18:59", Some(30.0)),
            row("A", DayType::WorkDay, "06:00-08:59", Some(40.0)),
            row("B", DayType::WorkDay, "06:00-08:59", Some(60.0)),
            row("B", DayType::WorkDay, "00:00-03:59", None),
            row("A", DayType::Friday, "06:00-08:59", Some(5.0)),
        ]
    }

    #[test]
    fn test_demand_ordered_by_time_range() {
        let points = demand_by_time_range(&rows(), DayType::WorkDay);
        let ranges: Vec<_> = points.iter().map(|p| p.time_range.as_str()).collect();
        assert_eq!(ranges, vec!["00:00-03:59", "06:00-08:59", "15:00-18:59"]);
        assert_eq!(points[0].passengers, 0.0);
        assert_eq!(points[1].passengers, 100.0);
    }

    #[test]
    fn test_demand_all_days() {
        let points = demand_all_days(&rows());
        assert_eq!(points.len(), 4);
        assert_eq!(points[3].day_type, DayType::Friday);
        assert_eq!(points[3].passengers, 5.0);
    }

    #[test]
    fn test_demand_vs_trips_outer_join() {
        let buckets = vec![
            TimeBucketCount {
                day_type: DayType::WorkDay,
                time_range: TimeRange::MorningPeak,
                trip_count: 180,
            },
            TimeBucketCount {
                day_type: DayType::WorkDay,
                time_range: TimeRange::Evening,
                trip_count: 90,
            },
            TimeBucketCount {
                day_type: DayType::Friday,
                time_range: TimeRange::MorningPeak,
                trip_count: 900,
            },
        ];

        let points = demand_vs_trips(&rows(), &buckets, DayType::WorkDay, 90.0);
        let ranges: Vec<_> = points.iter().map(|p| p.time_range.as_str()).collect();
        assert_eq!(
            ranges,
            vec!["00:00-03:59", "06:00-08:59", "15:00-18:59", "19:00-23:59"]
        );

        let morning = &points[1];
        assert_eq!(morning.passengers, Some(100.0));
        assert_eq!(morning.trips_per_day, Some(2.0));
        assert_eq!(morning.passengers_per_trip, Some(50.0));

        let evening = &points[3];
        assert_eq!(evening.passengers, None);
        assert_eq!(evening.trips_per_day, Some(1.0));
        assert_eq!(evening.passengers_per_trip, None);

        assert_eq!(points[2].trips_per_day, None);
    }
}
