//! Demand vs. supply shares per metro area or cluster.

use crate::error::TransformError;
use crate::records::RidershipRecord;
use crate::transforms::types::AggregatedRegion;
use crate::transforms::utility::{pct, round2};
use crate::vocab::display_name;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Groups below this share on both axes are hidden when grouping by cluster.
pub const VISIBILITY_THRESHOLD_PCT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupDimension {
    MetroArea,
    Cluster,
}

impl GroupDimension {
    pub fn label(self) -> &'static str {
        match self {
            GroupDimension::MetroArea => "Metropolitan Area",
            GroupDimension::Cluster => "Regions",
        }
    }

    fn key(self, record: &RidershipRecord) -> &str {
        match self {
            GroupDimension::MetroArea => &record.metro_area,
            GroupDimension::Cluster => &record.cluster_name,
        }
    }
}

impl FromStr for GroupDimension {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "metro" | "metro-area" | "metropolin" => Ok(GroupDimension::MetroArea),
            "cluster" | "clustername" | "region" => Ok(GroupDimension::Cluster),
            _ => Err(TransformError::UnknownOption {
                kind: "grouping dimension",
                value: s.to_string(),
            }),
        }
    }
}

/// Which passenger/ride column pair to compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Weekly,
    Daily,
}

impl Period {
    fn columns(self, record: &RidershipRecord) -> (f64, f64) {
        match self {
            Period::Weekly => (record.weekly_passengers, record.weekly_rides),
            Period::Daily => (record.daily_passengers, record.daily_rides),
        }
    }
}

impl FromStr for Period {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weekly" => Ok(Period::Weekly),
            "daily" => Ok(Period::Daily),
            _ => Err(TransformError::UnknownOption {
                kind: "period",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending supply share.
    Supply,
    /// Ascending demand share.
    Demand,
    /// Descending group name.
    Name,
}

impl FromStr for SortOrder {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "supply" => Ok(SortOrder::Supply),
            "demand" => Ok(SortOrder::Demand),
            "name" => Ok(SortOrder::Name),
            _ => Err(TransformError::UnknownOption {
                kind: "sort order",
                value: s.to_string(),
            }),
        }
    }
}

/// Sums passengers and rides per group and expresses each as a share of the
/// global total, before any filtering or sorting.
///
/// Groups come back in ascending key order. A zero global total yields 0.0
/// shares.
pub fn group_shares(
    records: &[RidershipRecord],
    dimension: GroupDimension,
    period: Period,
) -> Vec<AggregatedRegion> {
    let mut sums: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for record in records {
        let (passengers, rides) = period.columns(record);
        let entry = sums.entry(dimension.key(record)).or_default();
        entry.0 += passengers;
        entry.1 += rides;
    }

    let total_passengers: f64 = sums.values().map(|(p, _)| p).sum();
    let total_rides: f64 = sums.values().map(|(_, r)| r).sum();

    sums.into_iter()
        .map(|(name, (passengers, rides))| AggregatedRegion {
            name: name.to_string(),
            passengers,
            rides,
            demand_pct: round2(pct(passengers, total_passengers)),
            supply_pct: round2(pct(rides, total_rides)),
        })
        .collect()
}

/// Builds the demand vs. supply table for one view.
///
/// Cluster groupings drop groups under [`VISIBILITY_THRESHOLD_PCT`] on both
/// shares. Sorting is stable, and display-name corrections are applied after
/// sorting.
pub fn aggregate_regions(
    records: &[RidershipRecord],
    dimension: GroupDimension,
    period: Period,
    sort: SortOrder,
) -> Vec<AggregatedRegion> {
    let mut groups = group_shares(records, dimension, period);

    if dimension == GroupDimension::Cluster {
        groups.retain(|g| {
            g.demand_pct >= VISIBILITY_THRESHOLD_PCT || g.supply_pct >= VISIBILITY_THRESHOLD_PCT
        });
    }

    match sort {
        SortOrder::Supply => groups.sort_by(|a, b| a.supply_pct.total_cmp(&b.supply_pct)),
        SortOrder::Demand => groups.sort_by(|a, b| a.demand_pct.total_cmp(&b.demand_pct)),
        SortOrder::Name => groups.sort_by(|a, b| b.name.cmp(&a.name)),
    }

    for group in &mut groups {
        group.name = display_name(&group.name).to_string();
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(route: &str, metro: &str, cluster: &str, passengers: f64, rides: f64) -> RidershipRecord {
        RidershipRecord {
            route_id: route.to_string(),
            metro_area: metro.to_string(),
            cluster_name: cluster.to_string(),
            daily_passengers: passengers,
            weekly_passengers: passengers * 6.0,
            daily_rides: rides,
            weekly_rides: rides * 6.0,
            periods: Vec::new(),
        }
    }

    #[test]
    fn test_worked_scenario() {
        let records = vec![
            record("A", "M1", "RouteA", 100.0, 20.0),
            record("B", "M2", "RouteB", 300.0, 10.0),
        ];

        let groups = group_shares(&records, GroupDimension::Cluster, Period::Daily);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "RouteA");
        assert_eq!(groups[0].demand_pct, 25.0);
        assert_eq!(groups[0].supply_pct, 66.67);
        assert_eq!(groups[1].demand_pct, 75.0);
        assert_eq!(groups[1].supply_pct, 33.33);
    }

    #[test]
    fn test_shares_sum_to_100() {
        let records = vec![
            record("1", "Center", "a", 13.0, 7.0),
            record("2", "Center", "b", 29.0, 3.0),
            record("3", "North", "c", 31.0, 11.0),
            record("4", "South", "d", 17.0, 5.0),
        ];

        for dimension in [GroupDimension::MetroArea, GroupDimension::Cluster] {
            for period in [Period::Daily, Period::Weekly] {
                let groups = group_shares(&records, dimension, period);
                let demand: f64 = groups.iter().map(|g| g.demand_pct).sum();
                let supply: f64 = groups.iter().map(|g| g.supply_pct).sum();
                assert!((demand - 100.0).abs() <= 0.1, "{demand}");
                assert!((supply - 100.0).abs() <= 0.1, "{supply}");
            }
        }
    }

    #[test]
    fn test_zero_total_yields_zero_shares() {
        let records = vec![record("1", "Center", "a", 0.0, 0.0)];
        let groups = group_shares(&records, GroupDimension::MetroArea, Period::Daily);
        assert_eq!(groups[0].demand_pct, 0.0);
        assert_eq!(groups[0].supply_pct, 0.0);
    }

    #[test]
    fn test_cluster_visibility_filter() {
        let records = vec![
            record("1", "Center", "big", 995.0, 995.0),
            record("2", "Center", "tiny", 5.0, 5.0),
        ];

        let clusters =
            aggregate_regions(&records, GroupDimension::Cluster, Period::Daily, SortOrder::Name);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].name, "big");

        let metros =
            aggregate_regions(&records, GroupDimension::MetroArea, Period::Daily, SortOrder::Name);
        assert_eq!(metros.len(), 1);
        assert_eq!(metros[0].demand_pct, 100.0);
    }

    #[test]
    fn test_sort_orders_are_stable() {
        let records = vec![
            record("1", "b", "x", 50.0, 10.0),
            record("2", "a", "x", 50.0, 30.0),
            record("3", "c", "x", 100.0, 60.0),
        ];

        let by_demand =
            aggregate_regions(&records, GroupDimension::MetroArea, Period::Daily, SortOrder::Demand);
        let names: Vec<_> = by_demand.iter().map(|g| g.name.as_str()).collect();
        // a and b tie on demand; key order is kept.
        assert_eq!(names, vec!["a", "b", "c"]);

        let by_supply =
            aggregate_regions(&records, GroupDimension::MetroArea, Period::Daily, SortOrder::Supply);
        let names: Vec<_> = by_supply.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);

        let by_name =
            aggregate_regions(&records, GroupDimension::MetroArea, Period::Daily, SortOrder::Name);
        let names: Vec<_> = by_name.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_display_names_corrected() {
        let records = vec![record("1", "m", "קווי נצרת - נסיעות ותיירות", 10.0, 10.0)];
        let groups =
            aggregate_regions(&records, GroupDimension::Cluster, Period::Weekly, SortOrder::Demand);
        assert_eq!(groups[0].name, "נצרת");
    }

    #[test]
    fn test_parse_options() {
        assert_eq!("daily".parse::<Period>().unwrap(), Period::Daily);
        assert_eq!("cluster".parse::<GroupDimension>().unwrap(), GroupDimension::Cluster);
        assert_eq!("Name".parse::<SortOrder>().unwrap(), SortOrder::Name);
        assert!("hourly".parse::<Period>().is_err());
    }
}
