//! Source table rows as loaded from disk.

use serde::Deserialize;

/// One ridership row per route.
///
/// `periods` is aligned with [`RidershipTable::period_columns`]; `None` marks
/// an empty cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RidershipRecord {
    pub route_id: String,
    pub metro_area: String,
    pub cluster_name: String,
    pub daily_passengers: f64,
    pub weekly_passengers: f64,
    pub daily_rides: f64,
    pub weekly_rides: f64,
    pub periods: Vec<Option<f64>>,
}

/// The wide ridership table: fixed columns plus one passenger column per
/// `"<DayType> - <TimeRange>"` header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RidershipTable {
    pub period_columns: Vec<String>,
    pub records: Vec<RidershipRecord>,
}

impl RidershipTable {
    /// Returns the value of `column` for every record, skipping empty cells.
    ///
    /// Accepts both the fixed column names and the period column names.
    pub fn column_values(&self, column: &str) -> Option<Vec<f64>> {
        let fixed = |get: fn(&RidershipRecord) -> f64| -> Option<Vec<f64>> {
            Some(self.records.iter().map(get).collect())
        };
        match column {
            "DailyPassengers" => return fixed(|r| r.daily_passengers),
            "WeeklyPassengers" => return fixed(|r| r.weekly_passengers),
            "DailyRides" => return fixed(|r| r.daily_rides),
            "WeeklyRides" | "WeekyRides" => return fixed(|r| r.weekly_rides),
            _ => {}
        }

        let idx = self.period_columns.iter().position(|c| c == column)?;
        Some(
            self.records
                .iter()
                .filter_map(|r| r.periods.get(idx).copied().flatten())
                .collect(),
        )
    }
}

/// One scheduled trip from the performance table, timestamps and weekday
/// code still raw text.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TripRecord {
    #[serde(rename = "OperatorLineId")]
    pub line_id: String,
    #[serde(rename = "operator_nm")]
    pub operator: String,
    #[serde(rename = "cluster_nm")]
    pub cluster: String,
    #[serde(rename = "trip_dt")]
    pub trip_date: String,
    #[serde(rename = "trip_time")]
    pub trip_time: String,
    #[serde(rename = "bitzua_history_start_dt")]
    pub actual_start: String,
    #[serde(rename = "trip_day_in_week")]
    pub weekday_code: String,
}
