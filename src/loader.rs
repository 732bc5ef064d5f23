//! Reads the ridership and performance tables from CSV.
//!
//! Paths ending in `.gz` are decompressed on the fly.

use crate::records::{RidershipRecord, RidershipTable, TripRecord};
use crate::vocab::DayType;
use anyhow::{Context, Result};
use csv::StringRecord;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;

    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        debug!(path = %path.display(), "Reading gzip-compressed table");
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Loads the wide ridership table from `path`.
pub fn load_ridership(path: &Path) -> Result<RidershipTable> {
    let table = read_ridership(open(path)?)
        .with_context(|| format!("failed to read ridership table '{}'", path.display()))?;
    info!(
        path = %path.display(),
        routes = table.records.len(),
        period_columns = table.period_columns.len(),
        "Ridership table loaded"
    );
    Ok(table)
}

/// Loads the per-trip performance table from `path`.
pub fn load_performance(path: &Path) -> Result<Vec<TripRecord>> {
    let trips = read_performance(open(path)?)
        .with_context(|| format!("failed to read performance table '{}'", path.display()))?;
    info!(path = %path.display(), trips = trips.len(), "Performance table loaded");
    Ok(trips)
}

/// Parses a ridership table from any CSV source.
///
/// Every header that starts with a day-type name is kept as a period column,
/// in header order.
pub fn read_ridership<R: Read>(reader: R) -> Result<RidershipTable> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let column = |names: &[&str]| -> Result<usize> {
        headers
            .iter()
            .position(|h| names.contains(&h.trim()))
            .with_context(|| format!("missing column '{}'", names[0]))
    };

    let route_idx = column(&["RouteID"])?;
    let metro_idx = column(&["Metropolin", "MetroArea"])?;
    let cluster_idx = column(&["ClusterName"])?;
    let daily_passengers_idx = column(&["DailyPassengers"])?;
    let weekly_passengers_idx = column(&["WeeklyPassengers"])?;
    let daily_rides_idx = column(&["DailyRides"])?;
    let weekly_rides_idx = column(&["WeekyRides", "WeeklyRides"])?;

    let period_idx: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| DayType::ALL.iter().any(|d| h.trim().starts_with(d.label())))
        .map(|(i, _)| i)
        .collect();

    let mut table = RidershipTable {
        period_columns: period_idx.iter().map(|&i| headers[i].trim().to_string()).collect(),
        records: Vec::new(),
    };

    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let number = |idx: usize| -> Result<f64> {
            Ok(cell(&record, idx, row)?.unwrap_or(0.0))
        };

        table.records.push(RidershipRecord {
            route_id: text(&record, route_idx),
            metro_area: text(&record, metro_idx),
            cluster_name: text(&record, cluster_idx),
            daily_passengers: number(daily_passengers_idx)?,
            weekly_passengers: number(weekly_passengers_idx)?,
            daily_rides: number(daily_rides_idx)?,
            weekly_rides: number(weekly_rides_idx)?,
            periods: period_idx
                .iter()
                .map(|&idx| cell(&record, idx, row))
                .collect::<Result<_>>()?,
        });
    }

    Ok(table)
}

/// Parses a performance table from any CSV source.
pub fn read_performance<R: Read>(reader: R) -> Result<Vec<TripRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut trips = Vec::new();

    for result in rdr.deserialize() {
        let record: TripRecord = result?;
        trips.push(record);
    }

    Ok(trips)
}

fn text(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or_default().trim().to_string()
}

fn cell(record: &StringRecord, idx: usize, row: usize) -> Result<Option<f64>> {
    let raw = record.get(idx).unwrap_or_default().trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value = raw
        .parse::<f64>()
        .with_context(|| format!("row {row}, column {idx}: '{raw}' is not a number"))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RIDERSHIP: &str = "\
RouteID,Metropolin,ClusterName,DailyPassengers,WeeklyPassengers,DailyRides,WeekyRides,RouteName,WorkDay - 06:00-08:59,Friday - 06:00-08:59,Saturday - 19:00-23:59
1,Tel Aviv,North Cluster,100,600,20,120,Line A,40,10,
2,Haifa,South Cluster,300,1800,10,60,Line B,100,30,5
";

    #[test]
    fn test_read_ridership_period_columns() {
        let table = read_ridership(RIDERSHIP.as_bytes()).unwrap();

        assert_eq!(
            table.period_columns,
            vec![
                "WorkDay - 06:00-08:59",
                "Friday - 06:00-08:59",
                "Saturday - 19:00-23:59"
            ]
        );
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].route_id, "1");
        assert_eq!(table.records[0].periods, vec![Some(40.0), Some(10.0), None]);
        assert_eq!(table.records[1].weekly_rides, 60.0);
    }

    #[test]
    fn test_read_ridership_trims_headers() {
        let data = "RouteID, Metropolin ,ClusterName,DailyPassengers,WeeklyPassengers,DailyRides,WeekyRides, WorkDay - 06:00-08:59 \n1,a,b,1,1,1,1,7\n";
        let table = read_ridership(data.as_bytes()).unwrap();

        assert_eq!(table.period_columns, vec!["WorkDay - 06:00-08:59"]);
        assert_eq!(table.records[0].periods, vec![Some(7.0)]);
    }

    #[test]
    fn test_read_ridership_missing_column() {
        let result = read_ridership("RouteID,Metropolin\n1,x\n".as_bytes());
        assert!(result.is_err());
    }

    #[test]
    fn test_read_ridership_bad_number() {
        let data = "RouteID,Metropolin,ClusterName,DailyPassengers,WeeklyPassengers,DailyRides,WeekyRides\n1,a,b,lots,1,1,1\n";
        assert!(read_ridership(data.as_bytes()).is_err());
    }

    #[test]
    fn test_column_values() {
        let table = read_ridership(RIDERSHIP.as_bytes()).unwrap();
        assert_eq!(table.column_values("DailyPassengers"), Some(vec![100.0, 300.0]));
        assert_eq!(table.column_values("Saturday - 19:00-23:59"), Some(vec![5.0]));
        assert_eq!(table.column_values("Nope"), None);
    }

    #[test]
    fn test_read_performance() {
        let data = "\
OperatorLineId,operator_nm,cluster_nm,trip_dt,trip_time,bitzua_history_start_dt,trip_day_in_week
10101,Dan,תל אביב,2024-03-03,08:15:00,2024-03-03 08:19:00,1
";
        let trips = read_performance(data.as_bytes()).unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].line_id, "10101");
        assert_eq!(trips[0].weekday_code, "1");
    }

    #[test]
    fn test_read_performance_tolerates_bad_weekday_cells() {
        let data = "\
OperatorLineId,operator_nm,cluster_nm,trip_dt,trip_time,bitzua_history_start_dt,trip_day_in_week
10101,Dan,תל אביב,2024-03-03,08:15:00,2024-03-03 08:19:00,
10101,Dan,תל אביב,2024-03-04,08:15:00,2024-03-04 08:19:00,1.0
10101,Dan,תל אביב,2024-03-05,08:15:00,2024-03-05 08:19:00,300
";
        let trips = read_performance(data.as_bytes()).unwrap();
        assert_eq!(trips.len(), 3);
        assert_eq!(trips[0].weekday_code, "");
        assert_eq!(trips[1].weekday_code, "1.0");
        assert_eq!(trips[2].weekday_code, "300");
    }
}
