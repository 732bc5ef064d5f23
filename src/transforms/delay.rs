//! Delay derivation: turns raw performance rows into [`TripPerformance`].
//!
//! Input columns: line id, operator, cluster, scheduled date (`trip_dt`),
//! scheduled time (`trip_time`), observed start (`bitzua_history_start_dt`)
//! and weekday code. Output adds planned/actual timestamps, delay in minutes
//! (day-boundary corrected), delay category, scheduled hour, scheduled date
//! and metro area.

use crate::records::TripRecord;
use crate::transforms::types::{Enrichment, ExcludedRecord, TripPerformance};
use crate::vocab::{DelayCategory, MetroArea};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, warn};

const MINUTES_PER_DAY: f64 = 1440.0;
const WRAPAROUND_LIMIT: f64 = 720.0;

static TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];
static DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Pulls a difference of more than half a day back across the day boundary.
/// Applied once: 721 becomes -719.
pub fn correct_wraparound(raw_minutes: f64) -> f64 {
    if raw_minutes > WRAPAROUND_LIMIT {
        raw_minutes - MINUTES_PER_DAY
    } else if raw_minutes < -WRAPAROUND_LIMIT {
        raw_minutes + MINUTES_PER_DAY
    } else {
        raw_minutes
    }
}

/// Minutes between schedule and observation, wraparound corrected.
pub fn delay_minutes(planned: NaiveDateTime, actual: NaiveDateTime) -> f64 {
    let raw = (actual - planned).num_milliseconds() as f64 / 60_000.0;
    correct_wraparound(raw)
}

/// Parses the scheduled time of day (`trip_time`).
pub fn parse_scheduled_time(raw: &str) -> Result<NaiveTime, String> {
    TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(raw.trim(), f).ok())
        .ok_or_else(|| format!("unparsable trip_time '{raw}'"))
}

fn parse_planned(record: &TripRecord) -> Result<NaiveDateTime, String> {
    let date = NaiveDate::parse_from_str(record.trip_date.trim(), "%Y-%m-%d")
        .map_err(|e| format!("unparsable trip_dt '{}': {e}", record.trip_date))?;
    let time = parse_scheduled_time(&record.trip_time)?;
    Ok(date.and_time(time))
}

fn parse_actual(record: &TripRecord) -> Result<NaiveDateTime, String> {
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(record.actual_start.trim(), f).ok())
        .ok_or_else(|| format!("unparsable actual start '{}'", record.actual_start))
}

fn enrich_one(row: usize, record: &TripRecord) -> Result<TripPerformance, String> {
    let planned_time = parse_planned(record)?;
    let actual_time = parse_actual(record)?;
    let delay = delay_minutes(planned_time, actual_time);

    Ok(TripPerformance {
        row,
        line_id: record.line_id.clone(),
        operator: record.operator.clone(),
        cluster: record.cluster.clone(),
        metro_area: MetroArea::from_cluster(&record.cluster),
        planned_time,
        actual_time,
        weekday_code: record.weekday_code.clone(),
        delay_minutes: delay,
        delay_category: DelayCategory::from_delay(delay),
        hour: planned_time.hour(),
        date: planned_time.date(),
    })
}

/// Derives delay features for every record.
///
/// Records with an unparsable scheduled or actual timestamp are excluded and
/// listed in [`Enrichment::excluded`].
pub fn enrich_trips(records: &[TripRecord]) -> Enrichment {
    let mut enrichment = Enrichment::default();

    for (row, record) in records.iter().enumerate() {
        match enrich_one(row, record) {
            Ok(trip) => enrichment.trips.push(trip),
            Err(reason) => {
                debug!(row, %reason, "Excluding performance record");
                enrichment.excluded.push(ExcludedRecord { row, reason });
            }
        }
    }

    if !enrichment.excluded.is_empty() {
        warn!(
            excluded = enrichment.excluded.len(),
            kept = enrichment.trips.len(),
            "Performance records with malformed timestamps were excluded"
        );
    }

    enrichment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, time: &str, actual: &str) -> TripRecord {
        TripRecord {
            line_id: "10101".to_string(),
            operator: "Dan".to_string(),
            cluster: "תל אביב".to_string(),
            trip_date: date.to_string(),
            trip_time: time.to_string(),
            actual_start: actual.to_string(),
            weekday_code: "1".to_string(),
        }
    }

    #[test]
    fn test_wraparound() {
        assert_eq!(correct_wraparound(800.0), -640.0);
        assert_eq!(correct_wraparound(-800.0), 640.0);
        assert_eq!(correct_wraparound(300.0), 300.0);
        assert_eq!(correct_wraparound(720.0), 720.0);
        assert_eq!(correct_wraparound(-720.0), -720.0);
        assert_eq!(correct_wraparound(721.0), -719.0);
    }

    #[test]
    fn test_delay_across_midnight() {
        let enrichment = enrich_trips(&[record("2024-03-03", "23:58:00", "2024-03-03 00:03:00")]);
        let trip = &enrichment.trips[0];

        // Observed date not rolled over: raw diff is -1435, corrected to +5.
        assert_eq!(trip.delay_minutes, 5.0);
        assert_eq!(trip.delay_category, DelayCategory::SlightlyLate);
        assert_eq!(trip.hour, 23);
    }

    #[test]
    fn test_enriched_fields() {
        let enrichment = enrich_trips(&[record("2024-03-05", "08:15", "2024-03-05T08:13:30")]);
        let trip = &enrichment.trips[0];

        assert_eq!(trip.delay_minutes, -1.5);
        assert_eq!(trip.delay_category, DelayCategory::OnTime);
        assert_eq!(trip.metro_area, MetroArea::Center);
        assert_eq!(trip.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(trip.hour, 8);
    }

    #[test]
    fn test_malformed_timestamps_are_counted() {
        let enrichment = enrich_trips(&[
            record("2024-03-03", "08:00:00", "2024-03-03 08:10:00"),
            record("not-a-date", "08:00:00", "2024-03-03 08:10:00"),
            record("2024-03-03", "08:00:00", "yesterday"),
        ]);

        assert_eq!(enrichment.trips.len(), 1);
        assert_eq!(enrichment.excluded.len(), 2);
        assert_eq!(enrichment.excluded[0].row, 1);
        assert_eq!(enrichment.excluded[1].row, 2);
        assert_eq!(enrichment.trips[0].delay_category, DelayCategory::Late);
    }

    #[test]
    fn test_trips_keep_source_row() {
        let enrichment = enrich_trips(&[
            record("2024-03-03", "08:00:00", ""),
            record("2024-03-03", "09:00:00", "2024-03-03 09:01:00"),
        ]);

        assert_eq!(enrichment.trips.len(), 1);
        assert_eq!(enrichment.trips[0].row, 1);
    }

    #[test]
    fn test_parse_scheduled_time() {
        assert_eq!(parse_scheduled_time("09:30").unwrap().hour(), 9);
        assert_eq!(parse_scheduled_time("23:58:00.000").unwrap().hour(), 23);
        assert!(parse_scheduled_time("").is_err());
    }
}
