//! Trip counts per (day-type, time-range) bucket.

use crate::error::TransformError;
use crate::records::TripRecord;
use crate::transforms::delay::parse_scheduled_time;
use crate::transforms::types::{ExcludedRecord, TimeBucketCount, TimeBuckets};
use crate::vocab::{DayType, TimeRange, parse_weekday_code};
use chrono::Timelike;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Days covered by the performance table; divides trip counts when they are
/// drawn next to daily passenger volumes.
pub const OBSERVATION_DAYS: f64 = 90.0;

/// Assigns a trip to its bucket from its raw weekday code and scheduled hour.
pub fn bucket_for(row: usize, weekday_code: &str, hour: u32) -> Result<(DayType, TimeRange), TransformError> {
    let day_type = parse_weekday_code(weekday_code)
        .and_then(DayType::from_weekday_code)
        .ok_or_else(|| TransformError::UnmappedWeekday {
            row,
            code: weekday_code.trim().to_string(),
        })?;
    let time_range = TimeRange::from_hour(hour).ok_or(TransformError::HourOutOfRange { row, hour })?;
    Ok((day_type, time_range))
}

/// Counts scheduled trips per bucket.
///
/// Only the scheduled time and weekday code are read, so a trip missing its
/// observed start is still counted. Records whose scheduled time cannot be
/// parsed are listed in [`TimeBuckets::excluded`]. Counts are ordered by
/// day-type then time-range, and only non-empty buckets are returned. Any
/// unmapped weekday code fails the whole transform.
pub fn bucket_trips(records: &[TripRecord]) -> Result<TimeBuckets, TransformError> {
    let mut counts: BTreeMap<(DayType, TimeRange), u64> = BTreeMap::new();
    let mut excluded = Vec::new();

    for (row, record) in records.iter().enumerate() {
        let hour = match parse_scheduled_time(&record.trip_time) {
            Ok(time) => time.hour(),
            Err(reason) => {
                debug!(row, %reason, "Record has no scheduled hour");
                excluded.push(ExcludedRecord { row, reason });
                continue;
            }
        };
        let bucket = bucket_for(row, &record.weekday_code, hour)?;
        *counts.entry(bucket).or_insert(0) += 1;
    }

    if !excluded.is_empty() {
        warn!(excluded = excluded.len(), "Records with malformed scheduled times were not bucketed");
    }

    Ok(TimeBuckets {
        counts: counts
            .into_iter()
            .map(|((day_type, time_range), trip_count)| TimeBucketCount {
                day_type,
                time_range,
                trip_count,
            })
            .collect(),
        excluded,
    })
}
