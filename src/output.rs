//! Output formatting and persistence for derived tables.
//!
//! Supports pretty-printing, JSON serialization, and CSV export.

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt::Debug;
use std::fs::File;
use tracing::{debug, info};

/// Logs a derived table using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug + ?Sized>(table: &T) {
    info!("{:#?}", table);
}

/// Logs a derived table as pretty-printed JSON.
pub fn print_json<T: Serialize + ?Sized>(table: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(table)?);
    Ok(())
}

/// Writes `rows` to a CSV file at `path`, replacing it if it exists.
pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    debug!(path, rows = rows.len(), "Writing CSV table");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::types::TimeBucketCount;
    use crate::vocab::{DayType, TimeRange};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn buckets() -> Vec<TimeBucketCount> {
        vec![
            TimeBucketCount {
                day_type: DayType::WorkDay,
                time_range: TimeRange::MorningPeak,
                trip_count: 12,
            },
            TimeBucketCount {
                day_type: DayType::Saturday,
                time_range: TimeRange::Evening,
                trip_count: 3,
            },
        ]
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&buckets());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&buckets()).unwrap();
    }

    #[test]
    fn test_write_csv_uses_labels() {
        let path = temp_path("transit_insights_test_buckets.csv");
        let _ = fs::remove_file(&path);

        write_csv(&path, &buckets()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "day_type,time_range,trip_count");
        assert_eq!(lines[1], "WorkDay,06:00-08:59,12");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_csv_overwrites() {
        let path = temp_path("transit_insights_test_overwrite.csv");

        write_csv(&path, &buckets()).unwrap();
        write_csv(&path, &buckets()[..1]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);

        fs::remove_file(&path).unwrap();
    }
}
