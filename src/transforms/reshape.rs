//! Unpivots the wide per-period passenger columns into long rows.

use crate::error::TransformError;
use crate::records::RidershipTable;
use crate::transforms::types::LongPassengerRow;
use crate::vocab::DayType;

const PERIOD_SEPARATOR: &str = " - ";

/// Melts every `"<DayType> - <TimeRange>"` column into one row per
/// (route, column), tagged with its day-type.
///
/// Day-types are emitted WorkDay, Friday, Saturday; within a day-type the
/// columns keep header order and the routes keep table order. Empty cells are
/// kept as `None`.
pub fn reshape_passengers(table: &RidershipTable) -> Result<Vec<LongPassengerRow>, TransformError> {
    let mut rows = Vec::new();

    for day_type in DayType::ALL {
        for (idx, column) in table.period_columns.iter().enumerate() {
            if !column.starts_with(day_type.label()) {
                continue;
            }

            let (_, time_range) = column.split_once(PERIOD_SEPARATOR).ok_or_else(|| {
                TransformError::MalformedPeriodColumn {
                    column: column.clone(),
                }
            })?;

            rows.extend(table.records.iter().map(|record| LongPassengerRow {
                route_id: record.route_id.clone(),
                region: record.metro_area.clone(),
                day_type,
                time_period: column.clone(),
                time_range: time_range.to_string(),
                passengers: record.periods.get(idx).copied().flatten(),
            }));
        }
    }

    Ok(rows)
}
