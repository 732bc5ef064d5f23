//! Data-integrity errors raised by the transforms.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    #[error("row {row}: weekday code '{code}' has no day-type mapping")]
    UnmappedWeekday { row: usize, code: String },

    #[error("row {row}: hour {hour} is outside 0..=23")]
    HourOutOfRange { row: usize, hour: u32 },

    #[error("period column '{column}' has no ' - ' separator")]
    MalformedPeriodColumn { column: String },

    #[error("unknown {kind} '{value}'")]
    UnknownOption { kind: &'static str, value: String },
}
