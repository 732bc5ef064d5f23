//! Pure transforms from the loaded tables to chart-ready derived tables.
//!
//! Each transform takes the in-memory dataset plus user-selected parameters
//! and returns a fresh table; none of them mutate their input, so repeated
//! calls with the same arguments give the same output.

pub mod delay;
pub mod performance;
pub mod region;
pub mod reshape;
pub mod time_bucket;
pub mod types;
pub mod utility;
pub mod variation;
