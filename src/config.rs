//! Where the source tables live and how trip counts are normalized.

use crate::transforms::time_bucket::OBSERVATION_DAYS;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_RIDERSHIP_PATH: &str = "data/2024_public_transport_ridership.csv";
pub const DEFAULT_PERFORMANCE_PATH: &str = "data/2024_march_bus_performance.csv";

/// Dashboard settings.
///
/// Read from the environment (`RIDERSHIP_PATH`, `PERFORMANCE_PATH`,
/// `OBSERVATION_DAYS`) or from a JSON file:
/// ```json
/// {
///   "ridership_path": "data/ridership.csv.gz",
///   "performance_path": "data/performance.csv",
///   "observation_days": 31
/// }
/// ```
/// Missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub ridership_path: PathBuf,
    pub performance_path: PathBuf,
    pub observation_days: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            ridership_path: PathBuf::from(DEFAULT_RIDERSHIP_PATH),
            performance_path: PathBuf::from(DEFAULT_PERFORMANCE_PATH),
            observation_days: OBSERVATION_DAYS,
        }
    }
}

impl DashboardConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("failed to read config '{path}'"))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("config '{path}' is not valid JSON"))?;
        Ok(config)
    }

    /// Builds the config from environment variables over the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup("RIDERSHIP_PATH") {
            config.ridership_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("PERFORMANCE_PATH") {
            config.performance_path = PathBuf::from(path);
        }
        if let Some(days) = lookup("OBSERVATION_DAYS") {
            config.observation_days = days
                .parse()
                .with_context(|| format!("OBSERVATION_DAYS '{days}' is not a number"))?;
        }

        Ok(config)
    }
}
