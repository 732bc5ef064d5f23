//! Fixed label vocabularies shared by the transforms.
//!
//! Every grouping key a transform emits comes from one of these tables.

use crate::error::TransformError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Reads a raw weekday-code cell. Integral floats (`"1.0"`) are accepted;
/// blanks, fractions and values outside `u8` are not.
pub fn parse_weekday_code(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    if let Ok(code) = raw.parse::<u8>() {
        return Some(code);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}

/// Weekday classification used by both the ridership and performance tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DayType {
    WorkDay,
    Friday,
    Saturday,
}

impl DayType {
    pub const ALL: [DayType; 3] = [DayType::WorkDay, DayType::Friday, DayType::Saturday];

    /// Maps a weekday code (1 = Sunday .. 7 = Saturday) to its day-type.
    ///
    /// | Code | Day-type |
    /// |------|----------|
    /// | 1-5  | WorkDay  |
    /// | 6    | Friday   |
    /// | 7    | Saturday |
    pub fn from_weekday_code(code: u8) -> Option<DayType> {
        match code {
            1..=5 => Some(DayType::WorkDay),
            6 => Some(DayType::Friday),
            7 => Some(DayType::Saturday),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayType::WorkDay => "WorkDay",
            DayType::Friday => "Friday",
            DayType::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DayType {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayType::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| TransformError::UnknownOption {
                kind: "day type",
                value: s.to_string(),
            })
    }
}

/// Calendar day name for a weekday code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DayName {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayName {
    pub const ALL: [DayName; 7] = [
        DayName::Sunday,
        DayName::Monday,
        DayName::Tuesday,
        DayName::Wednesday,
        DayName::Thursday,
        DayName::Friday,
        DayName::Saturday,
    ];

    pub fn from_weekday_code(code: u8) -> Option<DayName> {
        match code {
            1..=7 => Some(DayName::ALL[usize::from(code) - 1]),
            _ => None,
        }
    }
}

/// One of the seven fixed half-open hour-of-day buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TimeRange {
    #[serde(rename = "00:00-03:59")]
    Night,
    #[serde(rename = "04:00-05:59")]
    Dawn,
    #[serde(rename = "06:00-08:59")]
    MorningPeak,
    #[serde(rename = "09:00-11:59")]
    Morning,
    #[serde(rename = "12:00-14:59")]
    Midday,
    #[serde(rename = "15:00-18:59")]
    EveningPeak,
    #[serde(rename = "19:00-23:59")]
    Evening,
}

/// `(start_hour, end_hour_exclusive, range)` in chart order.
static TIME_RANGES: &[(u32, u32, TimeRange)] = &[
    (0, 4, TimeRange::Night),
    (4, 6, TimeRange::Dawn),
    (6, 9, TimeRange::MorningPeak),
    (9, 12, TimeRange::Morning),
    (12, 15, TimeRange::Midday),
    (15, 19, TimeRange::EveningPeak),
    (19, 24, TimeRange::Evening),
];

impl TimeRange {
    pub const ALL: [TimeRange; 7] = [
        TimeRange::Night,
        TimeRange::Dawn,
        TimeRange::MorningPeak,
        TimeRange::Morning,
        TimeRange::Midday,
        TimeRange::EveningPeak,
        TimeRange::Evening,
    ];

    /// Returns the range containing `hour`, or `None` outside 0..=23.
    pub fn from_hour(hour: u32) -> Option<TimeRange> {
        TIME_RANGES
            .iter()
            .find(|(start, end, _)| (*start..*end).contains(&hour))
            .map(|(_, _, range)| *range)
    }

    /// Looks a range up by its `HH:MM-HH:MM` label.
    pub fn from_label(label: &str) -> Option<TimeRange> {
        TimeRange::ALL.into_iter().find(|r| r.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Night => "00:00-03:59",
            TimeRange::Dawn => "04:00-05:59",
            TimeRange::MorningPeak => "06:00-08:59",
            TimeRange::Morning => "09:00-11:59",
            TimeRange::Midday => "12:00-14:59",
            TimeRange::EveningPeak => "15:00-18:59",
            TimeRange::Evening => "19:00-23:59",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Five-bin classification of a delay in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DelayCategory {
    #[serde(rename = "Early (>5min)")]
    Early,
    #[serde(rename = "Slightly Early (2-5min)")]
    SlightlyEarly,
    #[serde(rename = "On Time (±2min)")]
    OnTime,
    #[serde(rename = "Slightly Late (2-5min)")]
    SlightlyLate,
    #[serde(rename = "Late (>5min)")]
    Late,
}

impl DelayCategory {
    pub const ALL: [DelayCategory; 5] = [
        DelayCategory::Early,
        DelayCategory::SlightlyEarly,
        DelayCategory::OnTime,
        DelayCategory::SlightlyLate,
        DelayCategory::Late,
    ];

    /// Classifies a delay.
    ///
    /// | Delay (min)   | Category       |
    /// |---------------|----------------|
    /// | < -5          | Early          |
    /// | [-5, -2)      | Slightly Early |
    /// | [-2, 2]       | On Time        |
    /// | (2, 5]        | Slightly Late  |
    /// | > 5           | Late           |
    pub fn from_delay(minutes: f64) -> DelayCategory {
        match minutes {
            m if m < -5.0 => DelayCategory::Early,
            m if m < -2.0 => DelayCategory::SlightlyEarly,
            m if m <= 2.0 => DelayCategory::OnTime,
            m if m <= 5.0 => DelayCategory::SlightlyLate,
            _ => DelayCategory::Late,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DelayCategory::Early => "Early (>5min)",
            DelayCategory::SlightlyEarly => "Slightly Early (2-5min)",
            DelayCategory::OnTime => "On Time (±2min)",
            DelayCategory::SlightlyLate => "Slightly Late (2-5min)",
            DelayCategory::Late => "Late (>5min)",
        }
    }
}

impl fmt::Display for DelayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse geographic area derived from an operator cluster name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MetroArea {
    North,
    Center,
    South,
    #[serde(rename = "Inter-city")]
    InterCity,
    Other,
}

/// Cluster-name fragments per area. Scanned in order; the last match wins.
static METRO_AREA_CLUSTERS: &[(MetroArea, &[&str])] = &[
    (MetroArea::North, &["גליל עמקים", "חיפה"]),
    (MetroArea::Center, &["תל אביב", "ירושלים", "מרכז"]),
    (
        MetroArea::South,
        &["דרום", "צפון הנגב", "אשדוד", "באר שבע", "אשקלון"],
    ),
    (
        MetroArea::InterCity,
        &[
            "ירושלים קווי צפון",
            "ירושלים צפון-ציר מזרחי",
            "חיפה-ירושלים-אילת",
            "חיפה-שרון-ירושלים",
            "בין עירוני",
        ],
    ),
];

impl MetroArea {
    pub fn from_cluster(cluster: &str) -> MetroArea {
        METRO_AREA_CLUSTERS
            .iter()
            .filter(|(_, fragments)| fragments.iter().any(|f| cluster.contains(*f)))
            .map(|(area, _)| *area)
            .last()
            .unwrap_or(MetroArea::Other)
    }

    pub fn label(self) -> &'static str {
        match self {
            MetroArea::North => "North",
            MetroArea::Center => "Center",
            MetroArea::South => "South",
            MetroArea::InterCity => "Inter-city",
            MetroArea::Other => "Other",
        }
    }
}

impl FromStr for MetroArea {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            MetroArea::North,
            MetroArea::Center,
            MetroArea::South,
            MetroArea::InterCity,
            MetroArea::Other,
        ]
        .into_iter()
        .find(|a| a.label().eq_ignore_ascii_case(s))
        .ok_or_else(|| TransformError::UnknownOption {
            kind: "metro area",
            value: s.to_string(),
        })
    }
}

/// Source naming fixes applied to grouping values before display.
static DISPLAY_NAME_CORRECTIONS: &[(&str, &str)] = &[
    ("חולון עירוני ומטרופוליני+תחרות חולון", "חולון עירוני"),
    ("קווי נצרת - שאמ", "נצרת - שאם"),
    ("קווי נצרת - נסיעות ותיירות", "נצרת"),
];

/// Returns the corrected display name for a grouping value.
pub fn display_name(raw: &str) -> &str {
    DISPLAY_NAME_CORRECTIONS
        .iter()
        .find(|(from, _)| *from == raw)
        .map(|(_, to)| *to)
        .unwrap_or(raw)
}

/// Rides-per-passenger balance band for the network overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoverageStatus {
    #[serde(rename = "Under-supplied")]
    UnderSupplied,
    Balanced,
    #[serde(rename = "Over-supplied")]
    OverSupplied,
}

impl CoverageStatus {
    /// | Ratio (%)  | Status         |
    /// |------------|----------------|
    /// | < 15       | Under-supplied |
    /// | 15 - 30    | Balanced       |
    /// | > 30       | Over-supplied  |
    pub fn from_ratio(ratio: f64) -> CoverageStatus {
        match ratio {
            r if r < 15.0 => CoverageStatus::UnderSupplied,
            r if r <= 30.0 => CoverageStatus::Balanced,
            _ => CoverageStatus::OverSupplied,
        }
    }
}
