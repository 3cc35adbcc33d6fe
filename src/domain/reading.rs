// Fatigue reading domain model
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single historical fatigue sample.
///
/// Equality compares the sample (timestamp and value), not the identity, so a
/// series survives a storage round trip even though identities are reassigned.
#[derive(Debug, Clone, Serialize)]
pub struct FatigueReading {
    #[serde(skip)]
    id: Uuid,
    timestamp: DateTime<Utc>,
    value: f64,
}

impl FatigueReading {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            value,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl PartialEq for FatigueReading {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp && self.value == other.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FatigueLevel {
    Low,
    Moderate,
    High,
}

impl FatigueLevel {
    pub fn classify(value: f64) -> Self {
        if value < 3.0 {
            FatigueLevel::Low
        } else if value < 7.0 {
            FatigueLevel::Moderate
        } else {
            FatigueLevel::High
        }
    }
}

/// Lookback window used when charting the historical series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum TimeRange {
    /// No filtering: the whole stored series.
    #[default]
    #[serde(rename = "future")]
    Future,
    #[serde(rename = "1h")]
    LastHour,
    #[serde(rename = "2h")]
    LastTwoHours,
    #[serde(rename = "5h")]
    LastFiveHours,
    #[serde(rename = "24h")]
    LastDay,
}

impl TimeRange {
    pub fn lookback(&self) -> Option<Duration> {
        match self {
            TimeRange::Future => None,
            TimeRange::LastHour => Some(Duration::hours(1)),
            TimeRange::LastTwoHours => Some(Duration::hours(2)),
            TimeRange::LastFiveHours => Some(Duration::hours(5)),
            TimeRange::LastDay => Some(Duration::hours(24)),
        }
    }

    /// Exclusive lower bound for readings in this range, if any.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.lookback().map(|lookback| now - lookback)
    }
}
