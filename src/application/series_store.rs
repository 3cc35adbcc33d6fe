// Persisted series store - Bounded fatigue history backed by durable storage
use crate::application::ports::KeyValueStore;
use crate::domain::reading::{FatigueReading, TimeRange};
use crate::domain::series::{AppendOutcome, HistoricalSeries};
use crate::error::PersistenceError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const SERIES_KEY: &str = "historical_fatigue_data";

#[derive(Debug, Serialize, Deserialize)]
struct StoredReading {
    timestamp: String,
    value: f64,
}

/// Encode a series as a JSON array of `{timestamp, value}` records.
/// Timestamps are written as ISO-8601 with second precision.
pub fn encode_series(series: &HistoricalSeries) -> Result<String, PersistenceError> {
    let records: Vec<StoredReading> = series
        .readings()
        .iter()
        .map(|r| StoredReading {
            timestamp: r.timestamp().to_rfc3339_opts(SecondsFormat::Secs, true),
            value: r.value(),
        })
        .collect();

    serde_json::to_string(&records).map_err(PersistenceError::Encode)
}

/// Decode a stored series, keeping the stored order.
///
/// A record whose timestamp cannot be parsed keeps its value and is stamped
/// with the current time.
pub fn decode_series(data: &str) -> Result<HistoricalSeries, PersistenceError> {
    decode_series_at(data, Utc::now())
}

/// [`decode_series`] with an explicit stamp for unparseable timestamps.
pub fn decode_series_at(
    data: &str,
    fallback: DateTime<Utc>,
) -> Result<HistoricalSeries, PersistenceError> {
    let records: Vec<StoredReading> =
        serde_json::from_str(data).map_err(PersistenceError::Decode)?;

    let readings = records
        .into_iter()
        .map(|record| {
            let timestamp = match DateTime::parse_from_rfc3339(&record.timestamp) {
                Ok(timestamp) => timestamp.with_timezone(&Utc),
                Err(e) => {
                    tracing::warn!(
                        "Stored reading has timestamp {:?} ({}), using {}",
                        record.timestamp,
                        e,
                        fallback
                    );
                    fallback
                }
            };
            FatigueReading::new(timestamp, record.value)
        })
        .collect();

    Ok(HistoricalSeries::from_storage_order(readings))
}

pub struct SeriesStore {
    series: HistoricalSeries,
    storage: Arc<dyn KeyValueStore>,
}

impl SeriesStore {
    /// Load the stored series, sorted newest-first and bounded.
    /// Any failure degrades to an empty series.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let series = match storage.get(SERIES_KEY) {
            Ok(Some(data)) => match decode_series(&data).map(HistoricalSeries::normalized) {
                Ok(series) => {
                    tracing::info!("Loaded {} historical data points", series.len());
                    series
                }
                Err(e) => {
                    tracing::warn!("Error loading historical data: {}", e);
                    HistoricalSeries::new()
                }
            },
            Ok(None) => {
                tracing::info!("No historical data found in storage");
                HistoricalSeries::new()
            }
            Err(e) => {
                tracing::warn!("Error reading historical data: {}", e);
                HistoricalSeries::new()
            }
        };

        Self { series, storage }
    }

    /// Record a reading and write the whole series back before returning.
    ///
    /// A failed write is logged and the in-memory series keeps the reading,
    /// so memory and storage may diverge until the next successful write.
    pub fn append(&mut self, value: f64, at: DateTime<Utc>) -> AppendOutcome {
        let outcome = self.series.push(value, at);

        match outcome {
            AppendOutcome::Appended { evicted } => {
                tracing::info!("Added historical data point: {} at {}", value, at);
                if evicted > 0 {
                    tracing::debug!("Evicted {} oldest data point(s)", evicted);
                }
                if let Err(e) = self.save() {
                    tracing::warn!("Error saving historical data: {}", e);
                }
            }
            AppendOutcome::Duplicate => {
                tracing::debug!("Skipping data point {}: within tolerance of latest", value);
            }
            AppendOutcome::EvictedOnArrival => {
                tracing::info!(
                    "Dropped data point {} at {}: older than the full history",
                    value,
                    at
                );
            }
        }

        outcome
    }

    fn save(&self) -> Result<(), PersistenceError> {
        let data = encode_series(&self.series)?;
        self.storage.set(SERIES_KEY, &data)
    }

    /// Readings newer than `since` in storage order (newest first); `None` returns all.
    pub fn query_range(&self, since: Option<DateTime<Utc>>) -> Vec<FatigueReading> {
        self.series.since(since)
    }

    /// Readings inside `range`, oldest first.
    pub fn chart(&self, range: TimeRange, now: DateTime<Utc>) -> Vec<FatigueReading> {
        self.series.chronological(range.cutoff(now))
    }

    pub fn series(&self) -> &HistoricalSeries {
        &self.series
    }
}
