// Historical series domain model
use super::reading::FatigueReading;
use chrono::{DateTime, Utc};

/// 24 hours of 15-minute samples.
pub const MAX_READINGS: usize = 96;

/// A new value is only recorded when it moves further than this from the latest one.
pub const DEDUP_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended { evicted: usize },
    Duplicate,
    /// The series was full and the new reading was older than all of it,
    /// so it was evicted on arrival. The series is unchanged.
    EvictedOnArrival,
}

impl AppendOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, AppendOutcome::Appended { .. })
    }
}

/// Bounded fatigue history, stored newest-first.
///
/// Appends go to the front without re-sorting, so a reading whose timestamp
/// is older than the current head (clock skew) breaks the global order.
/// Eviction always removes the reading with the smallest timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalSeries {
    readings: Vec<FatigueReading>,
}

impl HistoricalSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from readings, sorted newest-first and bounded.
    pub fn from_readings(mut readings: Vec<FatigueReading>) -> Self {
        readings.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        readings.truncate(MAX_READINGS);
        Self { readings }
    }

    /// Rebuild a series exactly as it was stored, order included.
    pub fn from_storage_order(readings: Vec<FatigueReading>) -> Self {
        Self { readings }
    }

    /// Sort newest-first and apply the bound.
    pub fn normalized(self) -> Self {
        Self::from_readings(self.readings)
    }

    pub fn push(&mut self, value: f64, at: DateTime<Utc>) -> AppendOutcome {
        if let Some(latest) = self.latest() {
            if (latest.value() - value).abs() <= DEDUP_TOLERANCE {
                return AppendOutcome::Duplicate;
            }
        }

        let reading = FatigueReading::new(at, value);
        let id = reading.id();
        self.readings.insert(0, reading);

        let mut evicted = 0;
        while self.readings.len() > MAX_READINGS {
            if let Some(index) = self.oldest_index() {
                self.readings.remove(index);
                evicted += 1;
            }
        }

        if self.latest().is_none_or(|r| r.id() != id) {
            return AppendOutcome::EvictedOnArrival;
        }
        AppendOutcome::Appended { evicted }
    }

    /// Ties resolve towards the tail so the insertion order decides.
    fn oldest_index(&self) -> Option<usize> {
        self.readings
            .iter()
            .enumerate()
            .rev()
            .min_by_key(|(_, r)| r.timestamp())
            .map(|(index, _)| index)
    }

    pub fn latest(&self) -> Option<&FatigueReading> {
        self.readings.first()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn readings(&self) -> &[FatigueReading] {
        &self.readings
    }

    /// Readings strictly after `since` in storage order; `None` returns everything.
    pub fn since(&self, since: Option<DateTime<Utc>>) -> Vec<FatigueReading> {
        self.readings
            .iter()
            .filter(|r| since.is_none_or(|cutoff| r.timestamp() > cutoff))
            .cloned()
            .collect()
    }

    /// Same filter as [`HistoricalSeries::since`], ordered oldest-first for charting.
    pub fn chronological(&self, since: Option<DateTime<Utc>>) -> Vec<FatigueReading> {
        let mut readings = self.since(since);
        readings.sort_by(|a, b| a.timestamp().cmp(&b.timestamp()));
        readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 8, 0, 0, 0).unwrap()
    }

    fn values(series: &HistoricalSeries) -> Vec<f64> {
        series.readings().iter().map(|r| r.value()).collect()
    }

    #[test]
    fn test_push_places_newest_first() {
        let mut series = HistoricalSeries::new();
        series.push(5.0, base());
        series.push(6.0, base() + Duration::minutes(15));

        assert_eq!(values(&series), vec![6.0, 5.0]);
        assert_eq!(series.latest().map(|r| r.value()), Some(6.0));
    }

    #[test]
    fn test_push_suppresses_values_within_tolerance() {
        let mut series = HistoricalSeries::new();
        assert!(series.push(5.0, base()).is_appended());
        assert_eq!(series.push(5.05, base() + Duration::minutes(15)), AppendOutcome::Duplicate);
        assert_eq!(series.push(4.95, base() + Duration::minutes(30)), AppendOutcome::Duplicate);
        assert!(series.push(5.25, base() + Duration::minutes(45)).is_appended());

        assert_eq!(values(&series), vec![5.25, 5.0]);
    }

    #[test]
    fn test_adjacent_entries_never_within_tolerance() {
        let inputs = [5.0, 5.05, 5.2, 5.2, 5.31, 5.3, 4.0, 4.1, 4.25, 9.0, 8.95, 0.0];
        let mut series = HistoricalSeries::new();
        for (i, value) in inputs.iter().enumerate() {
            series.push(*value, base() + Duration::minutes(15 * i as i64));
        }

        for pair in series.readings().windows(2) {
            assert!((pair[0].value() - pair[1].value()).abs() > DEDUP_TOLERANCE);
        }
    }

    #[test]
    fn test_slow_oscillation_is_never_recorded() {
        let mut series = HistoricalSeries::new();
        series.push(5.0, base());
        for i in 1..10 {
            let value = if i % 2 == 0 { 5.0 } else { 5.05 };
            series.push(value, base() + Duration::minutes(15 * i));
        }

        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_bound_evicts_oldest() {
        let mut series = HistoricalSeries::new();
        for i in 0..(MAX_READINGS as i64 + 10) {
            let value = if i % 2 == 0 { 2.0 } else { 8.0 };
            series.push(value, base() + Duration::minutes(15 * i));
        }

        assert_eq!(series.len(), MAX_READINGS);
        let oldest = series.readings().iter().map(|r| r.timestamp()).min().unwrap();
        assert_eq!(oldest, base() + Duration::minutes(15 * 10));
    }

    #[test]
    fn test_bound_evicts_smallest_timestamp_under_clock_skew() {
        let mut series = HistoricalSeries::new();
        // Tail of insertion order is a reading from the future.
        series.push(1.0, base() + Duration::days(1));
        for i in 1..(MAX_READINGS as i64) {
            let value = if i % 2 == 0 { 1.0 } else { 3.0 };
            series.push(value, base() + Duration::minutes(15 * i));
        }
        assert_eq!(series.len(), MAX_READINGS);

        let outcome = series.push(7.0, base() + Duration::hours(30));

        assert_eq!(outcome, AppendOutcome::Appended { evicted: 1 });
        assert_eq!(series.len(), MAX_READINGS);
        assert!(series.readings().iter().any(|r| r.timestamp() == base() + Duration::days(1)));
        assert!(!series.readings().iter().any(|r| r.timestamp() == base() + Duration::minutes(15)));
    }

    #[test]
    fn test_reading_older_than_full_series_is_evicted_on_arrival() {
        let mut series = HistoricalSeries::new();
        for i in 0..(MAX_READINGS as i64) {
            series.push((i % 7) as f64, base() + Duration::minutes(15 * i));
        }
        let before = series.clone();

        let outcome = series.push(9.5, base() - Duration::days(1));

        assert_eq!(outcome, AppendOutcome::EvictedOnArrival);
        assert!(!outcome.is_appended());
        assert_eq!(series, before);
    }

    #[test]
    fn test_duplicate_timestamps_are_tolerated() {
        let mut series = HistoricalSeries::new();
        series.push(2.0, base());
        series.push(6.0, base());

        assert_eq!(series.len(), 2);
        assert_ne!(series.readings()[0].id(), series.readings()[1].id());
    }

    #[test]
    fn test_from_readings_sorts_and_bounds() {
        let readings: Vec<FatigueReading> = (0..(MAX_READINGS as i64 + 4))
            .map(|i| FatigueReading::new(base() + Duration::minutes(15 * i), i as f64))
            .collect();

        let series = HistoricalSeries::from_readings(readings);

        assert_eq!(series.len(), MAX_READINGS);
        assert_eq!(series.latest().map(|r| r.value()), Some(MAX_READINGS as f64 + 3.0));
        assert!(series.readings().windows(2).all(|w| w[0].timestamp() >= w[1].timestamp()));
    }

    #[test]
    fn test_storage_order_is_kept_until_normalized() {
        let readings = vec![
            FatigueReading::new(base(), 6.0),
            FatigueReading::new(base() + Duration::hours(1), 3.0),
        ];

        let series = HistoricalSeries::from_storage_order(readings);
        assert_eq!(values(&series), vec![6.0, 3.0]);

        let series = series.normalized();
        assert_eq!(values(&series), vec![3.0, 6.0]);
    }

    #[test]
    fn test_since_filters_exclusive_and_keeps_storage_order() {
        let mut series = HistoricalSeries::new();
        series.push(1.0, base());
        series.push(2.0, base() + Duration::hours(1));
        series.push(3.0, base() + Duration::hours(2));

        assert_eq!(series.since(None).len(), 3);
        let recent = series.since(Some(base() + Duration::hours(1)));
        assert_eq!(recent.iter().map(|r| r.value()).collect::<Vec<_>>(), vec![3.0]);

        let chart = series.chronological(Some(base() - Duration::hours(1)));
        assert_eq!(chart.iter().map(|r| r.value()).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }
}
