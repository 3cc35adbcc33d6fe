// Forecast domain model
use serde::Serialize;

pub const DEFAULT_LEAD_MINUTES: [i64; 4] = [15, 30, 45, 60];

/// Number of values drawn by the forecast chart.
pub const CHART_POINTS: usize = 5;

const CHART_FALLBACK_VALUE: f64 = 5.0;

/// Predictions paired index-by-index with the lead time they apply to.
/// `predictions[0]` is the current estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSet {
    predictions: Vec<f64>,
    lead_minutes: Vec<i64>,
}

impl ForecastSet {
    /// Missing or misaligned lead times are replaced with [`DEFAULT_LEAD_MINUTES`].
    pub fn new(predictions: Vec<f64>, lead_minutes: Option<Vec<i64>>) -> Self {
        let lead_minutes = match lead_minutes {
            Some(leads) if leads.len() == predictions.len() => leads,
            _ => DEFAULT_LEAD_MINUTES.to_vec(),
        };

        Self {
            predictions,
            lead_minutes,
        }
    }

    pub fn predictions(&self) -> &[f64] {
        &self.predictions
    }

    pub fn lead_minutes(&self) -> &[i64] {
        &self.lead_minutes
    }

    pub fn current(&self) -> Option<f64> {
        self.predictions.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// `(lead_minutes, prediction)` pairs; extra entries on either side are ignored.
    pub fn pairs(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.lead_minutes
            .iter()
            .copied()
            .zip(self.predictions.iter().copied())
    }

    /// The first [`CHART_POINTS`] predictions, padded by repeating the last one.
    pub fn chart_values(&self) -> Vec<f64> {
        let mut values: Vec<f64> = self.predictions.iter().take(CHART_POINTS).copied().collect();
        while values.len() < CHART_POINTS {
            values.push(values.last().copied().unwrap_or(CHART_FALLBACK_VALUE));
        }
        values
    }
}

impl Default for ForecastSet {
    fn default() -> Self {
        Self::new(Vec::new(), None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}
