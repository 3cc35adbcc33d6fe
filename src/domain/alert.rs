// Alert rules and notification content
use super::forecast::ForecastSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EARLY_WARNING_OPTIONS: [i64; 3] = [15, 30, 60];
pub const THRESHOLD_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertPreferences {
    pub notifications_enabled: bool,
    pub threshold: f64,
    pub early_warning_enabled: bool,
    pub early_warning_lead_minutes: i64,
}

impl Default for AlertPreferences {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            threshold: 7.0,
            early_warning_enabled: false,
            early_warning_lead_minutes: 30,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PreferencesError {
    #[error("threshold {0} is outside 0-10")]
    ThresholdOutOfRange(f64),

    #[error("early warning lead time {0} is not one of 15, 30 or 60 minutes")]
    UnsupportedLeadTime(i64),
}

impl AlertPreferences {
    pub fn validate(&self) -> Result<(), PreferencesError> {
        if !THRESHOLD_RANGE.contains(&self.threshold) {
            return Err(PreferencesError::ThresholdOutOfRange(self.threshold));
        }
        if !EARLY_WARNING_OPTIONS.contains(&self.early_warning_lead_minutes) {
            return Err(PreferencesError::UnsupportedLeadTime(self.early_warning_lead_minutes));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertDecision {
    ThresholdAlert {
        current_value: f64,
        threshold: f64,
    },
    EarlyWarningAlert {
        predicted_value: f64,
        threshold: f64,
        lead_minutes: i64,
    },
}

/// Decide which alerts this cycle should raise.
///
/// Every cycle is judged on its own: while a condition holds the same alert is
/// raised again on each poll.
pub fn evaluate(forecast: &ForecastSet, prefs: &AlertPreferences) -> Vec<AlertDecision> {
    let mut decisions = Vec::new();

    if prefs.notifications_enabled {
        if let Some(current) = forecast.current() {
            if current >= prefs.threshold {
                decisions.push(AlertDecision::ThresholdAlert {
                    current_value: current,
                    threshold: prefs.threshold,
                });
            }
        }
    }

    if prefs.early_warning_enabled {
        let hit = forecast.pairs().find(|(lead, predicted)| {
            *lead == prefs.early_warning_lead_minutes && *predicted >= prefs.threshold
        });
        if let Some((lead_minutes, predicted_value)) = hit {
            decisions.push(AlertDecision::EarlyWarningAlert {
                predicted_value,
                threshold: prefs.threshold,
                lead_minutes,
            });
        }
    }

    decisions
}

/// A local notification ready for the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub dedupe_key: String,
    pub title: String,
    pub body: String,
    pub badge: u32,
}

impl AlertDecision {
    /// The dedupe key embeds `at` so repeated alerts are delivered, not coalesced.
    pub fn to_notification(&self, at: DateTime<Utc>) -> Notification {
        let stamp = at.timestamp_millis();
        match *self {
            AlertDecision::ThresholdAlert {
                current_value,
                threshold,
            } => Notification {
                dedupe_key: format!("fatigue-threshold-{}", stamp),
                title: "High Fatigue Alert".to_string(),
                body: format!(
                    "Your current fatigue level ({:.1}) has exceeded your threshold ({:.1}).",
                    current_value, threshold
                ),
                badge: 1,
            },
            AlertDecision::EarlyWarningAlert {
                predicted_value,
                lead_minutes,
                ..
            } => Notification {
                dedupe_key: format!("fatigue-warning-{}min-{}", lead_minutes, stamp),
                title: "Fatigue Warning".to_string(),
                body: format!(
                    "Your fatigue level is predicted to reach {:.1} in {} minutes, which exceeds your threshold.",
                    predicted_value, lead_minutes
                ),
                badge: 1,
            },
        }
    }
}
