// HTTP client for the remote prediction service
use crate::application::ports::PredictionSource;
use crate::domain::forecast::ForecastSet;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;

pub const PREDICTIONS_PATH: &str = "/current-predictions";

#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpPredictionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), PREDICTIONS_PATH),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else {
            FetchError::Transport(error)
        }
    }
}

#[async_trait]
impl PredictionSource for HttpPredictionClient {
    async fn fetch_predictions(&self) -> Result<ForecastSet, FetchError> {
        tracing::debug!("Fetching predictions from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        parse_prediction_response(&body)
    }
}

/// Normalize a `/current-predictions` body.
///
/// Non-numeric prediction entries are dropped; integral ones become reals.
/// `next_minutes` falls back to the default lead times when it is absent or
/// not a list of integers.
pub fn parse_prediction_response(body: &[u8]) -> Result<ForecastSet, FetchError> {
    let json: Value = serde_json::from_slice(body)?;
    let object = json.as_object().ok_or(FetchError::NotAnObject)?;

    let status = object.get("status").and_then(Value::as_str);
    if status != Some("success") {
        return Err(FetchError::Rejected(status.map(str::to_string)));
    }

    let predictions: Vec<f64> = object
        .get("predictions")
        .and_then(Value::as_array)
        .ok_or(FetchError::MissingPredictions)?
        .iter()
        .filter_map(Value::as_f64)
        .collect();

    let lead_minutes = object.get("next_minutes").and_then(|value| {
        value
            .as_array()?
            .iter()
            .map(Value::as_i64)
            .collect::<Option<Vec<i64>>>()
    });

    Ok(ForecastSet::new(predictions, lead_minutes))
}
