// Error types - Failures absorbed by the component that detects them
use thiserror::Error;

/// Which state flag a failure ends up as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Network unreachable or timed out.
    Transport,
    /// The backend answered with something unusable.
    Protocol,
    /// Local storage could not be read or written.
    Persistence,
    /// Notifications are not authorized.
    PermissionDenied,
}

/// Errors raised while fetching predictions
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to prediction service failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("prediction service did not answer within {0} seconds")]
    Timeout(u64),

    #[error("prediction service returned HTTP {0}")]
    HttpStatus(u16),

    #[error("invalid JSON from prediction service: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response body is not a JSON object")]
    NotAnObject,

    #[error("prediction service reported status {0:?}")]
    Rejected(Option<String>),

    #[error("response is missing the predictions array")]
    MissingPredictions,
}

impl FetchError {
    pub fn class(&self) -> ErrorClass {
        match self {
            FetchError::Transport(_) | FetchError::Timeout(_) | FetchError::HttpStatus(_) => {
                ErrorClass::Transport
            }
            FetchError::InvalidJson(_)
            | FetchError::NotAnObject
            | FetchError::Rejected(_)
            | FetchError::MissingPredictions => ErrorClass::Protocol,
        }
    }
}

/// Errors raised by durable key-value storage
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode series: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode series: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

impl PersistenceError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Persistence
    }
}

/// Errors raised by the settings store
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to write settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Invalid(#[from] crate::domain::alert::PreferencesError),
}

/// Errors raised by a notification gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("notifications are not authorized")]
    NotAuthorized,

    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

impl GatewayError {
    pub fn class(&self) -> ErrorClass {
        match self {
            GatewayError::NotAuthorized => ErrorClass::PermissionDenied,
            GatewayError::Delivery(_) => ErrorClass::Transport,
        }
    }
}
