use thiserror::Error;

/// Failure to resolve the device position.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location request timed out")]
    Timeout,
    #[error("position unavailable")]
    Unavailable,
    #[error("location error: {0}")]
    Other(String),
}

/// Failure of the one-shot weather fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("weather request failed with status {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },
    #[error("failed to parse weather response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure on the push channel. Logged and ignored, never fatal.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to connect push channel: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("push channel stream error: {0}")]
    Stream(#[source] reqwest::Error),
    #[error("malformed push payload: {0}")]
    Payload(#[from] serde_json::Error),
}
