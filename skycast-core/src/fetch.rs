use crate::{
    error::FetchError,
    model::{GeoCoordinate, WeatherSnapshot},
};
use reqwest::Client;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// One-shot weather fetch against the fixed service endpoint.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    http: Client,
    endpoint: String,
}

impl WeatherFetcher {
    /// `endpoint` is the full URL of the weather endpoint, usually
    /// [`Config::weather_endpoint`](crate::Config::weather_endpoint).
    pub fn new(endpoint: String) -> Self {
        Self { http: Client::new(), endpoint }
    }

    /// POST the coordinate, expect a snapshot back. Any failure is
    /// terminal for the fetch flow; there is no retry.
    pub async fn fetch(&self, coord: GeoCoordinate) -> Result<WeatherSnapshot, FetchError> {
        let res = self
            .http
            .post(&self.endpoint)
            .json(&coord)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        let snapshot: WeatherSnapshot = serde_json::from_str(&body)?;
        Ok(snapshot)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    // Cut on a char boundary; a byte offset can land inside a
    // multi-byte character.
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
