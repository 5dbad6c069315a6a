use crate::{error::LocationError, model::GeoCoordinate};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};

/// One-shot resolution of the device position.
///
/// A resolver is called exactly once per panel lifetime; no retry, no
/// caching across invocations.
#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    async fn resolve(&self) -> Result<GeoCoordinate, LocationError>;
}

/// Default IP-geolocation endpoint.
const IP_API_URL: &str = "http://ip-api.com/json";

const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves the position of the machine from its public IP address.
///
/// A headless client has no platform geolocation API to ask, so this is
/// the stand-in: one GET against a public IP-geolocation service.
#[derive(Debug, Clone)]
pub struct IpLocationResolver {
    http: Client,
    endpoint: String,
}

impl IpLocationResolver {
    pub fn new() -> Self {
        Self::with_endpoint(IP_API_URL.to_string())
    }

    pub fn with_endpoint(endpoint: String) -> Self {
        Self { http: Client::new(), endpoint }
    }
}

impl Default for IpLocationResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    lat: f64,
    lon: f64,
}

#[async_trait]
impl LocationResolver for IpLocationResolver {
    async fn resolve(&self) -> Result<GeoCoordinate, LocationError> {
        let res = self
            .http
            .get(&self.endpoint)
            .timeout(RESOLVE_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LocationError::Timeout
                } else {
                    LocationError::Unavailable
                }
            })?;

        if res.status() == reqwest::StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied);
        }
        if !res.status().is_success() {
            return Err(LocationError::Unavailable);
        }

        let parsed: IpApiResponse = res
            .json()
            .await
            .map_err(|e| LocationError::Other(format!("bad geolocation response: {e}")))?;

        Ok(GeoCoordinate { latitude: parsed.lat, longitude: parsed.lon })
    }
}

/// Resolver with explicit coordinates, for the `--lat`/`--lon` override.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationResolver {
    coord: GeoCoordinate,
}

impl FixedLocationResolver {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { coord: GeoCoordinate { latitude, longitude } }
    }
}

#[async_trait]
impl LocationResolver for FixedLocationResolver {
    async fn resolve(&self) -> Result<GeoCoordinate, LocationError> {
        Ok(self.coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fixed_resolver_returns_its_coordinates() {
        let resolver = FixedLocationResolver::new(10.0, 20.0);
        let coord = resolver.resolve().await.expect("resolve");

        assert_eq!(coord, GeoCoordinate { latitude: 10.0, longitude: 20.0 });
    }

    #[tokio::test]
    async fn ip_resolver_parses_lat_lon() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "lat": 48.85,
                "lon": 2.35,
                "city": "Paris"
            })))
            .mount(&server)
            .await;

        let resolver = IpLocationResolver::with_endpoint(format!("{}/json", server.uri()));
        let coord = resolver.resolve().await.expect("resolve");

        assert_eq!(coord, GeoCoordinate { latitude: 48.85, longitude: 2.35 });
    }

    #[tokio::test]
    async fn ip_resolver_maps_forbidden_to_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let resolver = IpLocationResolver::with_endpoint(format!("{}/json", server.uri()));
        let err = resolver.resolve().await.unwrap_err();

        assert!(matches!(err, LocationError::PermissionDenied));
    }

    #[tokio::test]
    async fn ip_resolver_maps_server_error_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let resolver = IpLocationResolver::with_endpoint(format!("{}/json", server.uri()));
        let err = resolver.resolve().await.unwrap_err();

        assert!(matches!(err, LocationError::Unavailable));
    }
}
