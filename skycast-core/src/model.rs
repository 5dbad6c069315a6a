use serde::{Deserialize, Serialize};

/// Device position, resolved once per panel lifetime.
///
/// Doubles as the request body of the weather endpoint, which expects
/// `{"latitude": .., "longitude": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// The single current weather reading held by the panel.
///
/// Produced by the fetch response or by a push update; whichever arrives
/// last wins, wholesale. Every field is optional: a push payload that
/// omits a field replaces that field with `None`, it is never inherited
/// from the previous snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSnapshot {
    pub location: Option<String>,
    /// Temperature in kelvin, as delivered by the service.
    pub temperature: Option<f64>,
    pub description: Option<String>,
    /// Icon code, e.g. "01d", resolved to an image URL at render time.
    pub icon: Option<String>,
}
