//! Presentation derivation: pure functions over the current snapshot.
//!
//! No state, no side effects; everything here is recomputed on every
//! render.

use crate::model::WeatherSnapshot;

/// Convert a kelvin reading to Celsius.
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - 273.15
}

/// Celsius display string, rounded to exactly two decimal places.
pub fn format_celsius(kelvin: f64) -> String {
    format!("{:.2}", kelvin_to_celsius(kelvin))
}

/// Icon image URL for an icon code against the configured image host.
pub fn icon_url(base: &str, code: &str) -> String {
    format!("{}/{}.png", base.trim_end_matches('/'), code)
}

/// Display fields derived from a snapshot. Fields absent from the
/// snapshot stay absent here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readout {
    pub location: Option<String>,
    /// E.g. "26.85 °C".
    pub temperature: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
}

impl Readout {
    pub fn derive(snapshot: &WeatherSnapshot, icon_base: &str) -> Self {
        Self {
            location: snapshot.location.clone(),
            temperature: snapshot.temperature.map(|k| format!("{} °C", format_celsius(k))),
            description: snapshot.description.clone(),
            icon_url: snapshot.icon.as_deref().map(|code| icon_url(icon_base, code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celsius_formatting_has_two_decimals() {
        assert_eq!(format_celsius(300.0), "26.85");
        assert_eq!(format_celsius(0.0), "-273.15");
        assert_eq!(format_celsius(273.15), "0.00");
        assert_eq!(format_celsius(273.154), "0.00");
    }

    #[test]
    fn icon_url_is_deterministic() {
        let a = icon_url("http://openweathermap.org/img/w", "01d");
        let b = icon_url("http://openweathermap.org/img/w", "01d");

        assert_eq!(a, b);
        assert_eq!(a, "http://openweathermap.org/img/w/01d.png");
    }

    #[test]
    fn icon_url_tolerates_trailing_slash() {
        assert_eq!(icon_url("http://host/img/", "10n"), "http://host/img/10n.png");
    }

    #[test]
    fn readout_derives_all_fields() {
        let snap = WeatherSnapshot {
            location: Some("Testville".into()),
            temperature: Some(300.0),
            description: Some("clear sky".into()),
            icon: Some("01d".into()),
        };

        let readout = Readout::derive(&snap, "http://openweathermap.org/img/w");

        assert_eq!(readout.location.as_deref(), Some("Testville"));
        assert_eq!(readout.temperature.as_deref(), Some("26.85 °C"));
        assert_eq!(readout.description.as_deref(), Some("clear sky"));
        assert!(readout.icon_url.as_deref().is_some_and(|u| u.ends_with("01d.png")));
    }

    #[test]
    fn readout_keeps_absent_fields_absent() {
        let snap = WeatherSnapshot { location: Some("Testville".into()), ..Default::default() };

        let readout = Readout::derive(&snap, "http://host/img");

        assert_eq!(readout.temperature, None);
        assert_eq!(readout.description, None);
        assert_eq!(readout.icon_url, None);
    }
}
