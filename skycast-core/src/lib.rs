//! Core library for the `skycast` live weather panel.
//!
//! This crate defines:
//! - Configuration for the two fixed endpoint hosts
//! - Geolocation resolution
//! - The one-shot weather fetch and the push-update subscription
//! - The panel state machine and presentation derivation
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod fetch;
pub mod live;
pub mod location;
pub mod model;
pub mod panel;
pub mod view;

pub use config::Config;
pub use error::{ChannelError, FetchError, LocationError};
pub use fetch::WeatherFetcher;
pub use live::{Subscription, UPDATE_EVENT, UpdateChannel};
pub use location::{FixedLocationResolver, IpLocationResolver, LocationResolver};
pub use model::{GeoCoordinate, WeatherSnapshot};
pub use panel::{FetchFailure, Notice, Notifier, PanelEvent, PanelState, Phase, run_panel};
pub use view::{Readout, format_celsius, icon_url, kelvin_to_celsius};

// Re-exported so binaries can drive `run_panel` without depending on
// tokio-util themselves.
pub use tokio_util::sync::CancellationToken;
