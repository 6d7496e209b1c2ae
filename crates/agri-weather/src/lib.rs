//! Field conditions for AgriGenius
//!
//! Current weather from OpenWeatherMap, device location watching, the
//! dashboard's environment aggregate, and NASA POWER satellite readings.

pub mod environment;
pub mod location;
pub mod precipitation;
pub mod provider;
pub mod satellite;
pub mod types;

pub use types::*;
pub use environment::{
    format_last_scan, EnvironmentAggregator, EnvironmentObserver, EnvironmentState,
    EnvironmentView, LastScanSource, NoScanHistory, NO_SCANS_YET,
};
pub use location::{
    watch_location, FixedLocationProvider, LocationOptions, LocationProvider, LocationState,
    UnavailableLocationProvider, WATCH_POLL_INTERVAL,
};
pub use provider::{WeatherProvider, WeatherSource};
pub use satellite::{
    SatelliteClient, SatelliteError, SatelliteReading, SatelliteState, SIMULATED_ADVISORY,
};
