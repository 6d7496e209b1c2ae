//! Precipitation derivation for current-weather responses.
//!
//! OpenWeatherMap only includes `rain`/`snow` blocks while something is
//! actually falling, so a zero total is refined from the textual description.

use serde::Deserialize;

/// Rain or snow volume block (`{"1h": .., "3h": ..}`), millimetres.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
pub struct Volume {
    #[serde(rename = "1h")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h")]
    pub three_hours: Option<f64>,
}

impl Volume {
    /// Last-hour amount, else the three-hour amount, else zero.
    pub fn amount(&self) -> f64 {
        self.one_hour
            .filter(|v| *v != 0.0)
            .or(self.three_hours)
            .unwrap_or(0.0)
    }
}

/// Estimated millimetres for a description when the API reports no volume.
pub fn estimate_from_description(description: &str, main: &str) -> f64 {
    let description = description.to_lowercase();
    let main = main.to_lowercase();

    if description.contains("heavy rain") || main == "thunderstorm" {
        10.0
    } else if description.contains("moderate rain") {
        5.0
    } else if description.contains("light rain") || description.contains("drizzle") {
        2.0
    } else if description.contains("rain") || main == "rain" {
        3.0
    } else if description.contains("snow") {
        4.0
    } else {
        0.0
    }
}

/// Total precipitation in millimetres, rounded to one decimal.
pub fn derive(rain: Option<&Volume>, snow: Option<&Volume>, description: &str, main: &str) -> f64 {
    let measured = rain.map(Volume::amount).unwrap_or(0.0) + snow.map(Volume::amount).unwrap_or(0.0);

    let total = if measured == 0.0 {
        let estimate = estimate_from_description(description, main);
        tracing::debug!(
            description,
            estimate,
            "No precipitation volume reported, estimating from description"
        );
        estimate
    } else {
        measured
    };

    round_one_decimal(total)
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
