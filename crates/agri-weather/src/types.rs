use serde::{Deserialize, Serialize};

/// Geographic location as reported by a device geolocation provider.
///
/// `Location::UNKNOWN` (all zeros) is the sentinel for "no fix obtained yet".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

impl Location {
    pub const UNKNOWN: Location = Location {
        latitude: 0.0,
        longitude: 0.0,
        accuracy: 0.0,
    };

    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
        }
    }

    /// True for the sentinel value.
    pub fn is_unknown(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0 && self.accuracy == 0.0
    }

    /// Finite coordinates inside the valid lat/lon ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Normalise a possibly missing or malformed fix into a usable location.
    ///
    /// Anything that is absent, non-finite, or out of range becomes the sentinel.
    pub fn or_unknown(location: Option<Location>) -> Location {
        match location {
            Some(loc) if loc.is_valid() => loc,
            _ => Location::UNKNOWN,
        }
    }
}

/// What the weather provider is asked about.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    Coordinates { latitude: f64, longitude: f64 },
    Place(String),
}

impl WeatherQuery {
    /// Coordinates when a real fix exists, else the default place name.
    pub fn for_location(location: &Location, default_place: &str) -> Self {
        if location.is_unknown() || !location.is_valid() {
            WeatherQuery::Place(default_place.to_string())
        } else {
            WeatherQuery::Coordinates {
                latitude: location.latitude,
                longitude: location.longitude,
            }
        }
    }
}

/// Current conditions. Immutable once fetched; replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Degrees Celsius, rounded to an integer
    pub temperature: f64,
    /// Relative humidity percent
    pub humidity: u8,
    pub description: String,
    /// Provider icon code (e.g. `01d`)
    pub icon: String,
    /// Millimetres, one decimal
    pub precipitation: f64,
    /// Cloud cover percent
    pub cloud_cover: u8,
    /// Metres per second, one decimal
    pub wind_speed: f64,
    /// Hectopascal
    pub pressure: u32,
}

impl WeatherSnapshot {
    /// Static values shown whenever the provider fails.
    pub fn fallback() -> Self {
        Self {
            temperature: 24.0,
            humidity: 65,
            description: "Clear sky".to_string(),
            icon: "01d".to_string(),
            precipitation: 0.0,
            cloud_cover: 20,
            wind_speed: 3.5,
            pressure: 1013,
        }
    }
}

/// Location service errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

impl LocationError {
    /// Advisory string surfaced on the environment view.
    pub fn advisory(&self) -> String {
        format!("Error getting location: {}", self)
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather API request failed: {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
}
