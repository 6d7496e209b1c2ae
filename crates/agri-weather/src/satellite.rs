//! NASA POWER daily point data condensed into a field reading.
//!
//! NDVI is not measured; it is simulated from season and latitude.

use crate::types::Location;
use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::instrument;

const NASA_POWER_URL: &str = "https://power.larc.nasa.gov";
const REQUEST_TIMEOUT_SECS: u64 = 20;
const PARAMETERS: &str = "PRECTOTCORR,RH2M,T2M,CLOUD_AMT";
/// NASA POWER fill value for missing data
const FILL_VALUE: f64 = -999.0;
const LOOKBACK_DAYS: i64 = 7;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);
pub const SIMULATED_ADVISORY: &str = "Using simulated data - NASA API temporarily unavailable";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteReading {
    /// Normalized Difference Vegetation Index, 0..=1
    pub ndvi: f64,
    /// Percent
    pub soil_moisture: f64,
    /// Millimetres
    pub precipitation: f64,
    /// Percent
    pub cloud_cover: f64,
}

/// A reading plus the advisory shown when it had to be simulated.
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteState {
    pub reading: SatelliteReading,
    pub advisory: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SatelliteError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("NASA API error: {0}")]
    Status(u16),
    #[error("No parameter data in NASA response")]
    MissingParameters,
}

type Series = BTreeMap<String, f64>;

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: Option<PowerProperties>,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: Option<PowerParameters>,
}

#[derive(Debug, Deserialize)]
struct PowerParameters {
    #[serde(rename = "PRECTOTCORR")]
    precipitation: Option<Series>,
    #[serde(rename = "RH2M")]
    humidity: Option<Series>,
    #[serde(rename = "T2M")]
    temperature: Option<Series>,
    #[serde(rename = "CLOUD_AMT")]
    cloud_amount: Option<Series>,
}

/// Most recent value that isn't the fill value or negative.
fn latest_valid(series: Option<&Series>, default: f64) -> f64 {
    series
        .and_then(|s| {
            s.values()
                .rev()
                .copied()
                .find(|v| *v != FILL_VALUE && *v >= 0.0)
        })
        .unwrap_or(default)
}

/// Mean of values within 0..=100, ignoring fill values.
fn average_valid(series: Option<&Series>, default: f64) -> f64 {
    let Some(series) = series else {
        return default;
    };
    let valid: Vec<f64> = series
        .values()
        .copied()
        .filter(|v| *v != FILL_VALUE && (0.0..=100.0).contains(v))
        .collect();
    if valid.is_empty() {
        return default;
    }
    valid.iter().sum::<f64>() / valid.len() as f64
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Seasonal/latitude NDVI estimate. `month0` is zero-based (January = 0).
pub fn simulated_ndvi(location: &Location, month0: u32) -> f64 {
    let seasonal = (f64::from(month0) / 12.0 * 2.0 * std::f64::consts::PI).sin();
    let latitude = location.latitude.to_radians().cos();
    (0.6 + seasonal * 0.2 + latitude * 0.1).clamp(0.0, 1.0)
}

/// Reading used when the API is unreachable.
pub fn simulated_reading(location: &Location, today: NaiveDate) -> SatelliteReading {
    SatelliteReading {
        ndvi: simulated_ndvi(location, today.month0()),
        soil_moisture: 65.0,
        precipitation: 25.0,
        cloud_cover: 50.0,
    }
}

#[derive(Debug, Clone)]
pub struct SatelliteClient {
    client: Client,
    base_url: String,
}

impl SatelliteClient {
    pub fn new() -> Result<Self, SatelliteError> {
        Self::with_base_url(NASA_POWER_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, SatelliteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the last week of daily data ending `today` and condense it.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(
        &self,
        location: &Location,
        today: NaiveDate,
    ) -> Result<SatelliteReading, SatelliteError> {
        let start = today - ChronoDuration::days(LOOKBACK_DAYS);
        let url = format!("{}/api/temporal/daily/point", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("parameters", PARAMETERS.to_string()),
                ("community", "RE".to_string()),
                ("longitude", location.longitude.to_string()),
                ("latitude", location.latitude.to_string()),
                ("start", start.format("%Y%m%d").to_string()),
                ("end", today.format("%Y%m%d").to_string()),
                ("format", "JSON".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SatelliteError::Status(status.as_u16()));
        }

        let body: PowerResponse = response.json().await?;
        let params = body
            .properties
            .and_then(|p| p.parameter)
            .ok_or(SatelliteError::MissingParameters)?;

        let precipitation = latest_valid(params.precipitation.as_ref(), 0.0);
        let humidity = average_valid(params.humidity.as_ref(), 65.0);
        let cloud_cover = average_valid(params.cloud_amount.as_ref(), 50.0);
        let temperature = average_valid(params.temperature.as_ref(), 24.0);

        let soil_moisture = (precipitation * 5.0 + humidity * 0.3).clamp(0.0, 100.0);

        tracing::debug!(
            precipitation,
            humidity,
            cloud_cover,
            temperature,
            soil_moisture,
            "Processed NASA POWER data"
        );

        Ok(SatelliteReading {
            ndvi: simulated_ndvi(location, today.month0()),
            soil_moisture: round_to(soil_moisture, 1),
            precipitation: round_to(precipitation, 2),
            cloud_cover: round_to(cloud_cover, 1),
        })
    }

    /// Fetch for today, substituting a simulated reading on any failure.
    pub async fn fetch_or_simulated(&self, location: &Location) -> SatelliteState {
        let today = Utc::now().date_naive();
        match self.fetch(location, today).await {
            Ok(reading) => SatelliteState {
                reading,
                advisory: None,
            },
            Err(e) => {
                tracing::error!("Error fetching satellite data: {}", e);
                SatelliteState {
                    reading: simulated_reading(location, today),
                    advisory: Some(SIMULATED_ADVISORY.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn series(pairs: &[(&str, f64)]) -> Series {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_latest_valid_skips_fill_values() {
        let s = series(&[("20260101", 1.5), ("20260102", 2.0), ("20260103", -999.0)]);
        assert_eq!(latest_valid(Some(&s), 0.0), 2.0);
        assert_eq!(latest_valid(None, 7.0), 7.0);
    }

    #[test]
    fn test_average_valid_ignores_out_of_range() {
        let s = series(&[("a", 60.0), ("b", 80.0), ("c", -999.0), ("d", 150.0)]);
        assert_eq!(average_valid(Some(&s), 65.0), 70.0);
        let empty = series(&[("a", -999.0)]);
        assert_eq!(average_valid(Some(&empty), 65.0), 65.0);
    }

    #[test]
    fn test_simulated_ndvi_is_clamped() {
        let equator = Location::new(0.0, 0.0, 1.0);
        // January: sin(0) = 0, cos(0) = 1 -> 0.7
        assert!((simulated_ndvi(&equator, 0) - 0.7).abs() < 1e-9);
        // April: sin(pi/2) = 1 -> 0.9
        assert!((simulated_ndvi(&equator, 3) - 0.9).abs() < 1e-9);
        for month in 0..12 {
            let v = simulated_ndvi(&Location::new(89.0, 0.0, 1.0), month);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[tokio::test]
    async fn test_fetch_condenses_series() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/temporal/daily/point"))
            .and(query_param("start", "20260103"))
            .and(query_param("end", "20260110"))
            .and(query_param("community", "RE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": {
                    "parameter": {
                        "PRECTOTCORR": {"20260108": 1.234, "20260109": 2.5, "20260110": -999.0},
                        "RH2M": {"20260108": 70.0, "20260109": 80.0},
                        "T2M": {"20260109": 21.0},
                        "CLOUD_AMT": {"20260109": 33.33, "20260110": -999.0}
                    }
                }
            })))
            .mount(&mock_server)
            .await;

        let client = SatelliteClient::with_base_url(mock_server.uri()).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let reading = client
            .fetch(&Location::new(0.0, 30.0, 5.0), today)
            .await
            .unwrap();

        assert_eq!(reading.precipitation, 2.5);
        // 2.5 * 5 + 75 * 0.3 = 35.0
        assert_eq!(reading.soil_moisture, 35.0);
        assert_eq!(reading.cloud_cover, 33.3);
        assert!((reading.ndvi - 0.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_failure_returns_simulated_reading() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = SatelliteClient::with_base_url(mock_server.uri()).unwrap();
        let state = client
            .fetch_or_simulated(&Location::new(10.0, 10.0, 1.0))
            .await;

        assert_eq!(state.advisory.as_deref(), Some(SIMULATED_ADVISORY));
        assert_eq!(state.reading.soil_moisture, 65.0);
    }

    #[tokio::test]
    async fn test_missing_parameters_is_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "properties": {}
            })))
            .mount(&mock_server)
            .await;

        let client = SatelliteClient::with_base_url(mock_server.uri()).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let result = client.fetch(&Location::new(1.0, 1.0, 1.0), today).await;
        assert!(matches!(result, Err(SatelliteError::MissingParameters)));
    }
}
