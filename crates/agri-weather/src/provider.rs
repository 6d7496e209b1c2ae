//! OpenWeatherMap current-weather provider.

use crate::precipitation::{self, Volume};
use crate::types::{WeatherError, WeatherQuery, WeatherSnapshot};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

const OPENWEATHER_URL: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Anything that can answer a current-weather query.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    weather: Vec<OwmCondition>,
    clouds: Option<OwmClouds>,
    wind: Option<OwmWind>,
    rain: Option<Volume>,
    snow: Option<Volume>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmClouds {
    all: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

impl OwmResponse {
    fn into_snapshot(self) -> Result<WeatherSnapshot, WeatherError> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Parse("response has no weather entries".into()))?;

        let precipitation = precipitation::derive(
            self.rain.as_ref(),
            self.snow.as_ref(),
            &condition.description,
            &condition.main,
        );

        Ok(WeatherSnapshot {
            temperature: self.main.temp.round(),
            humidity: clamp_percent(self.main.humidity),
            description: condition.description,
            icon: condition.icon,
            precipitation,
            cloud_cover: clamp_percent(self.clouds.map(|c| c.all).unwrap_or(0.0)),
            wind_speed: precipitation::round_one_decimal(
                self.wind.map(|w| w.speed).unwrap_or(0.0),
            ),
            pressure: self.main.pressure.max(0.0).round() as u32,
        })
    }
}

fn clamp_percent(value: f64) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl WeatherProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, OPENWEATHER_URL)
    }

    /// Point the provider at another host (tests, proxies).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Fetch current conditions for a query.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        let mut params: Vec<(&str, String)> = match query {
            WeatherQuery::Coordinates {
                latitude,
                longitude,
            } => vec![("lat", latitude.to_string()), ("lon", longitude.to_string())],
            WeatherQuery::Place(name) => vec![("q", name.clone())],
        };
        params.push(("units", "metric".to_string()));
        params.push(("appid", self.api_key.clone()));

        let response = self.client.get(&url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body: OwmResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        tracing::debug!(
            location = body.name.as_deref().unwrap_or("unknown"),
            temp = body.main.temp,
            humidity = body.main.humidity,
            "Weather API response"
        );

        body.into_snapshot()
    }
}

#[async_trait]
impl WeatherSource for WeatherProvider {
    async fn current(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch(query).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn owm_body() -> serde_json::Value {
        serde_json::json!({
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "main": {"temp": 18.6, "feels_like": 18.2, "pressure": 1009, "humidity": 82},
            "wind": {"speed": 4.12, "deg": 240},
            "clouds": {"all": 75},
            "rain": {"1h": 0.42},
            "name": "Nairobi"
        })
    }

    #[tokio::test]
    async fn test_fetch_by_coordinates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "-1.28"))
            .and(query_param("lon", "36.82"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(owm_body()))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::with_base_url("test-key", mock_server.uri()).unwrap();
        let snapshot = provider
            .fetch(&WeatherQuery::Coordinates {
                latitude: -1.28,
                longitude: 36.82,
            })
            .await
            .unwrap();

        assert_eq!(snapshot.temperature, 19.0);
        assert_eq!(snapshot.humidity, 82);
        assert_eq!(snapshot.description, "light rain");
        assert_eq!(snapshot.icon, "10d");
        assert_eq!(snapshot.precipitation, 0.4);
        assert_eq!(snapshot.cloud_cover, 75);
        assert_eq!(snapshot.wind_speed, 4.1);
        assert_eq!(snapshot.pressure, 1009);
    }

    #[tokio::test]
    async fn test_fetch_by_place_estimates_precipitation() {
        let mock_server = MockServer::start().await;

        let mut body = owm_body();
        body.as_object_mut().unwrap().remove("rain");
        body["weather"][0]["description"] = "moderate rain".into();

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "London"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::with_base_url("k", mock_server.uri()).unwrap();
        let snapshot = provider
            .fetch(&WeatherQuery::Place("London".into()))
            .await
            .unwrap();

        assert_eq!(snapshot.precipitation, 5.0);
    }

    #[tokio::test]
    async fn test_server_error_is_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::with_base_url("k", mock_server.uri()).unwrap();
        let result = provider.fetch(&WeatherQuery::Place("London".into())).await;
        assert!(matches!(result, Err(WeatherError::Status(500))));
    }

    #[tokio::test]
    async fn test_empty_weather_array_is_parse_error() {
        let mock_server = MockServer::start().await;

        let mut body = owm_body();
        body["weather"] = serde_json::json!([]);

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::with_base_url("k", mock_server.uri()).unwrap();
        let result = provider.fetch(&WeatherQuery::Place("x".into())).await;
        assert!(matches!(result, Err(WeatherError::Parse(_))));
    }
}
