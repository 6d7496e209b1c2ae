//! Google Custom Search (web results) for farming questions.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;
use url::Url;

const GOOGLE_API_BASE: &str = "https://www.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_NUM_RESULTS: u8 = 5;
/// The API returns at most ten results per request.
pub const MAX_RESULTS: u8 = 10;

const PLACEHOLDER_API_KEY: &str = "your_google_api_key_here";
const PLACEHOLDER_ENGINE_ID: &str = "your_search_engine_id_here";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub display_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_url: Option<String>,
}

#[derive(Error, Debug)]
pub enum WebSearchError {
    #[error("Google API key not configured")]
    MissingApiKey,

    #[error("Google Search Engine ID not configured")]
    MissingEngineId,

    #[error("Google API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Invalid search URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl WebSearchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingApiKey | Self::MissingEngineId => {
                "Web search is not configured. Add a Google API key and search engine ID."
            }
            Self::Network(_) => "Network error. Check your connection.",
            _ => "Search failed. Please try again.",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebSearchResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
    search_information: Option<SearchInformation>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchInformation {
    search_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: u16,
    message: String,
}

fn is_placeholder(value: &str, placeholder: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == placeholder
}

pub struct WebSearchClient {
    client: reqwest::Client,
    api_key: String,
    engine_id: String,
    base_url: String,
}

impl WebSearchClient {
    pub fn new(
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
    ) -> Result<Self, WebSearchError> {
        Self::with_base_url(api_key, engine_id, GOOGLE_API_BASE)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, WebSearchError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        !is_placeholder(&self.api_key, PLACEHOLDER_API_KEY)
            && !is_placeholder(&self.engine_id, PLACEHOLDER_ENGINE_ID)
    }

    /// Search, surfacing configuration and API errors.
    #[instrument(skip(self), level = "info")]
    pub async fn try_search(
        &self,
        query: &str,
        num_results: u8,
    ) -> Result<Vec<SearchResult>, WebSearchError> {
        if is_placeholder(&self.api_key, PLACEHOLDER_API_KEY) {
            return Err(WebSearchError::MissingApiKey);
        }
        if is_placeholder(&self.engine_id, PLACEHOLDER_ENGINE_ID) {
            return Err(WebSearchError::MissingEngineId);
        }

        let num = num_results.clamp(1, MAX_RESULTS).to_string();
        let url = Url::parse_with_params(
            &format!("{}/customsearch/v1", self.base_url),
            &[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ],
        )?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body: WebSearchResponse = response.json().await?;

        if let Some(err) = body.error {
            return Err(WebSearchError::Api {
                code: err.code,
                message: err.message,
            });
        }
        if !status.is_success() {
            return Err(WebSearchError::Api {
                code: status.as_u16(),
                message: status.to_string(),
            });
        }

        tracing::debug!(
            results = body.items.len(),
            search_time = body.search_information.and_then(|i| i.search_time),
            "Search complete"
        );
        Ok(body.items)
    }

    /// Search, returning an empty list on any failure.
    pub async fn search(&self, query: &str, num_results: u8) -> Vec<SearchResult> {
        match self.try_search(query, num_results).await {
            Ok(items) => {
                if items.is_empty() {
                    tracing::warn!("No results found");
                }
                items
            }
            Err(e @ (WebSearchError::MissingApiKey | WebSearchError::MissingEngineId)) => {
                tracing::warn!("{}", e);
                Vec::new()
            }
            Err(e) => {
                tracing::error!("Error searching Google: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn search_farming_info(&self, topic: &str) -> Vec<SearchResult> {
        self.search(&farming_query(topic), DEFAULT_NUM_RESULTS).await
    }

    pub async fn search_crop_info(&self, crop: &str, aspect: Option<&str>) -> Vec<SearchResult> {
        self.search(&crop_query(crop, aspect), DEFAULT_NUM_RESULTS).await
    }

    pub async fn search_weather_info(&self, place: &str, topic: Option<&str>) -> Vec<SearchResult> {
        self.search(&weather_query(place, topic), 3).await
    }

    pub async fn search_pest_info(&self, pest: &str, crop: Option<&str>) -> Vec<SearchResult> {
        self.search(&pest_query(pest, crop), DEFAULT_NUM_RESULTS).await
    }
}

pub fn farming_query(topic: &str) -> String {
    format!("{} farming agriculture", topic)
}

pub fn crop_query(crop: &str, aspect: Option<&str>) -> String {
    match aspect {
        Some(aspect) => format!("{} crop {} farming guide", crop, aspect),
        None => format!("{} crop farming guide cultivation", crop),
    }
}

pub fn weather_query(place: &str, topic: Option<&str>) -> String {
    match topic {
        Some(topic) => format!("{} {} weather climate agriculture", place, topic),
        None => format!("{} weather forecast farming", place),
    }
}

pub fn pest_query(pest: &str, crop: Option<&str>) -> String {
    match crop {
        Some(crop) => format!("{} {} crop treatment control prevention", pest, crop),
        None => format!("{} plant disease pest control treatment", pest),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn items_body() -> serde_json::Value {
        serde_json::json!({
            "items": [
                {"title": "Growing rice", "link": "https://a.example/rice", "snippet": "Paddy basics", "displayLink": "a.example"},
                {"title": "Rice pests", "link": "https://b.example/pests", "displayLink": "b.example", "formattedUrl": "b.example/pests"}
            ],
            "searchInformation": {"totalResults": "2", "searchTime": 0.21}
        })
    }

    #[test]
    fn test_query_builders() {
        assert_eq!(farming_query("soil pH"), "soil pH farming agriculture");
        assert_eq!(crop_query("rice", None), "rice crop farming guide cultivation");
        assert_eq!(crop_query("rice", Some("diseases")), "rice crop diseases farming guide");
        assert_eq!(weather_query("Kisumu", None), "Kisumu weather forecast farming");
        assert_eq!(
            weather_query("Kisumu", Some("rainfall")),
            "Kisumu rainfall weather climate agriculture"
        );
        assert_eq!(
            pest_query("aphids", Some("kale")),
            "aphids kale crop treatment control prevention"
        );
        assert_eq!(pest_query("blight", None), "blight plant disease pest control treatment");
    }

    #[tokio::test]
    async fn test_search_returns_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .and(query_param("key", "k"))
            .and(query_param("cx", "cx1"))
            .and(query_param("q", "rice farming agriculture"))
            .and(query_param("num", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(items_body()))
            .mount(&server)
            .await;

        let client = WebSearchClient::with_base_url("k", "cx1", server.uri()).unwrap();
        let results = client.search_farming_info("rice").await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].display_link, "a.example");
        assert_eq!(results[1].snippet, "");
        assert_eq!(results[1].formatted_url.as_deref(), Some("b.example/pests"));
    }

    #[tokio::test]
    async fn test_num_is_clamped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("num", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(items_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("num", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(items_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = WebSearchClient::with_base_url("k", "cx", server.uri()).unwrap();
        assert_eq!(client.search("x", 50).await.len(), 2);
        assert_eq!(client.search("x", 0).await.len(), 2);
    }

    #[tokio::test]
    async fn test_api_error_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"code": 403, "message": "Daily limit exceeded"}
            })))
            .mount(&server)
            .await;

        let client = WebSearchClient::with_base_url("k", "cx", server.uri()).unwrap();
        assert!(client.search("x", 5).await.is_empty());
        let err = client.try_search("x", 5).await.unwrap_err();
        assert!(matches!(err, WebSearchError::Api { code: 403, .. }));
    }

    #[tokio::test]
    async fn test_placeholder_keys_skip_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(items_body()))
            .expect(0)
            .mount(&server)
            .await;

        let client = WebSearchClient::with_base_url(
            "your_google_api_key_here",
            "cx",
            server.uri(),
        )
        .unwrap();
        assert!(!client.is_configured());
        assert!(client.search("x", 5).await.is_empty());

        let client = WebSearchClient::with_base_url("k", "  ", server.uri()).unwrap();
        assert!(matches!(
            client.try_search("x", 5).await,
            Err(WebSearchError::MissingEngineId)
        ));
    }
}
