//! Centralized application services.
//!
//! `AppServices` is built once at startup from `Config` and owns every client
//! and store. Workflow models borrow what they need from it; nothing is
//! global.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use agri_core::Config;
use agri_imagery::CropImageResolver;
use agri_services::{FileKeyValueStore, GeminiClient, KeyValueStore, ScanHistory, WebSearchClient};
use agri_weather::{
    watch_location, EnvironmentAggregator, FixedLocationProvider, LastScanSource, Location,
    LocationOptions, LocationProvider, LocationState, SatelliteClient,
    UnavailableLocationProvider, WeatherProvider, WATCH_POLL_INTERVAL,
};

/// Feeds the dashboard's "last scan" from the persisted history.
pub struct HistoryLastScan(ScanHistory);

impl HistoryLastScan {
    pub fn new(history: ScanHistory) -> Self {
        Self(history)
    }
}

impl LastScanSource for HistoryLastScan {
    fn last_scan_at(&self) -> Option<DateTime<Utc>> {
        self.0.latest_capture()
    }
}

fn minutes(value: u32) -> Duration {
    Duration::from_secs(u64::from(value.max(1)) * 60)
}

pub struct AppServices {
    config: Config,

    /// Generative AI client shared by all workflows
    gemini: GeminiClient,

    weather: Arc<WeatherProvider>,

    /// `None` when satellite data is disabled
    satellite: Option<SatelliteClient>,

    search: Arc<WebSearchClient>,

    history: ScanHistory,

    /// Session image cache; lives as long as the services
    images: Arc<CropImageResolver>,

    location: Arc<dyn LocationProvider>,

    /// Cancels background watches on shutdown
    shutdown: CancellationToken,
}

impl AppServices {
    /// Build services with history stored under the configured data directory.
    pub fn from_config(config: Config) -> Result<Self> {
        let data_dir = config.storage.effective_data_dir();
        let store = FileKeyValueStore::new(&data_dir)
            .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
        tracing::info!("Scan history stored in {:?}", store.dir());
        Self::with_store(config, Arc::new(store))
    }

    /// Build services over an explicit key-value store.
    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let gemini = GeminiClient::with_base_url(
            config.ai.api_key.as_str(),
            config.ai.model.as_str(),
            config.ai.base_url.as_str(),
        )
        .context("Failed to create Gemini client")?;

        let weather = WeatherProvider::with_base_url(
            config.weather.api_key.as_str(),
            config.weather.base_url.as_str(),
        )
        .context("Failed to create weather provider")?;

        let satellite = if config.satellite.enabled {
            Some(
                SatelliteClient::with_base_url(config.satellite.base_url.as_str())
                    .context("Failed to create satellite client")?,
            )
        } else {
            None
        };

        let search = WebSearchClient::with_base_url(
            config.search.api_key.as_str(),
            config.search.engine_id.as_str(),
            config.search.base_url.as_str(),
        )
        .context("Failed to create search client")?;

        let location: Arc<dyn LocationProvider> = match config.location.coordinates() {
            Some((latitude, longitude)) => {
                let accuracy = config.location.accuracy_meters.unwrap_or(0.0);
                tracing::info!("Using configured location {}, {}", latitude, longitude);
                Arc::new(FixedLocationProvider::new(Location::new(
                    latitude, longitude, accuracy,
                )))
            }
            None => {
                tracing::info!("No location configured, weather uses the default city");
                Arc::new(UnavailableLocationProvider)
            }
        };

        Ok(Self {
            gemini,
            weather: Arc::new(weather),
            satellite,
            search: Arc::new(search),
            history: ScanHistory::new(store),
            images: Arc::new(CropImageResolver::new()),
            location,
            shutdown: CancellationToken::new(),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gemini(&self) -> &GeminiClient {
        &self.gemini
    }

    pub fn weather(&self) -> Arc<WeatherProvider> {
        Arc::clone(&self.weather)
    }

    pub fn satellite(&self) -> Option<&SatelliteClient> {
        self.satellite.as_ref()
    }

    pub fn search(&self) -> Arc<WebSearchClient> {
        Arc::clone(&self.search)
    }

    pub fn history(&self) -> &ScanHistory {
        &self.history
    }

    pub fn images(&self) -> Arc<CropImageResolver> {
        Arc::clone(&self.images)
    }

    pub fn satellite_refresh_interval(&self) -> Duration {
        minutes(self.config.satellite.refresh_minutes)
    }

    /// Aggregator over the weather provider and scan history.
    pub fn environment_aggregator(&self) -> Arc<EnvironmentAggregator> {
        let aggregator = EnvironmentAggregator::new(
            self.weather(),
            Arc::new(HistoryLastScan::new(self.history.clone())),
            self.config.weather.default_city.clone(),
        )
        .with_refresh_interval(minutes(self.config.weather.refresh_minutes));
        Arc::new(aggregator)
    }

    /// Start watching the device location. Stops on `shutdown`.
    pub fn watch_location(&self) -> watch::Receiver<LocationState> {
        watch_location(
            Arc::clone(&self.location),
            LocationOptions::default(),
            WATCH_POLL_INTERVAL,
            self.shutdown.child_token(),
        )
    }

    pub fn shutdown(&self) {
        tracing::info!("Shutting down background services");
        self.shutdown.cancel();
    }
}

impl Drop for AppServices {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
