//! Environment aggregation: location + weather + last scan as one read model.
//!
//! A composition never fails. Weather errors fall back to static values and
//! location errors travel alongside the view as an advisory string, so a
//! consumer always sees either "loading" or a fully populated view.

use crate::location::LocationState;
use crate::provider::WeatherSource;
use crate::types::{Location, WeatherQuery, WeatherSnapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const NO_SCANS_YET: &str = "No scans yet";

/// Where the "last scan" instant comes from.
pub trait LastScanSource: Send + Sync {
    fn last_scan_at(&self) -> Option<DateTime<Utc>>;
}

/// No history available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScanHistory;

impl LastScanSource for NoScanHistory {
    fn last_scan_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// The dashboard's read model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentView {
    pub weather: WeatherSnapshot,
    pub location: Location,
    pub last_scan: String,
}

/// What an observer publishes.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentState {
    /// `None` only before the first composition
    pub view: Option<EnvironmentView>,
    pub loading: bool,
    /// Location advisory, if the last location attempt failed
    pub error: Option<String>,
}

impl Default for EnvironmentState {
    fn default() -> Self {
        Self {
            view: None,
            loading: true,
            error: None,
        }
    }
}

/// Render the time since the last scan, e.g. `"12m ago"` or `"3h ago"`.
pub fn format_last_scan(now: DateTime<Utc>, last: Option<DateTime<Utc>>) -> String {
    let Some(last) = last else {
        return NO_SCANS_YET.to_string();
    };

    let elapsed_ms = (now - last).num_milliseconds().max(0) as f64;
    let minutes = (elapsed_ms / 60_000.0).round();

    if minutes < 60.0 {
        format!("{}m ago", minutes as i64)
    } else {
        format!("{}h ago", (minutes / 60.0).round() as i64)
    }
}

pub struct EnvironmentAggregator {
    weather: Arc<dyn WeatherSource>,
    last_scan: Arc<dyn LastScanSource>,
    default_place: String,
    refresh_interval: Duration,
}

impl EnvironmentAggregator {
    pub fn new(
        weather: Arc<dyn WeatherSource>,
        last_scan: Arc<dyn LastScanSource>,
        default_place: impl Into<String>,
    ) -> Self {
        Self {
            weather,
            last_scan,
            default_place: default_place.into(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Compose one view. Never fails.
    pub async fn fetch(&self, location: Option<Location>) -> EnvironmentView {
        let location = Location::or_unknown(location);
        let query = WeatherQuery::for_location(&location, &self.default_place);

        let weather = match self.weather.current(&query).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!("Error fetching weather data: {}", e);
                tracing::warn!("Using fallback weather data");
                WeatherSnapshot::fallback()
            }
        };

        let last_scan = format_last_scan(Utc::now(), self.last_scan.last_scan_at());

        tracing::debug!(
            ?query,
            temperature = weather.temperature,
            last_scan = %last_scan,
            "Composed environment view"
        );

        EnvironmentView {
            weather,
            location,
            last_scan,
        }
    }

    /// Compose from a location state, carrying its advisory along.
    pub async fn compose(&self, location: &LocationState) -> EnvironmentState {
        let view = self.fetch(location.location).await;
        EnvironmentState {
            view: Some(view),
            loading: false,
            error: location.error.clone(),
        }
    }

    /// Recompute on every refresh tick and whenever the location changes.
    ///
    /// The background task stops when the returned observer is dropped.
    pub fn observe(
        self: Arc<Self>,
        mut location_rx: watch::Receiver<LocationState>,
    ) -> EnvironmentObserver {
        let (tx, rx) = watch::channel(EnvironmentState::default());
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.refresh_interval);
            let mut location_open = true;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        tracing::debug!("Environment refresh tick");
                    }
                    changed = location_rx.changed(), if location_open => {
                        if changed.is_err() {
                            tracing::debug!("Location watch closed, continuing on timer only");
                            location_open = false;
                            continue;
                        }
                        tracing::debug!("Location changed, recomposing environment");
                    }
                }

                let location = location_rx.borrow_and_update().clone();
                let state = self.compose(&location).await;

                // Last write wins; nobody listening means the view is gone.
                if tx.send(state).is_err() {
                    break;
                }
            }

            tracing::debug!("Environment observer stopped");
        });

        EnvironmentObserver {
            rx,
            cancel,
            handle: Some(handle),
        }
    }
}

/// Handle on a running environment refresh loop.
pub struct EnvironmentObserver {
    rx: watch::Receiver<EnvironmentState>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl EnvironmentObserver {
    /// Current state without waiting.
    pub fn state(&self) -> EnvironmentState {
        self.rx.borrow().clone()
    }

    /// Wait for the next published state.
    pub async fn next(&mut self) -> Option<EnvironmentState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the first composition has landed.
    pub async fn first_view(&mut self) -> Option<EnvironmentView> {
        loop {
            if let Some(view) = self.rx.borrow_and_update().view.clone() {
                return Some(view);
            }
            self.rx.changed().await.ok()?;
        }
    }

    /// Stop the refresh loop and wait for it to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Environment observer task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for EnvironmentObserver {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::types::WeatherError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSource {
        queries: Mutex<Vec<WeatherQuery>>,
        fail: bool,
    }

    #[async_trait]
    impl WeatherSource for RecordingSource {
        async fn current(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, WeatherError> {
            self.queries.lock().unwrap().push(query.clone());
            if self.fail {
                return Err(WeatherError::Status(500));
            }
            Ok(WeatherSnapshot {
                temperature: 31.0,
                humidity: 40,
                description: "few clouds".into(),
                icon: "02d".into(),
                precipitation: 0.0,
                cloud_cover: 15,
                wind_speed: 2.0,
                pressure: 1011,
            })
        }
    }

    struct FixedScan(DateTime<Utc>);

    impl LastScanSource for FixedScan {
        fn last_scan_at(&self) -> Option<DateTime<Utc>> {
            Some(self.0)
        }
    }

    fn aggregator(source: Arc<RecordingSource>) -> Arc<EnvironmentAggregator> {
        Arc::new(EnvironmentAggregator::new(source, Arc::new(NoScanHistory), "London"))
    }

    #[test]
    fn test_format_last_scan() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(format_last_scan(now, None), NO_SCANS_YET);
        assert_eq!(
            format_last_scan(now, Some(now - chrono::Duration::seconds(30))),
            "1m ago"
        );
        assert_eq!(
            format_last_scan(now, Some(now - chrono::Duration::minutes(59))),
            "59m ago"
        );
        assert_eq!(
            format_last_scan(now, Some(now - chrono::Duration::minutes(60))),
            "1h ago"
        );
        assert_eq!(
            format_last_scan(now, Some(now - chrono::Duration::minutes(100))),
            "2h ago"
        );
        // Clock skew never renders a negative age
        assert_eq!(
            format_last_scan(now, Some(now + chrono::Duration::minutes(5))),
            "0m ago"
        );
    }

    #[tokio::test]
    async fn test_fetch_without_location_uses_default_place() {
        let source = Arc::new(RecordingSource::default());
        let view = aggregator(source.clone()).fetch(None).await;

        assert_eq!(view.location, Location::UNKNOWN);
        assert_eq!(view.weather.temperature, 31.0);
        assert_eq!(view.last_scan, NO_SCANS_YET);
        assert_eq!(
            source.queries.lock().unwrap().as_slice(),
            &[WeatherQuery::Place("London".into())]
        );
    }

    #[tokio::test]
    async fn test_fetch_with_malformed_location_uses_sentinel() {
        let source = Arc::new(RecordingSource::default());
        let view = aggregator(source)
            .fetch(Some(Location::new(f64::INFINITY, 500.0, -1.0)))
            .await;
        assert_eq!(view.location, Location::UNKNOWN);
    }

    #[tokio::test]
    async fn test_weather_failure_falls_back() {
        let source = Arc::new(RecordingSource {
            fail: true,
            ..Default::default()
        });
        let view = aggregator(source)
            .fetch(Some(Location::new(10.0, 10.0, 5.0)))
            .await;

        assert_eq!(view.weather.temperature, 24.0);
        assert_eq!(view.weather.humidity, 65);
        assert_eq!(view.weather.description, "Clear sky");
        assert_eq!(view.weather.precipitation, 0.0);
        assert_eq!(view.location, Location::new(10.0, 10.0, 5.0));
    }

    #[tokio::test]
    async fn test_provider_server_error_falls_back() {
        use crate::provider::WeatherProvider;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let provider = WeatherProvider::with_base_url("k", server.uri()).unwrap();
        let aggregator =
            EnvironmentAggregator::new(Arc::new(provider), Arc::new(NoScanHistory), "London");
        let view = aggregator.fetch(None).await;
        assert_eq!(view.weather, WeatherSnapshot::fallback());
    }

    #[tokio::test]
    async fn test_last_scan_comes_from_source() {
        let source = Arc::new(RecordingSource::default());
        let scanned = Utc::now() - chrono::Duration::minutes(3 * 60);
        let aggregator =
            EnvironmentAggregator::new(source, Arc::new(FixedScan(scanned)), "London");
        let view = aggregator.fetch(None).await;
        assert_eq!(view.last_scan, "3h ago");
    }

    #[tokio::test]
    async fn test_compose_carries_location_advisory() {
        let source = Arc::new(RecordingSource::default());
        let location = LocationState {
            location: None,
            error: Some("Error getting location: Location permission denied".into()),
            loading: false,
        };
        let state = aggregator(source).compose(&location).await;
        assert!(!state.loading);
        assert_eq!(state.view.unwrap().weather.description, "few clouds");
        assert!(state.error.unwrap().contains("permission denied"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_observe_refreshes_without_returning_to_loading() {
        let source = Arc::new(RecordingSource::default());
        let (_location_tx, location_rx) = watch::channel(LocationState::default());

        let mut observer = aggregator(source.clone()).observe(location_rx);
        assert!(observer.state().loading);

        let first = observer.next().await.unwrap();
        assert!(!first.loading);
        assert!(first.view.is_some());

        tokio::time::advance(DEFAULT_REFRESH_INTERVAL).await;
        let second = observer.next().await.unwrap();
        assert!(!second.loading);
        assert!(source.queries.lock().unwrap().len() >= 2);

        observer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_observe_recomposes_on_location_change() {
        let source = Arc::new(RecordingSource::default());
        let (location_tx, location_rx) = watch::channel(LocationState::default());

        let mut observer = aggregator(source.clone()).observe(location_rx);
        let first = observer.next().await.unwrap();
        assert_eq!(first.view.unwrap().location, Location::UNKNOWN);

        let fix = Location::new(-1.28, 36.82, 8.0);
        location_tx.send_replace(LocationState {
            location: Some(fix),
            error: None,
            loading: false,
        });

        let second = observer.next().await.unwrap();
        assert_eq!(second.view.unwrap().location, fix);
        assert!(source
            .queries
            .lock()
            .unwrap()
            .contains(&WeatherQuery::Coordinates {
                latitude: -1.28,
                longitude: 36.82
            }));

        observer.shutdown().await;
    }
}
