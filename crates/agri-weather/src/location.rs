//! Device location: provider seam plus a watch that publishes changes.

use crate::types::{Location, LocationError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// How often a watch re-queries its provider.
pub const WATCH_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Position request options, mirroring a high-accuracy device watch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix that may be returned; zero forces a fresh one
    pub maximum_age: Duration,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(5),
            maximum_age: Duration::ZERO,
        }
    }
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self, options: &LocationOptions)
        -> Result<Location, LocationError>;
}

/// Coordinates taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationProvider {
    location: Location,
}

impl FixedLocationProvider {
    pub fn new(location: Location) -> Self {
        Self { location }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_position(&self, _: &LocationOptions) -> Result<Location, LocationError> {
        Ok(self.location)
    }
}

/// No geolocation backend on this platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLocationProvider;

#[async_trait]
impl LocationProvider for UnavailableLocationProvider {
    async fn current_position(&self, _: &LocationOptions) -> Result<Location, LocationError> {
        Err(LocationError::ServiceUnavailable)
    }
}

/// Latest known location plus any error from the last attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationState {
    pub location: Option<Location>,
    pub error: Option<String>,
    pub loading: bool,
}

impl Default for LocationState {
    fn default() -> Self {
        Self {
            location: None,
            error: None,
            loading: true,
        }
    }
}

impl LocationState {
    /// Apply a provider result. A failure keeps the last good fix.
    pub fn apply(&mut self, result: Result<Location, LocationError>) -> bool {
        let before = self.clone();
        match result {
            Ok(location) => {
                self.location = Some(location);
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e.advisory());
            }
        }
        self.loading = false;
        *self != before
    }
}

/// Spawn a task that keeps a `LocationState` current until `cancel` fires.
///
/// Receivers only wake when the state actually changes.
pub fn watch_location(
    provider: Arc<dyn LocationProvider>,
    options: LocationOptions,
    poll_interval: Duration,
    cancel: CancellationToken,
) -> watch::Receiver<LocationState> {
    let (tx, rx) = watch::channel(LocationState::default());

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Location watch cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let result = match tokio::time::timeout(
                        options.timeout,
                        provider.current_position(&options),
                    )
                    .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(LocationError::Timeout),
                    };

                    if let Err(e) = &result {
                        tracing::warn!("Location unavailable: {}", e);
                    }

                    tx.send_if_modified(|state| state.apply(result));

                    if tx.is_closed() {
                        break;
                    }
                }
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_default_options() {
        let options = LocationOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.maximum_age, Duration::ZERO);
    }

    #[test]
    fn test_error_keeps_last_fix() {
        let mut state = LocationState::default();
        let fix = Location::new(1.0, 2.0, 3.0);
        assert!(state.apply(Ok(fix)));
        assert!(state.apply(Err(LocationError::Timeout)));
        assert_eq!(state.location, Some(fix));
        assert_eq!(
            state.error.as_deref(),
            Some("Error getting location: Location request timed out")
        );
        assert!(!state.loading);
    }

    #[test]
    fn test_same_fix_is_not_a_change() {
        let mut state = LocationState::default();
        let fix = Location::new(1.0, 2.0, 3.0);
        assert!(state.apply(Ok(fix)));
        assert!(!state.apply(Ok(fix)));
    }

    #[tokio::test]
    async fn test_watch_publishes_fixed_location() {
        let cancel = CancellationToken::new();
        let fix = Location::new(-1.28, 36.82, 12.0);
        let mut rx = watch_location(
            Arc::new(FixedLocationProvider::new(fix)),
            LocationOptions::default(),
            WATCH_POLL_INTERVAL,
            cancel.clone(),
        );

        rx.changed().await.unwrap();
        let state = rx.borrow().clone();
        assert_eq!(state.location, Some(fix));
        assert!(!state.loading);
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_watch_reports_unavailable() {
        let cancel = CancellationToken::new();
        let mut rx = watch_location(
            Arc::new(UnavailableLocationProvider),
            LocationOptions::default(),
            WATCH_POLL_INTERVAL,
            cancel.clone(),
        );

        rx.changed().await.unwrap();
        let state = rx.borrow().clone();
        assert!(state.location.is_none());
        assert!(state.error.unwrap().contains("unavailable"));
        cancel.cancel();
    }
}
