//! Dashboard: live environment plus satellite readings for the current location.

use std::fmt::Write;

use agri_weather::{
    EnvironmentObserver, EnvironmentState, EnvironmentView, Location, LocationState,
    SatelliteClient, SatelliteState,
};
use tokio::sync::watch;

use crate::services::AppServices;

pub struct DashboardModel {
    observer: EnvironmentObserver,
    location_rx: watch::Receiver<LocationState>,
    satellite: Option<SatelliteClient>,
    satellite_state: Option<SatelliteState>,
}

impl DashboardModel {
    /// Start the location watch and environment refresh loop.
    pub fn start(services: &AppServices) -> Self {
        let location_rx = services.watch_location();
        let observer = services
            .environment_aggregator()
            .observe(location_rx.clone());
        Self {
            observer,
            location_rx,
            satellite: services.satellite().cloned(),
            satellite_state: None,
        }
    }

    pub fn state(&self) -> EnvironmentState {
        self.observer.state()
    }

    pub async fn wait_for_view(&mut self) -> Option<EnvironmentView> {
        self.observer.first_view().await
    }

    pub async fn next_state(&mut self) -> Option<EnvironmentState> {
        self.observer.next().await
    }

    fn current_location(&self) -> Option<Location> {
        self.location_rx
            .borrow()
            .location
            .filter(|location| !location.is_unknown())
    }

    /// Refresh satellite data; `None` when disabled or no location is known yet.
    pub async fn refresh_satellite(&mut self) -> Option<&SatelliteState> {
        let location = self.current_location()?;
        let client = self.satellite.as_ref()?;
        let state = client.fetch_or_simulated(&location).await;
        self.satellite_state = Some(state);
        self.satellite_state.as_ref()
    }

    pub fn satellite_state(&self) -> Option<&SatelliteState> {
        self.satellite_state.as_ref()
    }

    pub async fn shutdown(self) {
        self.observer.shutdown().await;
    }
}

fn push_view(out: &mut String, view: &EnvironmentView) {
    let w = &view.weather;
    let _ = writeln!(out, "{:.0}°C  {}", w.temperature, w.description);
    let _ = writeln!(
        out,
        "Humidity {}%  Precipitation {:.1} mm  Cloud cover {}%",
        w.humidity, w.precipitation, w.cloud_cover
    );
    let _ = writeln!(
        out,
        "Wind {:.1} m/s  Pressure {} hPa",
        w.wind_speed, w.pressure
    );

    if view.location.is_unknown() {
        let _ = writeln!(out, "Location: unknown");
    } else {
        let _ = writeln!(
            out,
            "Location: {:.4}, {:.4} (±{:.0} m)",
            view.location.latitude, view.location.longitude, view.location.accuracy
        );
    }
    let _ = writeln!(out, "Last scan: {}", view.last_scan);
}

/// Plain-text dashboard for a terminal.
pub fn render(state: &EnvironmentState, satellite: Option<&SatelliteState>) -> String {
    let mut out = String::new();

    match &state.view {
        Some(view) => push_view(&mut out, view),
        None => out.push_str("Loading environment...\n"),
    }
    if state.loading && state.view.is_some() {
        out.push_str("Refreshing...\n");
    }
    if let Some(error) = &state.error {
        let _ = writeln!(out, "! {}", error);
    }

    if let Some(sat) = satellite {
        let r = &sat.reading;
        let _ = writeln!(
            out,
            "Satellite: NDVI {:.2}  Soil moisture {:.1}%  Rain {:.2} mm  Clouds {:.1}%",
            r.ndvi, r.soil_moisture, r.precipitation, r.cloud_cover
        );
        if let Some(advisory) = &sat.advisory {
            let _ = writeln!(out, "! {}", advisory);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use agri_weather::{SatelliteReading, WeatherSnapshot, SIMULATED_ADVISORY};

    fn view(location: Location) -> EnvironmentView {
        EnvironmentView {
            weather: WeatherSnapshot::fallback(),
            location,
            last_scan: "2 hours ago".to_string(),
        }
    }

    #[test]
    fn test_render_loading() {
        let out = render(&EnvironmentState::default(), None);
        assert_eq!(out, "Loading environment...\n");
    }

    #[test]
    fn test_render_unknown_location_with_advisory() {
        let state = EnvironmentState {
            view: Some(view(Location::UNKNOWN)),
            loading: false,
            error: Some("Error getting location: Location permission denied".to_string()),
        };
        let out = render(&state, None);
        assert!(out.contains("24°C"));
        assert!(out.contains("Clear sky"));
        assert!(out.contains("Humidity 65%"));
        assert!(out.contains("Location: unknown"));
        assert!(out.contains("Last scan: 2 hours ago"));
        assert!(out.contains("! Error getting location: Location permission denied"));
        assert!(!out.contains("Satellite"));
    }

    #[test]
    fn test_render_satellite_with_simulated_advisory() {
        let state = EnvironmentState {
            view: Some(view(Location::new(-0.0917, 34.768, 12.0))),
            loading: false,
            error: None,
        };
        let sat = SatelliteState {
            reading: SatelliteReading {
                ndvi: 0.42,
                soil_moisture: 65.0,
                precipitation: 25.0,
                cloud_cover: 50.0,
            },
            advisory: Some(SIMULATED_ADVISORY.to_string()),
        };
        let out = render(&state, Some(&sat));
        assert!(out.contains("Location: -0.0917, 34.7680 (±12 m)"));
        assert!(out.contains("Satellite: NDVI 0.42  Soil moisture 65.0%"));
        assert!(out.contains(SIMULATED_ADVISORY));
    }
}
