//! Weather-search view state and the lookup cycle that fills it.
//!
//! One user action (a city submission or a geolocation request) opens a
//! request cycle identified by a [`Ticket`]. Both provider calls of a cycle
//! run concurrently and their results are applied together. A cycle whose
//! ticket is no longer the latest one issued is dropped on arrival, so a
//! slow response can never overwrite the outcome of a newer request.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use crate::{
    Config,
    error::{FetchError, SearchError},
    geolocation::Geolocator,
    model::{CityQuery, CurrentWeather, Forecast, Location},
    provider::{
        CurrentConditionsProvider, ForecastProvider, current_provider_from_config,
        forecast_provider_from_config, http_client,
    },
};

/// Identifies one request cycle; later cycles get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// What the current-conditions region shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "weather", rename_all = "snake_case")]
pub enum CurrentSlot {
    #[default]
    Empty,
    NotFound,
    Loaded(CurrentWeather),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchState {
    pub loading: bool,
    pub error: Option<SearchError>,
    pub location: Option<Location>,
    pub current: CurrentSlot,
    pub forecast: Option<Forecast>,
    /// Set when the forecast call failed while the rest of the cycle went through.
    pub forecast_error: Option<String>,
    #[serde(skip)]
    pub(crate) latest: u64,
}

impl SearchState {
    /// Open a new request cycle.
    pub fn begin(&mut self) -> Ticket {
        self.latest += 1;
        self.loading = true;
        self.error = None;
        self.current = CurrentSlot::Empty;
        self.forecast = None;
        self.forecast_error = None;
        Ticket(self.latest)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    /// Record a failure that does not involve any request.
    pub fn invalidate(&mut self, error: SearchError) {
        self.error = Some(error);
    }

    /// End a cycle without fetching anything. Returns `false` for a stale ticket.
    pub fn reject(&mut self, ticket: Ticket, error: SearchError) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }
        self.loading = false;
        self.error = Some(error);
        true
    }

    /// Apply both results of a cycle. Returns `false` for a stale ticket.
    pub fn apply(
        &mut self,
        ticket: Ticket,
        location: Location,
        forecast: Result<Forecast, FetchError>,
        current: Result<CurrentWeather, FetchError>,
    ) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }

        self.loading = false;

        match forecast {
            Ok(forecast) => self.forecast = Some(forecast),
            Err(err) => {
                tracing::warn!(%location, error = %err, "forecast lookup failed");
                self.forecast_error = Some(err.to_string());
            }
        }

        match current {
            Ok(weather) => self.current = CurrentSlot::Loaded(weather),
            Err(FetchError::NotFound) => {
                tracing::info!(%location, "no current conditions for location");
                self.current = CurrentSlot::NotFound;
            }
            Err(err) => {
                tracing::warn!(%location, error = %err, "current conditions lookup failed");
                self.error = Some(SearchError::Fetch(err.to_string()));
            }
        }

        self.location = Some(location);
        true
    }
}

/// The weather-search widget: two providers, a position source and shared view state.
#[derive(Debug, Clone)]
pub struct WeatherSearch {
    current: Arc<dyn CurrentConditionsProvider>,
    forecast: Arc<dyn ForecastProvider>,
    geolocator: Arc<dyn Geolocator>,
    state: Arc<Mutex<SearchState>>,
}

impl WeatherSearch {
    pub fn new(
        current: Arc<dyn CurrentConditionsProvider>,
        forecast: Arc<dyn ForecastProvider>,
        geolocator: Arc<dyn Geolocator>,
    ) -> Self {
        Self { current, forecast, geolocator, state: Arc::new(Mutex::new(SearchState::default())) }
    }

    pub fn from_config(config: &Config, geolocator: Arc<dyn Geolocator>) -> anyhow::Result<Self> {
        let http = http_client(config.http_timeout())?;
        let current = current_provider_from_config(config, http.clone())?;
        let forecast = forecast_provider_from_config(config, http)?;
        Ok(Self::new(current, forecast, geolocator))
    }

    pub fn snapshot(&self) -> SearchState {
        self.state.lock().clone()
    }

    /// Look up a typed city. Blank input only sets the validation error.
    pub async fn search_city(&self, input: &str) -> SearchState {
        let city = match CityQuery::parse(input) {
            Ok(city) => city,
            Err(err) => {
                self.state.lock().invalidate(err);
                return self.snapshot();
            }
        };

        let ticket = self.state.lock().begin();
        self.run(ticket, Location::City(city)).await;
        self.snapshot()
    }

    /// Look up the weather where the user is.
    pub async fn search_here(&self) -> SearchState {
        let ticket = self.state.lock().begin();

        match self.geolocator.locate().await {
            Ok(coords) => self.run(ticket, Location::Coordinates(coords)).await,
            Err(err) => {
                tracing::info!(error = %err, "geolocation unavailable");
                self.state.lock().reject(ticket, err.into());
            }
        }

        self.snapshot()
    }

    async fn run(&self, ticket: Ticket, location: Location) {
        tracing::debug!(ticket = ticket.0, %location, "starting lookup");

        let (forecast, current) =
            tokio::join!(self.forecast.forecast(&location), self.current.current(&location));

        let applied = self.state.lock().apply(ticket, location, forecast, current);
        if !applied {
            tracing::debug!(ticket = ticket.0, "discarding response of a superseded request");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::GeolocationError,
        geolocation::{FixedGeolocator, UnsupportedGeolocator},
        model::{Condition, Coordinates, ForecastDay},
    };
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn weather_for(name: &str) -> CurrentWeather {
        CurrentWeather {
            location_name: name.to_string(),
            coordinates: None,
            temperature: 20.0,
            feels_like: 19.0,
            humidity_pct: 40,
            wind_speed: 2.0,
            visibility: Some(10000),
            description: "ясно".to_string(),
            icon: "01d".to_string(),
            observation_time: Utc.timestamp_opt(1744621200, 0).unwrap(),
        }
    }

    fn forecast_for(name: &str) -> Forecast {
        Forecast {
            location_name: name.to_string(),
            days: vec![ForecastDay {
                date: NaiveDate::from_ymd_opt(2025, 4, 14).unwrap(),
                min_temp: 5.0,
                max_temp: 15.0,
                avg_temp: 10.0,
                condition: Condition { text: "ясно".into(), icon: String::new() },
            }],
        }
    }

    fn name_of(location: &Location) -> String {
        match location {
            Location::City(city) => city.as_str().to_string(),
            Location::Coordinates(_) => "Here".to_string(),
        }
    }

    /// Current-conditions fake; "Slowtown" waits on the gate, "Nowhere" is unknown,
    /// "Broken" fails.
    #[derive(Debug, Default)]
    struct FakeCurrent {
        calls: AtomicUsize,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl CurrentConditionsProvider for FakeCurrent {
        async fn current(&self, location: &Location) -> Result<CurrentWeather, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = name_of(location);
            match name.as_str() {
                "Slowtown" => {
                    self.gate.notified().await;
                    Ok(weather_for(&name))
                }
                "Nowhere" => Err(FetchError::NotFound),
                "Broken" => Err(FetchError::malformed(
                    crate::provider::ProviderId::OpenWeather,
                    "boom",
                )),
                _ => Ok(weather_for(&name)),
            }
        }
    }

    /// Forecast fake; "Stormy" fails.
    #[derive(Debug, Default)]
    struct FakeForecast {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ForecastProvider for FakeForecast {
        async fn forecast(&self, location: &Location) -> Result<Forecast, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = name_of(location);
            if name == "Stormy" {
                return Err(FetchError::malformed(crate::provider::ProviderId::WeatherApi, "boom"));
            }
            Ok(forecast_for(&name))
        }
    }

    #[derive(Debug)]
    struct DeniedGeolocator;

    #[async_trait]
    impl Geolocator for DeniedGeolocator {
        async fn locate(&self) -> Result<Coordinates, GeolocationError> {
            Err(GeolocationError::Denied)
        }
    }

    struct Harness {
        search: WeatherSearch,
        current: Arc<FakeCurrent>,
        forecast: Arc<FakeForecast>,
    }

    fn harness(geolocator: Arc<dyn Geolocator>) -> Harness {
        let current = Arc::new(FakeCurrent::default());
        let forecast = Arc::new(FakeForecast::default());
        let search = WeatherSearch::new(current.clone(), forecast.clone(), geolocator);
        Harness { search, current, forecast }
    }

    impl Harness {
        fn calls(&self) -> usize {
            self.current.calls.load(Ordering::SeqCst) + self.forecast.calls.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn blank_city_never_fetches() {
        let h = harness(Arc::new(UnsupportedGeolocator));

        for input in ["", "   ", "\t\n"] {
            let state = h.search.search_city(input).await;
            assert_eq!(state.error, Some(SearchError::EmptyCity));
            assert!(!state.loading);
        }
        assert_eq!(h.calls(), 0);
    }

    #[tokio::test]
    async fn city_lookup_fills_both_regions() {
        let h = harness(Arc::new(UnsupportedGeolocator));

        let state = h.search.search_city("  Kazan ").await;

        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.current, CurrentSlot::Loaded(weather_for("Kazan")));
        assert_eq!(state.forecast, Some(forecast_for("Kazan")));
        assert_eq!(state.location, Some(Location::City(CityQuery::parse("Kazan").unwrap())));
        assert_eq!(h.calls(), 2);
    }

    #[tokio::test]
    async fn unknown_city_marks_not_found() {
        let h = harness(Arc::new(UnsupportedGeolocator));

        let state = h.search.search_city("Nowhere").await;

        assert_eq!(state.current, CurrentSlot::NotFound);
        assert_eq!(state.error, None);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn current_failure_sets_generic_error() {
        let h = harness(Arc::new(UnsupportedGeolocator));

        let state = h.search.search_city("Broken").await;

        assert!(matches!(state.error, Some(SearchError::Fetch(_))));
        assert_eq!(state.current, CurrentSlot::Empty);
        assert!(state.forecast.is_some());
    }

    #[tokio::test]
    async fn forecast_failure_keeps_current_conditions() {
        let h = harness(Arc::new(UnsupportedGeolocator));

        let state = h.search.search_city("Stormy").await;

        assert_eq!(state.current, CurrentSlot::Loaded(weather_for("Stormy")));
        assert_eq!(state.forecast, None);
        assert!(state.forecast_error.is_some());
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn denied_geolocation_never_fetches() {
        let h = harness(Arc::new(DeniedGeolocator));

        let state = h.search.search_here().await;

        assert_eq!(state.error, Some(SearchError::GeolocationDenied));
        assert!(!state.loading);
        assert_eq!(h.calls(), 0);
    }

    #[tokio::test]
    async fn unsupported_geolocation_has_its_own_error() {
        let h = harness(Arc::new(UnsupportedGeolocator));

        let state = h.search.search_here().await;

        assert_eq!(state.error, Some(SearchError::GeolocationUnsupported));
        assert!(!state.loading);
        assert_eq!(h.calls(), 0);
    }

    #[tokio::test]
    async fn geolocation_looks_up_coordinates() {
        let here = Coordinates::new(55.75, 37.62);
        let h = harness(Arc::new(FixedGeolocator(here)));

        let state = h.search.search_here().await;

        assert_eq!(state.location, Some(Location::Coordinates(here)));
        assert_eq!(state.current, CurrentSlot::Loaded(weather_for("Here")));
        assert_eq!(h.calls(), 2);
    }

    #[tokio::test]
    async fn stale_response_does_not_overwrite_newer_request() {
        let h = harness(Arc::new(UnsupportedGeolocator));
        let gate = h.current.gate.clone();

        let slow = h.search.search_city("Slowtown");
        let fast = async {
            let state = h.search.search_city("Fasttown").await;
            gate.notify_one();
            state
        };
        let (_, fast_state) = tokio::join!(slow, fast);

        assert_eq!(fast_state.current, CurrentSlot::Loaded(weather_for("Fasttown")));

        let final_state = h.search.snapshot();
        assert_eq!(final_state.current, CurrentSlot::Loaded(weather_for("Fasttown")));
        assert_eq!(final_state.forecast, Some(forecast_for("Fasttown")));
        assert!(!final_state.loading);
    }

    #[test]
    fn loading_and_result_are_exclusive() {
        let mut state = SearchState::default();

        let ticket = state.begin();
        assert!(state.loading);
        assert_eq!(state.current, CurrentSlot::Empty);

        assert!(state.apply(
            ticket,
            Location::City(CityQuery::parse("Kazan").unwrap()),
            Ok(forecast_for("Kazan")),
            Ok(weather_for("Kazan")),
        ));
        assert!(!state.loading);
        assert!(matches!(state.current, CurrentSlot::Loaded(_)));
    }

    #[test]
    fn stale_ticket_is_rejected() {
        let mut state = SearchState::default();

        let old = state.begin();
        let new = state.begin();
        assert!(old < new);

        assert!(!state.reject(old, SearchError::GeolocationDenied));
        assert!(state.loading);
        assert_eq!(state.error, None);

        assert!(state.reject(new, SearchError::GeolocationDenied));
        assert!(!state.loading);
    }
}
