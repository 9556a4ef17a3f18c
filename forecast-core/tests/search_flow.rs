//! End-to-end lookups through `WeatherSearch` against mock provider servers.

use std::sync::Arc;

use forecast_core::{
    Config, CurrentSlot, FixedGeolocator, Lang, ProviderId, SearchError, Theme, Units,
    UnsupportedGeolocator, WeatherSearch, model::Coordinates, render::render,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    let mut cfg = Config::default();
    cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OW_KEY".into());
    cfg.upsert_provider_api_key(ProviderId::WeatherApi, "WA_KEY".into());
    cfg.endpoints.openweather = Some(server.uri());
    cfg.endpoints.weatherapi = Some(server.uri());
    cfg
}

fn forecast_body() -> serde_json::Value {
    let days: Vec<_> = ["2025-04-14", "2025-04-15", "2025-04-16", "2025-04-17", "2025-04-18", "2025-04-19", "2025-04-20"]
        .iter()
        .enumerate()
        .map(|(i, date)| {
            json!({
                "date": date,
                "day": {
                    "maxtemp_c": 10.0 + i as f64,
                    "mintemp_c": 1.0 + i as f64,
                    "avgtemp_c": 5.0,
                    "condition": { "text": format!("облачно-{i}"), "icon": "//cdn.weatherapi.com/116.png" }
                }
            })
        })
        .collect();

    json!({
        "location": { "name": "Sochi", "country": "Russia" },
        "forecast": { "forecastday": days }
    })
}

fn current_body() -> serde_json::Value {
    json!({
        "coord": { "lon": 39.73, "lat": 43.6 },
        "weather": [{ "description": "переменная облачность", "icon": "03d" }],
        "main": { "temp": 18.4, "feels_like": 17.9, "humidity": 64 },
        "wind": { "speed": 2.6 },
        "visibility": 10000,
        "dt": 1744621200,
        "name": "Сочи"
    })
}

async fn mount_providers(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn city_search_renders_current_and_week() {
    let server = MockServer::start().await;
    mount_providers(&server).await;

    let search =
        WeatherSearch::from_config(&config_for(&server), Arc::new(UnsupportedGeolocator)).unwrap();
    let state = search.search_city("Sochi").await;

    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert!(matches!(&state.current, CurrentSlot::Loaded(w) if w.location_name == "Сочи"));
    assert_eq!(state.forecast.as_ref().map(|f| f.days.len()), Some(7));

    let out = render(&state, &Theme::default(), Lang::Ru, Units::Metric);
    assert!(out.contains("Температура: 18.4°C"));
    assert!(out.contains("переменная облачность"));
    assert!(out.contains("Прогноз на 7 дней:"));
    for i in 0..7 {
        assert!(out.contains(&format!("облачно-{i}")));
    }
}

#[tokio::test]
async fn blank_city_issues_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let search =
        WeatherSearch::from_config(&config_for(&server), Arc::new(UnsupportedGeolocator)).unwrap();
    let state = search.search_city("   ").await;

    assert_eq!(state.error, Some(SearchError::EmptyCity));
}

#[tokio::test]
async fn geolocation_queries_both_providers_by_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("q", "43.6,39.73"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "43.6"))
        .and(query_param("lon", "39.73"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(1)
        .mount(&server)
        .await;

    let here = Arc::new(FixedGeolocator(Coordinates::new(43.6, 39.73)));
    let search = WeatherSearch::from_config(&config_for(&server), here).unwrap();
    let state = search.search_here().await;

    assert_eq!(state.error, None);
    assert!(matches!(state.current, CurrentSlot::Loaded(_)));
}

#[tokio::test]
async fn unknown_city_renders_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 1006, "message": "No matching location found." }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "cod": "404", "message": "city not found" })),
        )
        .mount(&server)
        .await;

    let search =
        WeatherSearch::from_config(&config_for(&server), Arc::new(UnsupportedGeolocator)).unwrap();
    let state = search.search_city("Atlantis").await;

    assert_eq!(state.current, CurrentSlot::NotFound);
    assert!(state.forecast.is_none());

    let out = render(&state, &Theme::default(), Lang::En, Units::Metric);
    assert!(out.contains("City not found"));
}
