use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    error::FetchError,
    i18n::Lang,
    model::{Coordinates, CurrentWeather, Location, Units},
    provider::{CurrentConditionsProvider, ProviderId, parse_body, send, status_error, unix_to_utc},
};

const ID: ProviderId = ProviderId::OpenWeather;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    base_url: String,
    lang: Lang,
    units: Units,
}

impl OpenWeatherProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openweathermap.org";

    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            lang: Lang::default(),
            units: Units::default(),
        }
    }

    pub fn with_http(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_lang(mut self, lang: Lang) -> Self {
        self.lang = lang;
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    async fn fetch_current(&self, location: &Location) -> Result<CurrentWeather, FetchError> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        let mut query: Vec<(&str, String)> = match location {
            Location::City(city) => vec![("q", city.as_str().to_string())],
            Location::Coordinates(coords) => vec![
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ],
        };
        query.extend([
            ("appid", self.api_key.clone()),
            ("units", self.units.as_str().to_string()),
            ("lang", self.lang.as_str().to_string()),
        ]);

        tracing::debug!(%location, "requesting current conditions");
        let (status, body) = send(ID, self.http.get(&url).query(&query)).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(status_error(ID, status, &body));
        }

        let parsed: OwCurrentResponse = parse_body(ID, &body)?;
        parsed.into_current()
    }
}

// Every field is optional on the wire; `into_current` decides what is required.

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    dt: Option<i64>,
    coord: Option<OwCoord>,
    main: Option<OwMain>,
    wind: Option<OwWind>,
    visibility: Option<u32>,
    weather: Option<Vec<OwWeather>>,
}

impl OwCurrentResponse {
    fn into_current(self) -> Result<CurrentWeather, FetchError> {
        // No weather descriptor means the provider did not recognise the place.
        let descriptor = self
            .weather
            .and_then(|list| list.into_iter().next())
            .ok_or(FetchError::NotFound)?;

        let description =
            descriptor.description.ok_or_else(|| FetchError::missing(ID, "weather[0].description"))?;
        let main = self.main.ok_or_else(|| FetchError::missing(ID, "main"))?;
        let wind = self.wind.ok_or_else(|| FetchError::missing(ID, "wind"))?;

        let coordinates = self.coord.and_then(|c| match (c.lat, c.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        });

        Ok(CurrentWeather {
            location_name: self.name.ok_or_else(|| FetchError::missing(ID, "name"))?,
            coordinates,
            temperature: main.temp.ok_or_else(|| FetchError::missing(ID, "main.temp"))?,
            feels_like: main
                .feels_like
                .ok_or_else(|| FetchError::missing(ID, "main.feels_like"))?,
            humidity_pct: main.humidity.ok_or_else(|| FetchError::missing(ID, "main.humidity"))?,
            wind_speed: wind.speed.ok_or_else(|| FetchError::missing(ID, "wind.speed"))?,
            visibility: self.visibility,
            description,
            icon: descriptor.icon.unwrap_or_default(),
            observation_time: self.dt.and_then(unix_to_utc).unwrap_or_else(Utc::now),
        })
    }
}

#[async_trait]
impl CurrentConditionsProvider for OpenWeatherProvider {
    async fn current(&self, location: &Location) -> Result<CurrentWeather, FetchError> {
        self.fetch_current(location).await
    }
}
