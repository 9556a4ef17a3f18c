use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    error::FetchError,
    i18n::Lang,
    model::{Condition, FORECAST_DAYS, Forecast, ForecastDay, Location, Units},
    provider::{ForecastProvider, ProviderId, parse_body, send, status_error},
};

const ID: ProviderId = ProviderId::WeatherApi;

/// WeatherAPI.com error code for "No matching location found".
const NO_LOCATION_FOUND: u32 = 1006;

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Client,
    base_url: String,
    lang: Lang,
    units: Units,
}

impl WeatherApiProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.weatherapi.com";

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

    async fn fetch_forecast(&self, location: &Location) -> Result<Forecast, FetchError> {
        let url = format!("{}/v1/forecast.json", self.base_url);
        let days = FORECAST_DAYS.to_string();
        let q = location.as_query();

        tracing::debug!(%location, "requesting forecast");
        let request = self.http.get(&url).query(&[
            ("key", self.api_key.as_str()),
            ("q", q.as_str()),
            ("days", days.as_str()),
            ("lang", self.lang.as_str()),
        ]);
        let (status, body) = send(ID, request).await?;

        if !status.is_success() {
            if status == StatusCode::BAD_REQUEST && is_unknown_location(&body) {
                return Err(FetchError::NotFound);
            }
            return Err(status_error(ID, status, &body));
        }

        let parsed: WaForecastResponse = parse_body(ID, &body)?;
        parsed.into_forecast(self.units)
    }
}

fn is_unknown_location(body: &str) -> bool {
    serde_json::from_str::<WaForecastResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .and_then(|e| e.code)
        == Some(NO_LOCATION_FOUND)
}

/// WeatherAPI serves icons as protocol-relative URLs.
fn normalize_icon(icon: String) -> String {
    match icon.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => icon,
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: Option<f64>,
    mintemp_c: Option<f64>,
    avgtemp_c: Option<f64>,
    maxtemp_f: Option<f64>,
    mintemp_f: Option<f64>,
    avgtemp_f: Option<f64>,
    condition: Option<WaCondition>,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: Option<String>,
    day: Option<WaDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Option<Vec<WaForecastDay>>,
}

#[derive(Debug, Deserialize)]
struct WaError {
    code: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: Option<WaLocation>,
    forecast: Option<WaForecast>,
    error: Option<WaError>,
}

impl WaForecastResponse {
    fn into_forecast(self, units: Units) -> Result<Forecast, FetchError> {
        let location = self.location.ok_or_else(|| FetchError::missing(ID, "location"))?;
        let name = location.name.ok_or_else(|| FetchError::missing(ID, "location.name"))?;
        let location_name = match location.country {
            Some(country) if !country.is_empty() => format!("{name}, {country}"),
            _ => name,
        };

        let days = self
            .forecast
            .and_then(|f| f.forecastday)
            .ok_or_else(|| FetchError::missing(ID, "forecast.forecastday"))?
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| entry.into_day(idx, units))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Forecast { location_name, days })
    }
}

impl WaForecastDay {
    fn into_day(self, idx: usize, units: Units) -> Result<ForecastDay, FetchError> {
        let field = |name: &str| format!("forecastday[{idx}].{name}");

        let raw_date = self.date.ok_or_else(|| FetchError::missing(ID, &field("date")))?;
        let date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d").map_err(|e| {
            FetchError::malformed(ID, format!("{}: bad date '{raw_date}': {e}", field("date")))
        })?;

        let day = self.day.ok_or_else(|| FetchError::missing(ID, &field("day")))?;
        let (max, min, avg) = match units {
            Units::Metric => (day.maxtemp_c, day.mintemp_c, day.avgtemp_c),
            Units::Imperial => (day.maxtemp_f, day.mintemp_f, day.avgtemp_f),
        };
        let condition = day.condition.ok_or_else(|| FetchError::missing(ID, &field("day.condition")))?;

        Ok(ForecastDay {
            date,
            max_temp: max.ok_or_else(|| FetchError::missing(ID, &field("day.maxtemp")))?,
            min_temp: min.ok_or_else(|| FetchError::missing(ID, &field("day.mintemp")))?,
            avg_temp: avg.ok_or_else(|| FetchError::missing(ID, &field("day.avgtemp")))?,
            condition: Condition {
                text: condition
                    .text
                    .ok_or_else(|| FetchError::missing(ID, &field("day.condition.text")))?,
                icon: condition.icon.map(normalize_icon).unwrap_or_default(),
            },
        })
    }
}

#[async_trait]
impl ForecastProvider for WeatherApiProvider {
    async fn forecast(&self, location: &Location) -> Result<Forecast, FetchError> {
        self.fetch_forecast(location).await
    }
}
