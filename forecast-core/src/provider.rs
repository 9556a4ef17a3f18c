use crate::{
    Config,
    error::FetchError,
    model::{CurrentWeather, Forecast, Location},
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::{convert::TryFrom, fmt::Debug, sync::Arc, time::Duration};

pub mod openweather;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, weatherapi."
            )),
        }
    }
}

/// Source of the present-moment snapshot.
#[async_trait]
pub trait CurrentConditionsProvider: Send + Sync + Debug {
    async fn current(&self, location: &Location) -> Result<CurrentWeather, FetchError>;
}

/// Source of the multi-day forecast.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn forecast(&self, location: &Location) -> Result<Forecast, FetchError>;
}

/// HTTP client shared by every provider built from one config.
pub fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

fn api_key(id: ProviderId, config: &Config) -> anyhow::Result<String> {
    config.provider_api_key(id).map(str::to_owned).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `forecast configure {id}` and enter your API key."
        )
    })
}

/// Construct the current-conditions provider from config.
pub fn current_provider_from_config(
    config: &Config,
    http: Client,
) -> anyhow::Result<Arc<dyn CurrentConditionsProvider>> {
    let mut provider = OpenWeatherProvider::new(api_key(ProviderId::OpenWeather, config)?)
        .with_http(http)
        .with_lang(config.lang)
        .with_units(config.units);
    if let Some(base) = &config.endpoints.openweather {
        provider = provider.with_base_url(base);
    }

    Ok(Arc::new(provider))
}

/// Construct the forecast provider from config.
pub fn forecast_provider_from_config(
    config: &Config,
    http: Client,
) -> anyhow::Result<Arc<dyn ForecastProvider>> {
    let mut provider = WeatherApiProvider::new(api_key(ProviderId::WeatherApi, config)?)
        .with_http(http)
        .with_lang(config.lang)
        .with_units(config.units);
    if let Some(base) = &config.endpoints.weatherapi {
        provider = provider.with_base_url(base);
    }

    Ok(Arc::new(provider))
}

/// Send a request and read the whole body, whatever the status.
pub(crate) async fn send(
    provider: ProviderId,
    request: RequestBuilder,
) -> Result<(StatusCode, String), FetchError> {
    let res = request
        .send()
        .await
        .map_err(|source| FetchError::Transport { provider, source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| FetchError::Transport { provider, source })?;

    tracing::debug!(%provider, %status, bytes = body.len(), "provider responded");

    Ok((status, body))
}

pub(crate) fn parse_body<T: DeserializeOwned>(
    provider: ProviderId,
    body: &str,
) -> Result<T, FetchError> {
    serde_json::from_str(body)
        .map_err(|e| FetchError::malformed(provider, format!("invalid JSON: {e}")))
}

pub(crate) fn status_error(provider: ProviderId, status: StatusCode, body: &str) -> FetchError {
    FetchError::Status { provider, status: status.as_u16(), body: truncate_body(body) }
}

pub(crate) fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
