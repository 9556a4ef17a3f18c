use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::ProviderId;

/// Failure of a single provider call.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider answered, but has no weather for the requested location.
    #[error("location not found")]
    NotFound,

    #[error("{provider} request failed with status {status}: {body}")]
    Status {
        provider: ProviderId,
        status: u16,
        body: String,
    },

    #[error("{provider} returned malformed data: {reason}")]
    Malformed { provider: ProviderId, reason: String },

    #[error("failed to reach {provider}: {source}")]
    Transport {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub(crate) fn malformed(provider: ProviderId, reason: impl Into<String>) -> Self {
        Self::Malformed { provider, reason: reason.into() }
    }

    pub(crate) fn missing(provider: ProviderId, field: &str) -> Self {
        Self::malformed(provider, format!("missing field `{field}`"))
    }
}

/// Why a position could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("geolocation is not supported")]
    Unsupported,

    #[error("access to the location was denied")]
    Denied,

    #[error("position lookup failed: {0}")]
    Lookup(String),
}

/// Error shown in the error region of the search view.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SearchError {
    #[error("city name is empty")]
    EmptyCity,

    #[error("geolocation is not supported")]
    GeolocationUnsupported,

    #[error("access to the location was denied")]
    GeolocationDenied,

    #[error("position lookup failed: {0}")]
    Geolocation(String),

    #[error("weather lookup failed: {0}")]
    Fetch(String),
}

impl From<GeolocationError> for SearchError {
    fn from(err: GeolocationError) -> Self {
        match err {
            GeolocationError::Unsupported => SearchError::GeolocationUnsupported,
            GeolocationError::Denied => SearchError::GeolocationDenied,
            GeolocationError::Lookup(reason) => SearchError::Geolocation(reason),
        }
    }
}
