//! Sources of the user's position.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{error::GeolocationError, model::Coordinates};

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, GeolocationError>;
}

/// Always answers with the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator(pub Coordinates);

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// For environments with no position source at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedGeolocator;

#[async_trait]
impl Geolocator for UnsupportedGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Approximate position from the public IP address (ip-api.com).
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: Option<String>,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpGeolocator {
    pub const DEFAULT_BASE_URL: &'static str = "http://ip-api.com";

    pub fn new(http: Client) -> Self {
        Self { http, base_url: Self::DEFAULT_BASE_URL.to_string() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        let url = format!("{}/json", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(|e| GeolocationError::Lookup(e.to_string()))?;

        if !res.status().is_success() {
            return Err(GeolocationError::Lookup(format!("status {}", res.status())));
        }

        let parsed: IpApiResponse =
            res.json().await.map_err(|e| GeolocationError::Lookup(e.to_string()))?;

        if parsed.status.as_deref() != Some("success") {
            let reason = parsed.message.unwrap_or_else(|| "unknown failure".to_string());
            return Err(GeolocationError::Lookup(reason));
        }

        match (parsed.lat, parsed.lon) {
            (Some(lat), Some(lon)) => {
                tracing::debug!(lat, lon, "located by IP address");
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(GeolocationError::Lookup("response without coordinates".to_string())),
        }
    }
}
