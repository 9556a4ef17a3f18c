//! Core library for the `forecast` weather widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Clients for the current-conditions and forecast providers
//! - Position sources for "weather where I am"
//! - The weather-search view state and its lookup cycle
//! - The theme toggle, localized text and a plain-text renderer
//!
//! It is used by `forecast-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod geolocation;
pub mod i18n;
pub mod model;
pub mod provider;
pub mod render;
pub mod search;
pub mod theme;

pub use config::{Config, ProviderConfig};
pub use error::{FetchError, GeolocationError, SearchError};
pub use geolocation::{FixedGeolocator, Geolocator, IpGeolocator, UnsupportedGeolocator};
pub use i18n::Lang;
pub use model::{CityQuery, Coordinates, CurrentWeather, Forecast, ForecastDay, Location, Units};
pub use provider::{CurrentConditionsProvider, ForecastProvider, ProviderId};
pub use search::{CurrentSlot, SearchState, WeatherSearch};
pub use theme::Theme;
