//! Core library for the `geoweather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - IP geolocation and the weather provider client
//! - Parsing of provider payloads into the [`Weather`] domain model
//! - Formatting and the pluggable history log
//!
//! It is used by `geoweather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod format;
pub mod geolocation;
pub mod history;
pub mod model;
pub mod provider;

pub use config::{Config, HistoryBackend, HistoryConfig};
pub use error::{ApiFailure, ApiServiceError, LocationError, StorageError};
pub use format::format_weather;
pub use geolocation::{Geolocator, IpInfoGeolocator};
pub use history::{
    HistoryRecord, JsonFileWeatherStorage, PlainFileWeatherStorage, WeatherStorage, save_weather,
    storage_from_config,
};
pub use model::{Celsius, Coordinates, Weather, WeatherCondition};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
