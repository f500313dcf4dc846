//! Persistent log of past observations.
//!
//! Backends implement [`WeatherStorage`]; callers hold a `&dyn WeatherStorage`
//! and don't care which one they got.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, path::PathBuf};

use crate::{
    Config, Weather,
    config::HistoryBackend,
    error::StorageError,
};

pub mod json;
pub mod plain;

pub use json::JsonFileWeatherStorage;
pub use plain::PlainFileWeatherStorage;

/// One entry of the structured history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: String,
    pub weather: String,

    /// Fields written by newer versions, kept as-is on rewrite.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HistoryRecord {
    pub fn new(date: String, weather: String) -> Self {
        Self { date, weather, extra: serde_json::Map::new() }
    }
}

pub trait WeatherStorage: Debug {
    /// Append one observation to the log.
    fn save(&self, weather: &Weather) -> Result<(), StorageError>;
}

/// Save `weather` to whichever backend is given.
pub fn save_weather(weather: &Weather, storage: &dyn WeatherStorage) -> Result<(), StorageError> {
    storage.save(weather)
}

/// Local wall-clock time, microsecond precision.
pub(crate) fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

/// Construct the configured history backend, or `None` when history is off.
pub fn storage_from_config(config: &Config) -> anyhow::Result<Option<Box<dyn WeatherStorage>>> {
    let backend = config.history.backend;
    if backend == HistoryBackend::None {
        return Ok(None);
    }

    let path: PathBuf = config.history_path()?;
    let storage: Box<dyn WeatherStorage> = match backend {
        HistoryBackend::Plain => Box::new(PlainFileWeatherStorage::new(path)),
        HistoryBackend::Json => Box::new(JsonFileWeatherStorage::new(path)?),
        HistoryBackend::None => return Ok(None),
    };

    Ok(Some(storage))
}
