use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{Weather, error::StorageError, format::format_weather};

use super::{HistoryRecord, WeatherStorage, timestamp};

/// Keeps the whole history as one pretty-printed JSON array.
///
/// Each save reads the array, appends, and replaces the file through a
/// temporary sibling and a rename, so readers see either the old or the new
/// document. Concurrent writers are not coordinated and can lose updates.
#[derive(Debug, Clone)]
pub struct JsonFileWeatherStorage {
    path: PathBuf,
}

impl JsonFileWeatherStorage {
    /// Open the log at `path`, creating it as `[]` if it doesn't exist.
    ///
    /// An existing file is left untouched, whatever it contains.
    pub fn new(path: PathBuf) -> Result<Self, StorageError> {
        let storage = Self { path };
        storage.init_storage()?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record currently in the log, oldest first.
    pub fn read_history(&self) -> Result<Vec<HistoryRecord>, StorageError> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| StorageError::io(&self.path, e))?;

        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn init_storage(&self) -> Result<(), StorageError> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(()),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        debug!(path = %self.path.display(), "initializing empty history log");
        file.write_all(b"[]")
            .and_then(|()| file.sync_all())
            .map_err(|e| StorageError::io(&self.path, e))
    }

    fn write(&self, history: &[HistoryRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(history).map_err(StorageError::Serialize)?;

        let tmp_path = self.temp_path();
        let result = Self::replace_with(&tmp_path, &self.path, json.as_bytes());
        if result.is_err() {
            // The log itself is untouched; only the partial copy goes.
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    fn replace_with(tmp_path: &Path, path: &Path, contents: &[u8]) -> Result<(), StorageError> {
        let mut tmp_file = File::create(tmp_path).map_err(|e| StorageError::io(tmp_path, e))?;
        tmp_file
            .write_all(contents)
            .and_then(|()| tmp_file.sync_all())
            .map_err(|e| StorageError::io(tmp_path, e))?;
        drop(tmp_file);

        fs::rename(tmp_path, path).map_err(|e| StorageError::io(path, e))
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "history".to_string());

        self.path.with_file_name(format!(".{file_name}.tmp"))
    }
}

impl WeatherStorage for JsonFileWeatherStorage {
    fn save(&self, weather: &Weather) -> Result<(), StorageError> {
        let mut history = self.read_history()?;
        history.push(HistoryRecord::new(timestamp(), format_weather(weather)));
        self.write(&history)?;

        info!(
            path = %self.path.display(),
            records = history.len(),
            city = %weather.city,
            "saved weather to JSON history"
        );
        Ok(())
    }
}
