use std::{
    fs::OpenOptions,
    io::Write,
    path::PathBuf,
};
use tracing::info;

use crate::{Weather, error::StorageError, format::format_weather};

use super::{WeatherStorage, timestamp};

/// Appends a timestamp line and the formatted report per observation.
///
/// Prior content is never read, so corruption of earlier entries goes
/// unnoticed here.
#[derive(Debug, Clone)]
pub struct PlainFileWeatherStorage {
    path: PathBuf,
}

impl PlainFileWeatherStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl WeatherStorage for PlainFileWeatherStorage {
    fn save(&self, weather: &Weather) -> Result<(), StorageError> {
        let entry = format!("{}\n{}\n", timestamp(), format_weather(weather));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, e))?;

        // One write call per entry.
        file.write_all(entry.as_bytes())
            .map_err(|e| StorageError::io(&self.path, e))?;

        info!(
            path = %self.path.display(),
            city = %weather.city,
            "appended weather to plain history"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::sample_weather;
    use std::fs;

    #[test]
    fn appends_blocks_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        let storage = PlainFileWeatherStorage::new(path.clone());

        storage.save(&sample_weather()).unwrap();
        let mut second = sample_weather();
        second.city = "Gyumri".to_string();
        storage.save(&second).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let blocks: Vec<&str> = contents.split("\n\n").filter(|b| !b.is_empty()).collect();
        assert_eq!(blocks.len(), 2);

        let first_lines: Vec<&str> = blocks[0].lines().collect();
        assert_eq!(first_lines.len(), 4);
        assert!(first_lines[1].starts_with("Yerevan, temperature 25 °C, Clear"));
        assert!(blocks[1].lines().nth(1).unwrap().starts_with("Gyumri"));
    }

    #[test]
    fn keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        fs::write(&path, "older entry\n").unwrap();

        PlainFileWeatherStorage::new(path.clone()).save(&sample_weather()).unwrap();

        assert!(fs::read_to_string(&path).unwrap().starts_with("older entry\n"));
    }

    #[test]
    fn unwritable_path_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = PlainFileWeatherStorage::new(dir.path().join("missing").join("history.txt"));

        let err = storage.save(&sample_weather()).unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }
}
