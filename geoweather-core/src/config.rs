use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::PathBuf};

/// Environment variable that overrides the stored OpenWeather key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Credentials for OpenWeather.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    pub api_key: String,
}

/// Which history backend to write observations to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    #[default]
    Json,
    Plain,
    None,
}

impl HistoryBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryBackend::Json => "json",
            HistoryBackend::Plain => "plain",
            HistoryBackend::None => "none",
        }
    }

    pub const fn all() -> &'static [HistoryBackend] {
        &[HistoryBackend::Json, HistoryBackend::Plain, HistoryBackend::None]
    }

    fn default_file_name(&self) -> &'static str {
        match self {
            HistoryBackend::Plain => "history.txt",
            HistoryBackend::Json | HistoryBackend::None => "history.json",
        }
    }
}

impl fmt::Display for HistoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Example TOML:
/// [history]
/// backend = "plain"
/// path = "/home/me/weather.log"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub backend: HistoryBackend,
    /// Overrides the default location in the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Round coordinates to one decimal place before querying the weather.
    #[serde(default = "default_true")]
    pub use_rounded_coords: bool,

    /// Example TOML:
    /// [openweather]
    /// api_key = "..."
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openweather: Option<OpenWeatherConfig>,

    #[serde(default)]
    pub history: HistoryConfig,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_rounded_coords: true,
            openweather: None,
            history: HistoryConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "geoweather", "geoweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Where history goes: the configured path, or the platform data dir.
    ///
    /// Creates the data directory when falling back to it.
    pub fn history_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.history.path {
            return Ok(path.clone());
        }

        let data_dir = Self::project_dirs()?.data_dir().to_path_buf();
        fs::create_dir_all(&data_dir).with_context(|| {
            format!("Failed to create data directory: {}", data_dir.display())
        })?;

        Ok(data_dir.join(self.history.backend.default_file_name()))
    }

    /// Set or replace the stored OpenWeather key.
    pub fn set_openweather_api_key(&mut self, api_key: String) {
        self.openweather = Some(OpenWeatherConfig { api_key });
    }

    /// Returns the API key, preferring `OPENWEATHER_API_KEY` over the file.
    pub fn openweather_api_key(&self) -> Option<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }

    /// Pick the override when it is non-blank, else the stored key.
    pub fn resolve_api_key(&self, override_key: Option<String>) -> Option<String> {
        override_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.openweather.as_ref().map(|cfg| cfg.api_key.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_coordinates_and_use_json_history() {
        let cfg = Config::default();

        assert!(cfg.use_rounded_coords);
        assert_eq!(cfg.history.backend, HistoryBackend::Json);
        assert!(cfg.openweather.is_none());
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::from_toml("").unwrap();

        assert!(cfg.use_rounded_coords);
        assert_eq!(cfg.history.backend, HistoryBackend::Json);
    }

    #[test]
    fn parses_full_file() {
        let cfg = Config::from_toml(
            r#"
            use_rounded_coords = false

            [openweather]
            api_key = "OPEN_KEY"

            [history]
            backend = "plain"
            path = "/tmp/weather.log"
            "#,
        )
        .unwrap();

        assert!(!cfg.use_rounded_coords);
        assert_eq!(cfg.openweather.unwrap().api_key, "OPEN_KEY");
        assert_eq!(cfg.history.backend, HistoryBackend::Plain);
        assert_eq!(cfg.history.path, Some(PathBuf::from("/tmp/weather.log")));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = Config::from_toml("[history]\nbackend = \"sqlite\"").unwrap_err();
        assert!(err.to_string().contains("unknown variant"));
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.use_rounded_coords = false;
        cfg.set_openweather_api_key("KEY".into());
        cfg.history.backend = HistoryBackend::None;

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&text).unwrap();

        assert!(!back.use_rounded_coords);
        assert_eq!(back.openweather.unwrap().api_key, "KEY");
        assert_eq!(back.history.backend, HistoryBackend::None);
    }

    #[test]
    fn explicit_history_path_wins() {
        let mut cfg = Config::default();
        cfg.history.path = Some(PathBuf::from("/var/tmp/h.json"));

        assert_eq!(cfg.history_path().unwrap(), PathBuf::from("/var/tmp/h.json"));
    }

    #[test]
    fn stored_api_key_is_returned_without_override() {
        let mut cfg = Config::default();
        assert_eq!(cfg.resolve_api_key(None), None);

        cfg.set_openweather_api_key("OPEN_KEY".into());
        assert_eq!(cfg.resolve_api_key(None).as_deref(), Some("OPEN_KEY"));
    }

    #[test]
    fn override_key_wins_unless_blank() {
        let mut cfg = Config::default();
        cfg.set_openweather_api_key("OPEN_KEY".into());

        assert_eq!(cfg.resolve_api_key(Some("ENV_KEY".into())).as_deref(), Some("ENV_KEY"));
        assert_eq!(cfg.resolve_api_key(Some("  ".into())).as_deref(), Some("OPEN_KEY"));
    }

    #[test]
    fn backend_names() {
        let names: Vec<_> = HistoryBackend::all().iter().map(|b| b.to_string()).collect();
        assert_eq!(names, ["json", "plain", "none"]);
    }
}
