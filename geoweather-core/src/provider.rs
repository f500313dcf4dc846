use crate::{
    Config, Coordinates, Weather, error::ApiServiceError,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the raw payload for the given coordinates.
    async fn fetch_raw(&self, coordinates: Coordinates) -> Result<String, ApiServiceError>;

    /// Normalize a raw payload into a [`Weather`] record.
    fn parse(&self, payload: &str) -> Result<Weather, ApiServiceError>;

    async fn get_weather(&self, coordinates: Coordinates) -> Result<Weather, ApiServiceError> {
        let payload = self.fetch_raw(coordinates).await?;
        self.parse(&payload)
    }
}

/// Construct the weather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    provider_from_api_key(config.openweather_api_key())
}

fn provider_from_api_key(api_key: Option<String>) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = api_key.ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `geoweather configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    Ok(Box::new(OpenWeatherProvider::new(api_key)))
}
