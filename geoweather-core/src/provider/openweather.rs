use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use reqwest::Client;
use serde::Deserialize;
use serde_json::error::Category;
use tracing::debug;

use crate::{
    error::{ApiFailure, ApiServiceError},
    model::{Celsius, Coordinates, Weather, WeatherCondition},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_raw(&self, coordinates: Coordinates) -> Result<String, ApiServiceError> {
        let url = format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'));
        debug!(%coordinates, "requesting current weather from OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coordinates.latitude().to_string()),
                ("lon", coordinates.longitude().to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiFailure::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            }
            .into());
        }

        Ok(body)
    }

    fn parse(&self, payload: &str) -> Result<Weather, ApiServiceError> {
        parse_openweather_response(payload)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    sys: OwSys,
}

/// Normalize an OpenWeather current-weather payload.
///
/// Every failure is reported as [`ApiServiceError`]; the attached [`ApiFailure`] tells a
/// malformed document from a missing field or an unknown condition code.
pub fn parse_openweather_response(payload: &str) -> Result<Weather, ApiServiceError> {
    let parsed: OwCurrentResponse = serde_json::from_str(payload).map_err(|e| {
        debug!(error = %e, "rejecting OpenWeather payload");
        match e.classify() {
            Category::Data => ApiFailure::Schema(e.to_string()),
            Category::Syntax | Category::Eof | Category::Io => {
                ApiFailure::MalformedPayload(e.to_string())
            }
        }
    })?;

    Ok(Weather {
        temperature: round_temperature(parsed.main.temp)?,
        condition: classify(&parsed.weather)?,
        sunrise: local_time("sunrise", parsed.sys.sunrise)?,
        sunset: local_time("sunset", parsed.sys.sunset)?,
        city: parsed.name,
    })
}

/// Round half away from zero: 20.5 -> 21, -20.5 -> -21, -0.4 -> 0.
fn round_temperature(temp: f64) -> Result<Celsius, ApiFailure> {
    let rounded = temp.round();
    if !(f64::from(Celsius::MIN)..=f64::from(Celsius::MAX)).contains(&rounded) {
        return Err(ApiFailure::InvalidTemperature(temp));
    }

    Ok(rounded as Celsius)
}

fn classify(weather: &[OwWeather]) -> Result<WeatherCondition, ApiFailure> {
    let code = weather.first().ok_or(ApiFailure::MissingCondition)?.id;
    WeatherCondition::from_code(code).ok_or_else(|| {
        debug!(code, "unrecognized OpenWeather condition code");
        ApiFailure::UnknownCondition(code)
    })
}

fn local_time(field: &'static str, ts: i64) -> Result<DateTime<Local>, ApiFailure> {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .ok_or(ApiFailure::InvalidTimestamp { field, value: ts })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
