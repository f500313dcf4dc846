use chrono::{DateTime, Local};
use std::fmt;

use crate::error::LocationError;

/// Temperature in whole degrees Celsius.
pub type Celsius = i32;

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate and build a coordinate pair.
    ///
    /// With `round_to_one_decimal` set, both values are rounded to one decimal
    /// place here and the original precision is dropped.
    pub fn new(
        latitude: f64,
        longitude: f64,
        round_to_one_decimal: bool,
    ) -> Result<Self, LocationError> {
        let in_range = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !in_range {
            return Err(LocationError::OutOfRange { latitude, longitude });
        }

        if round_to_one_decimal {
            Ok(Self {
                latitude: round_one_decimal(latitude),
                longitude: round_one_decimal(longitude),
            })
        } else {
            Ok(Self { latitude, longitude })
        }
    }

    /// Parse the `"lat,lon"` form used by IP geolocation services.
    pub fn parse_loc(loc: &str, round_to_one_decimal: bool) -> Result<Self, LocationError> {
        let malformed = || LocationError::MalformedLocation(loc.to_string());

        let (lat, lon) = loc.split_once(',').ok_or_else(malformed)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| malformed())?;
        let longitude: f64 = lon.trim().parse().map_err(|_| malformed())?;

        Self::new(latitude, longitude, round_to_one_decimal)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Closed set of weather categories a provider code can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherCondition {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Clear,
    Fog,
    Clouds,
}

/// Prefix table for OpenWeather condition ids, matched first-to-last.
///
/// A prefix must come before any shorter prefix that would also match it
/// (`"800"` before `"80"`).
const CONDITION_PREFIXES: &[(&str, WeatherCondition)] = &[
    ("1", WeatherCondition::Thunderstorm),
    ("3", WeatherCondition::Drizzle),
    ("5", WeatherCondition::Rain),
    ("6", WeatherCondition::Snow),
    ("7", WeatherCondition::Fog),
    ("800", WeatherCondition::Clear),
    ("80", WeatherCondition::Clouds),
];

impl WeatherCondition {
    /// Classify an OpenWeather condition id.
    ///
    /// Returns `None` when no prefix matches; there is no fallback category.
    pub fn from_code(code: i64) -> Option<Self> {
        let code = code.to_string();
        CONDITION_PREFIXES
            .iter()
            .find(|(prefix, _)| code.starts_with(prefix))
            .map(|(_, condition)| *condition)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "Thunderstorm",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Clear => "Clear",
            Self::Fog => "Fog",
            Self::Clouds => "Cloudy",
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Current conditions at one place, normalized from a provider payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weather {
    pub temperature: Celsius,
    pub condition: WeatherCondition,
    pub sunrise: DateTime<Local>,
    pub sunset: DateTime<Local>,
    pub city: String,
}
