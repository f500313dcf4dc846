use crate::Weather;

/// Render a weather record as a short multi-line report.
pub fn format_weather(weather: &Weather) -> String {
    format!(
        "{}, temperature {} °C, {}\nSunrise: {}\nSunset: {}\n",
        weather.city,
        weather.temperature,
        weather.condition,
        weather.sunrise.format("%H:%M"),
        weather.sunset.format("%H:%M"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeatherCondition;
    use chrono::{Local, TimeZone};

    #[test]
    fn formats_report() {
        let weather = Weather {
            temperature: 25,
            condition: WeatherCondition::Clouds,
            sunrise: Local.with_ymd_and_hms(2022, 5, 3, 4, 0, 0).unwrap(),
            sunset: Local.with_ymd_and_hms(2022, 5, 3, 20, 25, 0).unwrap(),
            city: "Moscow".to_string(),
        };

        assert_eq!(
            format_weather(&weather),
            "Moscow, temperature 25 °C, Cloudy\nSunrise: 04:00\nSunset: 20:25\n"
        );
    }
}
