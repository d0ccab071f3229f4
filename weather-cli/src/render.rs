//! Terminal rendering of the fetch state.
//!
//! Everything here is a pure function of [`FetchState`]; the only side effect
//! is writing to the given output.

use std::io::{self, Write};

use chrono::Local;
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor},
};
use weatherly_core::{FetchState, WeatherRecord};

const BAND_WIDTH: usize = 48;

const fn rgb(hex: u32) -> Color {
    Color::Rgb {
        r: (hex >> 16) as u8,
        g: (hex >> 8) as u8,
        b: hex as u8,
    }
}

const CLEAR: &[Color] = &[rgb(0x87CEEB), rgb(0xE0F6FF), rgb(0xFFE4B5)];
const CLOUDS: &[Color] = &[rgb(0xB0C4DE), rgb(0xD3D3D3), rgb(0xE6E6FA)];
const RAIN: &[Color] = &[rgb(0x708090), rgb(0x778899), rgb(0xB0C4DE)];
const THUNDERSTORM: &[Color] = &[rgb(0x2F4F4F), rgb(0x4B0082), rgb(0x483D8B)];
const SNOW: &[Color] = &[rgb(0xE0E0E0), rgb(0xF5F5F5), rgb(0xFFFFFF)];
const MIST: &[Color] = &[rgb(0xD3D3D3), rgb(0xE0E0E0), rgb(0xF5F5F5)];
const DEFAULT: &[Color] = &[rgb(0x87CEEB), rgb(0xE0F6FF)];

/// Background gradient, top to bottom, for a primary condition like "Rain".
pub fn gradient_for(condition: Option<&str>) -> &'static [Color] {
    match condition.map(str::to_lowercase).as_deref() {
        Some("clear") => CLEAR,
        Some("clouds") => CLOUDS,
        Some("rain" | "drizzle") => RAIN,
        Some("thunderstorm") => THUNDERSTORM,
        Some("snow") => SNOW,
        Some("mist" | "fog" | "haze") => MIST,
        _ => DEFAULT,
    }
}

fn primary_category(state: &FetchState) -> Option<&str> {
    state
        .record()
        .and_then(WeatherRecord::primary_condition)
        .map(|c| c.primary_category.as_str())
}

/// Text content of the card shown for `state`.
pub fn card_lines(state: &FetchState) -> Vec<String> {
    match state {
        FetchState::Idle => vec![
            "Search for Weather".to_string(),
            "Enter a city name to get started".to_string(),
        ],
        FetchState::Loading => vec!["Loading weather data...".to_string()],
        FetchState::Success(record) => weather_lines(record),
        FetchState::Error(message) => vec!["Error".to_string(), message.clone()],
    }
}

fn weather_lines(record: &WeatherRecord) -> Vec<String> {
    let mut lines = vec![record.location.clone()];

    if let Some(condition) = record.primary_condition() {
        lines.push(capitalize(&condition.description));
        lines.push(format!("Icon: {}", condition.icon_url()));
    }

    lines.push(format!("{}°C", record.temperature_c.trunc() as i64));
    lines.push(format!(
        "Humidity {}%  ·  Wind {} m/s  ·  Pressure {} hPa",
        record.humidity_pct, record.wind_speed_mps, record.pressure_hpa
    ));

    if let Some(observed) = record.observed_at {
        lines.push(format!(
            "Observed {}",
            observed.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ));
    }

    lines
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Draw the gradient band followed by the card.
pub fn draw(out: &mut impl Write, state: &FetchState) -> io::Result<()> {
    let band = " ".repeat(BAND_WIDTH);
    for color in gradient_for(primary_category(state)) {
        queue!(out, SetBackgroundColor(*color), Print(&band), ResetColor, Print("\n"))?;
    }
    for line in card_lines(state) {
        queue!(out, Print("  "), Print(line), Print("\n"))?;
    }
    queue!(out, Print("\n"))?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherly_core::ConditionDescriptor;

    fn london() -> WeatherRecord {
        WeatherRecord {
            location: "London".into(),
            temperature_c: 15.9,
            humidity_pct: 60,
            pressure_hpa: 1012,
            conditions: vec![ConditionDescriptor {
                primary_category: "Clear".into(),
                description: "clear sky".into(),
                icon_code: "01d".into(),
            }],
            wind_speed_mps: 3.1,
            observed_at: None,
        }
    }

    #[test]
    fn gradient_matches_condition_case_insensitively() {
        assert_eq!(gradient_for(Some("Clear")), CLEAR);
        assert_eq!(gradient_for(Some("CLOUDS")), CLOUDS);
        assert_eq!(gradient_for(Some("Drizzle")), RAIN);
        assert_eq!(gradient_for(Some("rain")), RAIN);
        assert_eq!(gradient_for(Some("Thunderstorm")), THUNDERSTORM);
        assert_eq!(gradient_for(Some("Snow")), SNOW);
        assert_eq!(gradient_for(Some("Haze")), MIST);
        assert_eq!(gradient_for(Some("Tornado")), DEFAULT);
        assert_eq!(gradient_for(None), DEFAULT);
    }

    #[test]
    fn rgb_splits_hex_channels() {
        assert_eq!(rgb(0x87CEEB), Color::Rgb { r: 0x87, g: 0xCE, b: 0xEB });
    }

    #[test]
    fn success_card_shows_truncated_temperature_and_details() {
        let lines = card_lines(&FetchState::Success(london()));

        assert_eq!(lines[0], "London");
        assert_eq!(lines[1], "Clear sky");
        assert_eq!(lines[2], "Icon: https://openweathermap.org/img/wn/01d@2x.png");
        assert_eq!(lines[3], "15°C");
        assert!(lines[4].contains("60%"));
        assert!(lines[4].contains("3.1 m/s"));
        assert!(lines[4].contains("1012 hPa"));
    }

    #[test]
    fn negative_temperature_truncates_toward_zero() {
        let mut record = london();
        record.temperature_c = -2.7;
        record.conditions.clear();

        let lines = card_lines(&FetchState::Success(record));
        assert_eq!(lines[1], "-2°C");
    }

    #[test]
    fn error_and_loading_cards() {
        assert_eq!(card_lines(&FetchState::Loading), vec!["Loading weather data..."]);
        assert_eq!(
            card_lines(&FetchState::Error("City not found.".into())),
            vec!["Error", "City not found."]
        );
    }

    #[test]
    fn draw_uses_condition_gradient_only_on_success() {
        let mut out = Vec::new();
        draw(&mut out, &FetchState::Success(london())).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("London"));
        assert_eq!(text.matches(&" ".repeat(BAND_WIDTH)).count(), CLEAR.len());

        let mut out = Vec::new();
        draw(&mut out, &FetchState::Idle).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(&" ".repeat(BAND_WIDTH)).count(), DEFAULT.len());
    }

    #[test]
    fn capitalize_handles_empty_and_unicode() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("éclair"), "Éclair");
    }
}
