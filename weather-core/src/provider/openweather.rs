use std::error::Error as _;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::FetchError,
    model::{ConditionDescriptor, WeatherRecord},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/";

const CURRENT_WEATHER_PATH: &str = "weather";
const UNITS: &str = "metric";
const INVALID_KEY_MARKER: &str = "Invalid API key";

/// Client for the OpenWeatherMap current-weather endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    http: Client,
}

impl Default for OpenWeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenWeatherClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    /// Use a preconfigured HTTP client (proxies, custom TLS roots).
    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    fn endpoint(&self) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{CURRENT_WEATHER_PATH}", self.base_url)
        } else {
            format!("{}/{CURRENT_WEATHER_PATH}", self.base_url)
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(
        &self,
        city_query: &str,
        credential: &str,
    ) -> Result<WeatherRecord, FetchError> {
        debug!(city = city_query, "requesting current weather from OpenWeather");

        let res = self
            .http
            .get(self.endpoint())
            .query(&[("q", city_query), ("appid", credential), ("units", UNITS)])
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        if status != StatusCode::OK {
            // The body only refines the 401 message; failing to read it is fine.
            let body = res.text().await.unwrap_or_default();
            debug!(%status, body = %truncate_body(&body), "OpenWeather request failed");
            return Err(classify_failure(status, &body));
        }

        let body = res.text().await.map_err(transport_error)?;
        let record = decode_current(&body)?;

        debug!(
            location = %record.location,
            temperature_c = record.temperature_c,
            "OpenWeather request succeeded"
        );
        Ok(record)
    }
}

/// Map a non-200 status (and its best-effort body) to a failure kind.
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> FetchError {
    match status {
        StatusCode::UNAUTHORIZED => FetchError::Auth {
            invalid_key: body.contains(INVALID_KEY_MARKER),
        },
        StatusCode::NOT_FOUND => FetchError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited,
        other => FetchError::Http {
            status: other.as_u16(),
            reason: other.canonical_reason().unwrap_or("Unknown status").to_string(),
        },
    }
}

/// Decode a current-weather body. Any missing required field is an error.
pub(crate) fn decode_current(body: &str) -> Result<WeatherRecord, FetchError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)?;
    Ok(parsed.into())
}

fn transport_error(err: reqwest::Error) -> FetchError {
    // The request URL carries the API key, so it never reaches messages or logs.
    let err = err.without_url();
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    FetchError::Network(detail)
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    #[serde(default)]
    dt: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl From<OwCurrentResponse> for WeatherRecord {
    fn from(parsed: OwCurrentResponse) -> Self {
        WeatherRecord {
            location: parsed.name,
            temperature_c: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            conditions: parsed
                .weather
                .into_iter()
                .map(|w| ConditionDescriptor {
                    primary_category: w.main,
                    description: w.description,
                    icon_code: w.icon,
                })
                .collect(),
            wind_speed_mps: parsed.wind.speed,
            observed_at: parsed.dt.and_then(unix_to_utc),
        }
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: &str = r#"{"name":"London","main":{"temp":15.5,"humidity":60,"pressure":1012},"weather":[{"main":"Clear","description":"clear sky","icon":"01d"}],"wind":{"speed":3.1}}"#;

    #[test]
    fn decodes_london_sample() {
        let record = decode_current(LONDON).expect("sample must decode");

        assert_eq!(record.location, "London");
        assert_eq!(record.temperature_c, 15.5);
        assert_eq!(record.humidity_pct, 60);
        assert_eq!(record.pressure_hpa, 1012);
        assert_eq!(record.conditions[0].primary_category, "Clear");
        assert_eq!(record.conditions[0].description, "clear sky");
        assert_eq!(record.conditions[0].icon_code, "01d");
        assert_eq!(record.wind_speed_mps, 3.1);
        assert!(record.observed_at.is_none());
    }

    #[test]
    fn decodes_observation_time_and_ignores_extra_fields() {
        let body = r#"{"coord":{"lon":-0.13,"lat":51.51},"name":"London","dt":1700000000,
            "main":{"temp":9.0,"feels_like":7.1,"humidity":81,"pressure":998},
            "weather":[],"wind":{"speed":5.0,"deg":240},"cod":200}"#;
        let record = decode_current(body).expect("body must decode");

        assert!(record.conditions.is_empty());
        assert_eq!(record.observed_at.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn missing_main_is_a_decode_error() {
        let body = r#"{"name":"London","weather":[],"wind":{"speed":3.1}}"#;
        let err = decode_current(body).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn classify_maps_known_statuses() {
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, r#"{"cod":401,"message":"Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."}"#),
            FetchError::Auth { invalid_key: true }
        ));
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, ""),
            FetchError::Auth { invalid_key: false }
        ));
        assert!(matches!(classify_failure(StatusCode::NOT_FOUND, ""), FetchError::NotFound));
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, ""),
            FetchError::RateLimited
        ));
    }

    #[test]
    fn classify_other_statuses_as_http() {
        match classify_failure(StatusCode::BAD_GATEWAY, "<html>") {
            FetchError::Http { status, reason } => {
                assert_eq!(status, 502);
                assert_eq!(reason, "Bad Gateway");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            classify_failure(StatusCode::NO_CONTENT, ""),
            FetchError::Http { status: 204, .. }
        ));
    }

    #[test]
    fn endpoint_joins_path_with_or_without_trailing_slash() {
        assert_eq!(
            OpenWeatherClient::new().endpoint(),
            "https://api.openweathermap.org/data/2.5/weather"
        );
        assert_eq!(
            OpenWeatherClient::with_base_url("http://localhost:8080/data/2.5").endpoint(),
            "http://localhost:8080/data/2.5/weather"
        );
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(250);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
