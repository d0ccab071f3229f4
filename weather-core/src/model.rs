use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// One reported weather condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDescriptor {
    /// Condition group, e.g. "Clear", "Clouds", "Rain".
    pub primary_category: String,
    /// Detailed text, e.g. "clear sky".
    pub description: String,
    pub icon_code: String,
}

impl ConditionDescriptor {
    /// URL of the provider's 2x icon image for this condition.
    pub fn icon_url(&self) -> String {
        format!("{ICON_BASE_URL}/{}@2x.png", self.icon_code)
    }
}

/// Current weather for one resolved location.
///
/// Only ever built from a fully decoded response body, so every field is
/// populated. Temperatures are Celsius because requests ask for metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub conditions: Vec<ConditionDescriptor>,
    pub wind_speed_mps: f64,
    /// Provider timestamp of the observation, when the payload carried one.
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherRecord {
    /// The first reported condition, which drives the background choice.
    pub fn primary_condition(&self) -> Option<&ConditionDescriptor> {
        self.conditions.first()
    }
}
