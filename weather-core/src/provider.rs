use crate::{Config, FetchError, WeatherRecord, provider::openweather::OpenWeatherClient};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Source of current weather for a free-text location query.
///
/// Each call is independent: one request, one outcome, no retries and no
/// state carried over between calls.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, city_query: &str, credential: &str)
    -> Result<WeatherRecord, FetchError>;
}

/// Construct the OpenWeatherMap client, honouring a configured base URL.
pub fn provider_from_config(config: &Config) -> Arc<dyn WeatherProvider> {
    let client = match config.resolved_base_url() {
        Some(base_url) => OpenWeatherClient::with_base_url(base_url),
        None => OpenWeatherClient::new(),
    };
    Arc::new(client)
}
