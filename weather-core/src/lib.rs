//! Core library for the `weatherly` current-weather viewer.
//!
//! This crate defines:
//! - The weather record decoded from the provider
//! - The OpenWeatherMap client behind the `WeatherProvider` trait
//! - The fetch state machine that front ends observe
//! - Configuration & credentials handling
//!
//! It is used by `weatherly-cli`, but any front end can drive a
//! [`WeatherFetcher`] and render the [`FetchState`] it publishes.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod provider;
pub mod state;

pub use config::Config;
pub use error::FetchError;
pub use fetcher::WeatherFetcher;
pub use model::{ConditionDescriptor, WeatherRecord};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient};
pub use state::FetchState;
