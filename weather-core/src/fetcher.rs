use std::sync::Arc;

use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    config::{Config, mask_credential},
    error::FetchError,
    provider::{WeatherProvider, provider_from_config},
    state::FetchState,
};

/// Drives [`FetchState`] for one screen or session.
///
/// The fetcher is the only writer of the state; observers get read-only
/// receivers from [`WeatherFetcher::subscribe`] and see every transition as
/// soon as it is published.
///
/// Overlapping requests are not cancelled. Each accepted request publishes
/// its own outcome, so whichever finishes last decides the final state.
#[derive(Debug)]
pub struct WeatherFetcher {
    provider: Arc<dyn WeatherProvider>,
    credential: Arc<str>,
    state: Arc<watch::Sender<FetchState>>,
}

impl WeatherFetcher {
    pub fn new(provider: Arc<dyn WeatherProvider>, credential: impl Into<String>) -> Self {
        let credential: String = credential.into();
        debug!(credential = %mask_credential(&credential), "weather fetcher created");

        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            provider,
            credential: credential.into(),
            state: Arc::new(state),
        }
    }

    /// Build a fetcher from resolved configuration (env, then file).
    pub fn from_config(config: &Config) -> Self {
        Self::new(provider_from_config(config), config.resolved_api_key())
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FetchState {
        self.state.borrow().clone()
    }

    pub fn reset(&self) {
        self.state.send_replace(FetchState::Idle);
    }

    /// Start fetching weather for `city_name`.
    ///
    /// Blank input and a blank credential are rejected synchronously with an
    /// Error state and no network call; `None` is returned. Otherwise the
    /// state moves to Loading and a task is spawned on the current Tokio
    /// runtime; its handle resolves once the outcome has been published.
    /// Dropping the handle does not cancel the request. Called outside a
    /// runtime, the request is rejected with an Error state instead.
    pub fn request_fetch(&self, city_name: &str) -> Option<JoinHandle<()>> {
        if city_name.trim().is_empty() {
            self.publish_failure(&FetchError::EmptyInput);
            return None;
        }

        if self.credential.trim().is_empty() {
            error!("API key is empty; refusing to query the weather provider");
            self.publish_failure(&FetchError::MissingCredential);
            return None;
        }

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                self.publish_failure(&FetchError::Unknown(e.to_string()));
                return None;
            }
        };

        info!(city = city_name, "fetching weather");
        self.state.send_replace(FetchState::Loading);

        let provider = Arc::clone(&self.provider);
        let credential = Arc::clone(&self.credential);
        let state = Arc::clone(&self.state);
        let city = city_name.to_owned();

        Some(runtime.spawn(async move {
            let call = tokio::spawn(async move { provider.fetch(&city, &credential).await });

            let outcome = match call.await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(FetchError::Unknown(join_err.to_string())),
            };

            let next = match outcome {
                Ok(record) => {
                    info!(
                        location = %record.location,
                        temperature_c = record.temperature_c,
                        "weather fetched"
                    );
                    FetchState::Success(record)
                }
                Err(err) => {
                    warn!(error = %err, "weather fetch failed");
                    FetchState::Error(err.user_message())
                }
            };
            state.send_replace(next);
        }))
    }

    fn publish_failure(&self, err: &FetchError) {
        warn!(error = %err, "weather request rejected");
        self.state.send_replace(FetchState::Error(err.user_message()));
    }
}
