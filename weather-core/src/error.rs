use thiserror::Error;

/// Environment variable that supplies the API key.
pub const API_KEY_ENV: &str = "WEATHERLY_API_KEY";

/// Every way a single weather fetch can fail.
///
/// `Display` is terse and meant for logs; [`FetchError::user_message`] is the
/// actionable text shown to the person who asked for the weather.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("city name is empty")]
    EmptyInput,

    #[error("API key not configured")]
    MissingCredential,

    /// HTTP 401. `invalid_key` is set when the body says "Invalid API key".
    #[error("authentication rejected (invalid key reported: {invalid_key})")]
    Auth { invalid_key: bool },

    #[error("location not found")]
    NotFound,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("unexpected HTTP status {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode weather response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Unknown(String),
}

impl FetchError {
    pub fn user_message(&self) -> String {
        match self {
            FetchError::EmptyInput => "Please enter a city name".to_string(),
            FetchError::MissingCredential => format!(
                "API key not found. Set {API_KEY_ENV} or run `weatherly configure` \
                 to store your OpenWeatherMap API key."
            ),
            FetchError::Auth { invalid_key: true } => {
                "Invalid API key. Please verify your API key on the OpenWeatherMap website. \
                 Make sure the key is active and correctly copied into your configuration. \
                 Note: New API keys may take 10-15 minutes to fully activate."
                    .to_string()
            }
            FetchError::Auth { invalid_key: false } => {
                "Invalid API key. Please check your configured OpenWeatherMap API key. \
                 Note: New API keys may take a few minutes to activate."
                    .to_string()
            }
            FetchError::NotFound => {
                "City not found. Please check the city name and try again.".to_string()
            }
            FetchError::RateLimited => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            FetchError::Http { status, reason } => format!("Error {status}: {reason}"),
            FetchError::Network(_) => {
                "Network error: Please check your internet connection and try again.".to_string()
            }
            FetchError::Decode(e) => format!("Failed to fetch weather data: {e}"),
            FetchError::Unknown(detail) if detail.is_empty() => {
                "Failed to fetch weather data: Unknown error".to_string()
            }
            FetchError::Unknown(detail) => format!("Failed to fetch weather data: {detail}"),
        }
    }
}
