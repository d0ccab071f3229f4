use crate::model::WeatherRecord;

/// What an observer currently sees for the weather query.
///
/// Exactly one variant is active at a time, so a loading indicator can never
/// be shown next to stale data.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    /// Nothing fetched yet, or explicitly reset.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The most recent fetch completed and decoded.
    Success(WeatherRecord),
    /// The most recent fetch failed; carries actionable text.
    Error(String),
}

impl FetchState {
    /// Success and Error are stable until the next command.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchState::Success(_) | FetchState::Error(_))
    }

    pub fn record(&self) -> Option<&WeatherRecord> {
        match self {
            FetchState::Success(record) => Some(record),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchState::Error(message) => Some(message),
            _ => None,
        }
    }
}
