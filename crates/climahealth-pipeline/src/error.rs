use climahealth_weather::WeatherError;
use thiserror::Error;

/// Failures that end a run before a prediction is made.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("City name is empty")]
    EmptyCity,

    #[error("Weather fetch failed: {0}")]
    Fetch(#[from] WeatherError),
}

impl PipelineError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyCity => "Please enter a city name.",
            Self::Fetch(e) => e.user_message(),
        }
    }
}
