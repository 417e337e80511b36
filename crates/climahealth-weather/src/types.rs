use climahealth_core::NetworkError;
use serde::Deserialize;

/// Weather features for a single prediction request.
///
/// Only ever built from a complete provider response, so all three fields are
/// present by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherReading {
    /// Temperature in Celsius, rounded to 2 decimals
    pub temperature_celsius: f64,
    pub humidity_percent: u8,
    /// Rain over the last hour; 0.0 when the provider reports none
    pub rainfall_mm: f64,
}

impl WeatherReading {
    /// Format the reading the way the result screen shows it.
    /// Floats always carry a decimal point (`28.0`, not `28`).
    pub fn summary(&self) -> String {
        format!(
            "{:?}°C | Humidity: {}% | Rainfall: {:?} mm",
            self.temperature_celsius, self.humidity_percent, self.rainfall_mm
        )
    }
}

/// Convert Kelvin to Celsius, rounded to 2 decimal places.
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    ((kelvin - 273.15) * 100.0).round() / 100.0
}

/// `GET /data/2.5/weather` response, reduced to the fields we read
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentWeatherResponse {
    pub main: MainBlock,
    #[serde(default)]
    pub rain: Option<RainBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MainBlock {
    /// Kelvin, the provider default when no `units` parameter is sent
    pub temp: f64,
    pub humidity: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RainBlock {
    #[serde(rename = "1h")]
    pub one_hour: Option<f64>,
}

impl From<CurrentWeatherResponse> for WeatherReading {
    fn from(response: CurrentWeatherResponse) -> Self {
        Self {
            temperature_celsius: kelvin_to_celsius(response.main.temp),
            humidity_percent: response.main.humidity,
            rainfall_mm: response.rain.and_then(|r| r.one_hour).unwrap_or(0.0),
        }
    }
}

/// Error body OpenWeatherMap sends with non-200 statuses
#[derive(Debug, Deserialize)]
pub(crate) struct ProviderErrorBody {
    pub message: Option<String>,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("Weather API returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    /// Single message shown when a pipeline run stops at the fetch step.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) => e.user_message(),
            _ => "Could not fetch weather. Check city name or API key.",
        }
    }
}
