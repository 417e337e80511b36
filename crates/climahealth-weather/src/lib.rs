//! Current weather lookup for ClimaHealth
//!
//! Fetches conditions for a city from OpenWeatherMap and reduces them to the
//! three features the disease model was trained on.

pub mod provider;
pub mod types;

pub use provider::{OpenWeatherProvider, WeatherFetcher};
pub use types::{kelvin_to_celsius, WeatherError, WeatherReading};
