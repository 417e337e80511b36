//! OpenWeatherMap "current weather by city name" client.

use async_trait::async_trait;
use climahealth_core::ReqwestErrorExt;
use reqwest::{Client, StatusCode};
use tracing::instrument;

use crate::types::{CurrentWeatherResponse, ProviderErrorBody, WeatherError, WeatherReading};

/// Source of current weather for a city.
#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    /// Fetch the current reading for `city`.
    ///
    /// # Errors
    /// Any non-200 response, transport failure or malformed body. No partial
    /// reading is ever returned.
    async fn fetch_weather(&self, city: &str) -> Result<WeatherReading, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherProvider {
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn handle_response(
        &self,
        city: &str,
        response: reqwest::Response,
    ) -> Result<WeatherReading, WeatherError> {
        let status = response.status();

        if status == StatusCode::OK {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| WeatherError::Network(e.into_network_error()))?;
            let body: CurrentWeatherResponse = serde_json::from_slice(&bytes)
                .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e)))?;
            return Ok(body.into());
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ProviderErrorBody>(&text)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(text);

        tracing::debug!("Weather API returned {} for {}: {}", status, city, message);

        match status {
            StatusCode::NOT_FOUND => Err(WeatherError::CityNotFound(city.to_string())),
            StatusCode::UNAUTHORIZED => Err(WeatherError::InvalidApiKey),
            _ => Err(WeatherError::Status {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherProvider {
    #[instrument(skip(self), level = "info")]
    async fn fetch_weather(&self, city: &str) -> Result<WeatherReading, WeatherError> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        let reading = self.handle_response(city, response).await?;
        tracing::info!(
            temperature_celsius = reading.temperature_celsius,
            humidity_percent = reading.humidity_percent,
            rainfall_mm = reading.rainfall_mm,
            "Fetched weather"
        );
        Ok(reading)
    }
}
