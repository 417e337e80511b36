use std::sync::Arc;

use climahealth_insight::{Explainer, Explanation, GeminiClient};
use climahealth_predictor::{DiseaseLabel, DiseasePredictor};
use climahealth_weather::{OpenWeatherProvider, WeatherFetcher, WeatherReading};
use tracing::instrument;

use crate::{AppContext, PipelineError};

/// Everything shown for one submitted city.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub city: String,
    pub reading: WeatherReading,
    pub label: DiseaseLabel,
    pub explanation: Explanation,
}

/// Runs the three steps strictly in order; a fetch failure stops the run.
pub struct Pipeline {
    fetcher: Arc<dyn WeatherFetcher>,
    predictor: DiseasePredictor,
    explainer: Explainer,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn WeatherFetcher>,
        predictor: DiseasePredictor,
        explainer: Explainer,
    ) -> Self {
        Self {
            fetcher,
            predictor,
            explainer,
        }
    }

    /// Wire the OpenWeatherMap and Gemini clients from the startup context.
    pub fn from_context(ctx: &AppContext) -> Self {
        let config = ctx.config();
        let fetcher =
            OpenWeatherProvider::with_base_url(&config.openweather.api_key, &config.openweather.base_url);
        let generator = GeminiClient::new(
            &config.gemini.api_key,
            &config.gemini.model,
            &config.gemini.base_url,
        );

        Self::new(
            Arc::new(fetcher),
            ctx.predictor().clone(),
            Explainer::new(Arc::new(generator)),
        )
    }

    /// One pipeline run for `city`.
    ///
    /// # Errors
    /// [`PipelineError::EmptyCity`] for blank input and [`PipelineError::Fetch`]
    /// when the weather lookup fails; neither reaches the predictor. A failing
    /// explanation is reported inside the returned report instead.
    #[instrument(skip(self), level = "info")]
    pub async fn run(&self, city: &str) -> Result<PipelineReport, PipelineError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(PipelineError::EmptyCity);
        }

        let reading = self.fetcher.fetch_weather(city).await.map_err(|e| {
            tracing::warn!("Weather fetch for {} failed: {}", city, e);
            PipelineError::from(e)
        })?;

        let label = self.predictor.predict(&reading);
        let explanation = self.explainer.explain(&label).await;

        Ok(PipelineReport {
            city: city.to_string(),
            reading,
            label,
            explanation,
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("predictor", &self.predictor)
            .finish_non_exhaustive()
    }
}
