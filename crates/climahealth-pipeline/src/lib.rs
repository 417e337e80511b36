//! Fetch → Predict → Explain, one city per run.

pub mod context;
pub mod error;
pub mod pipeline;

pub use context::AppContext;
pub use error::PipelineError;
pub use pipeline::{Pipeline, PipelineReport};

pub use climahealth_insight::Explanation;
pub use climahealth_predictor::DiseaseLabel;
pub use climahealth_weather::WeatherReading;
