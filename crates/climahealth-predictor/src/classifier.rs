use std::path::Path;
use std::sync::Arc;

use climahealth_weather::WeatherReading;

use crate::{DiseaseLabel, ModelError, TreeEnsembleClassifier};

pub const FEATURE_COUNT: usize = 3;

/// Column order the model was trained on.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = ["temperature", "humidity", "rainfall"];

/// A pre-trained, immutable classifier.
///
/// Implementations must be deterministic: the same feature row always maps to
/// the same label for the lifetime of the process.
pub trait DiseaseClassifier: Send + Sync {
    /// Predict the label for one row ordered as [`FEATURE_ORDER`].
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> DiseaseLabel;

    /// Every label the classifier can produce, `none` included.
    fn labels(&self) -> &[DiseaseLabel];
}

/// Turns weather readings into predictions using a shared classifier.
#[derive(Clone)]
pub struct DiseasePredictor {
    classifier: Arc<dyn DiseaseClassifier>,
}

impl DiseasePredictor {
    pub fn new(classifier: Arc<dyn DiseaseClassifier>) -> Self {
        Self { classifier }
    }

    /// Load the bundled tree-ensemble artifact from `path`.
    ///
    /// # Errors
    /// Returns [`ModelError`] when the file is missing, unreadable or not a valid export.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let classifier = TreeEnsembleClassifier::from_path(path)?;
        Ok(Self::new(Arc::new(classifier)))
    }

    /// Feature row for `reading`, in training order.
    pub fn features(reading: &WeatherReading) -> [f64; FEATURE_COUNT] {
        [
            reading.temperature_celsius,
            f64::from(reading.humidity_percent),
            reading.rainfall_mm,
        ]
    }

    pub fn predict(&self, reading: &WeatherReading) -> DiseaseLabel {
        let features = Self::features(reading);
        let label = self.classifier.predict(&features);
        tracing::info!(?features, %label, "Predicted disease");
        label
    }

    pub fn labels(&self) -> &[DiseaseLabel] {
        self.classifier.labels()
    }
}

impl std::fmt::Debug for DiseasePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiseasePredictor")
            .field("labels", &self.labels())
            .finish()
    }
}
