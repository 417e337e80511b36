use std::sync::Arc;

use climahealth_core::{AppError, Config};
use climahealth_predictor::{DiseasePredictor, ModelError};

/// Read-only state built once at startup and shared by every run.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Arc<Config>,
    predictor: DiseasePredictor,
}

impl AppContext {
    /// Load the model named by `config`.
    ///
    /// # Errors
    /// [`AppError::ModelUnavailable`] when the artifact is missing or invalid.
    pub fn initialize(config: Config) -> Result<Self, AppError> {
        let path = config.model.path.clone();
        let predictor = DiseasePredictor::load(&path).map_err(|e| {
            let reason = match &e {
                ModelError::NotFound(_) => "file does not exist".to_string(),
                other => other.to_string(),
            };
            AppError::ModelUnavailable {
                path: path.display().to_string(),
                reason,
            }
        })?;

        tracing::info!(labels = predictor.labels().len(), "Application context ready");
        Ok(Self::with_predictor(config, predictor))
    }

    pub fn with_predictor(config: Config, predictor: DiseasePredictor) -> Self {
        Self {
            config: Arc::new(config),
            predictor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn predictor(&self) -> &DiseasePredictor {
        &self.predictor
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_missing_model_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.model.path = dir.path().join("disease_predictor_model.json");

        let err = AppContext::initialize(config).unwrap_err();

        match &err {
            AppError::ModelUnavailable { path, reason } => {
                assert!(path.ends_with("disease_predictor_model.json"));
                assert_eq!(reason, "file does not exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.user_message().contains("Model file not found"));
    }

    #[test]
    fn test_invalid_model_reports_reason() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"format_version": 1, "features": [], "classes": [], "trees": []}"#)
            .unwrap();
        let mut config = Config::default();
        config.model.path = path;

        let err = AppContext::initialize(config).unwrap_err();
        assert!(err.to_string().contains("model expects features"));
    }

    #[test]
    fn test_bundled_model_initializes() {
        let mut config = Config::default();
        config.model.path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../models/disease_predictor_model.json");

        let ctx = AppContext::initialize(config).unwrap();
        assert!(ctx.predictor().labels().iter().any(|l| l.is_none()));
        assert_eq!(ctx.config().ui.default_city, "Chennai");
    }
}
