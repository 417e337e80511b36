//! Climate-sensitive disease prediction.
//!
//! The classifier is an opaque capability behind [`DiseaseClassifier`]; the
//! bundled implementation evaluates a tree ensemble exported to JSON.

pub mod classifier;
pub mod error;
pub mod forest;
pub mod label;

pub use classifier::{DiseaseClassifier, DiseasePredictor, FEATURE_COUNT, FEATURE_ORDER};
pub use error::ModelError;
pub use forest::TreeEnsembleClassifier;
pub use label::DiseaseLabel;
