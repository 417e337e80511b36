use serde::{Deserialize, Serialize};
use std::fmt;

/// A class from the model's closed label set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiseaseLabel(String);

impl DiseaseLabel {
    /// Sentinel for "no climate-sensitive disease risk"
    pub const NONE: &'static str = "none";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn none() -> Self {
        Self::new(Self::NONE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == Self::NONE
    }
}

impl fmt::Display for DiseaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DiseaseLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}
