//! Tree-ensemble classifier loaded from a JSON export.
//!
//! Artifact layout (format version 1):
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "features": ["temperature", "humidity", "rainfall"],
//!   "classes": ["none", "dengue", "malaria"],
//!   "trees": [
//!     {"nodes": [
//!       {"feature": 0, "threshold": 20.0, "left": 1, "right": 2},
//!       {"value": [1.0, 0.0, 0.0]},
//!       {"value": [0.2, 0.5, 0.3]}
//!     ]}
//!   ]
//! }
//! ```
//!
//! Split nodes send a row left when `row[feature] <= threshold`. Leaves hold
//! per-class weights. The prediction is the class with the highest mean
//! normalised leaf weight across trees; ties go to the earlier class.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::{DiseaseClassifier, DiseaseLabel, ModelError, FEATURE_COUNT, FEATURE_ORDER};

const SUPPORTED_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    format_version: u32,
    features: Vec<String>,
    classes: Vec<String>,
    trees: Vec<TreeArtifact>,
}

#[derive(Debug, Deserialize)]
struct TreeArtifact {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

/// A validated tree. Children always point forward, so walking terminates.
#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn leaf_for(&self, features: &[f64; FEATURE_COUNT]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Leaf { value } => return value,
            }
        }
    }
}

/// Immutable tree-ensemble classifier.
#[derive(Debug)]
pub struct TreeEnsembleClassifier {
    classes: Vec<DiseaseLabel>,
    trees: Vec<Tree>,
}

impl TreeEnsembleClassifier {
    /// Read and validate an artifact file.
    ///
    /// # Errors
    /// [`ModelError::NotFound`] when `path` does not exist, otherwise read,
    /// parse or validation failures.
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ModelError::NotFound(path.to_path_buf())
            } else {
                ModelError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let classifier = Self::from_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            trees = classifier.trees.len(),
            classes = classifier.classes.len(),
            "Loaded disease model"
        );
        Ok(classifier)
    }

    /// Parse and validate an artifact from JSON text.
    ///
    /// # Errors
    /// [`ModelError::Parse`] for malformed JSON, [`ModelError::Invalid`] when
    /// the structure is inconsistent.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if artifact.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ModelError::invalid(format!(
                "unsupported format version {} (expected {})",
                artifact.format_version, SUPPORTED_FORMAT_VERSION
            )));
        }

        if artifact.features != FEATURE_ORDER {
            return Err(ModelError::invalid(format!(
                "model expects features [{}], but readings supply [{}]",
                artifact.features.join(", "),
                FEATURE_ORDER.join(", ")
            )));
        }

        let classes = validate_classes(artifact.classes)?;

        if artifact.trees.is_empty() {
            return Err(ModelError::invalid("model has no trees"));
        }

        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| validate_tree(i, tree, classes.len()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { classes, trees })
    }
}

fn validate_classes(classes: Vec<String>) -> Result<Vec<DiseaseLabel>, ModelError> {
    if classes.is_empty() {
        return Err(ModelError::invalid("model has no classes"));
    }

    let mut seen = HashSet::new();
    for class in &classes {
        if class.trim().is_empty() {
            return Err(ModelError::invalid("class labels cannot be empty"));
        }
        if !seen.insert(class.as_str()) {
            return Err(ModelError::invalid(format!("duplicate class label '{}'", class)));
        }
    }

    if !seen.contains(DiseaseLabel::NONE) {
        return Err(ModelError::invalid(format!(
            "class labels must include '{}'",
            DiseaseLabel::NONE
        )));
    }

    Ok(classes.into_iter().map(DiseaseLabel::new).collect())
}

fn validate_tree(
    tree_index: usize,
    tree: TreeArtifact,
    class_count: usize,
) -> Result<Tree, ModelError> {
    let node_count = tree.nodes.len();
    if node_count == 0 {
        return Err(ModelError::invalid(format!("tree {} has no nodes", tree_index)));
    }

    let mut nodes = Vec::with_capacity(node_count);
    for (i, node) in tree.nodes.into_iter().enumerate() {
        let at = || format!("tree {} node {}", tree_index, i);
        match node {
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if feature >= FEATURE_COUNT {
                    return Err(ModelError::invalid(format!(
                        "{}: feature index {} out of range",
                        at(),
                        feature
                    )));
                }
                if !threshold.is_finite() {
                    return Err(ModelError::invalid(format!("{}: threshold is not finite", at())));
                }
                for child in [left, right] {
                    if child <= i || child >= node_count {
                        return Err(ModelError::invalid(format!(
                            "{}: child index {} must point forward within the tree",
                            at(),
                            child
                        )));
                    }
                }
                nodes.push(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                });
            }
            Node::Leaf { value } => {
                if value.len() != class_count {
                    return Err(ModelError::invalid(format!(
                        "{}: leaf has {} weights for {} classes",
                        at(),
                        value.len(),
                        class_count
                    )));
                }
                if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(ModelError::invalid(format!(
                        "{}: leaf weights must be finite and non-negative",
                        at()
                    )));
                }
                let total: f64 = value.iter().sum();
                if total <= 0.0 {
                    return Err(ModelError::invalid(format!("{}: leaf weights sum to zero", at())));
                }
                nodes.push(Node::Leaf {
                    value: value.into_iter().map(|w| w / total).collect(),
                });
            }
        }
    }

    Ok(Tree { nodes })
}

impl DiseaseClassifier for TreeEnsembleClassifier {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> DiseaseLabel {
        let mut scores = vec![0.0_f64; self.classes.len()];
        for tree in &self.trees {
            for (score, weight) in scores.iter_mut().zip(tree.leaf_for(features)) {
                *score += weight;
            }
        }

        let mut best = 0;
        for (i, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = i;
            }
        }

        tracing::debug!(?scores, "Ensemble scores");
        self.classes[best].clone()
    }

    fn labels(&self) -> &[DiseaseLabel] {
        &self.classes
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use std::io::Write;

    fn stump_json() -> serde_json::Value {
        serde_json::json!({
            "format_version": 1,
            "features": ["temperature", "humidity", "rainfall"],
            "classes": ["none", "dengue", "malaria"],
            "trees": [
                {"nodes": [
                    {"feature": 0, "threshold": 20.0, "left": 1, "right": 2},
                    {"value": [10.0, 0.0, 0.0]},
                    {"feature": 2, "threshold": 1.0, "left": 3, "right": 4},
                    {"value": [1.0, 3.0, 0.0]},
                    {"value": [0.0, 1.0, 3.0]}
                ]},
                {"nodes": [
                    {"value": [1.0, 1.0, 1.0]}
                ]}
            ]
        })
    }

    fn load(value: serde_json::Value) -> Result<TreeEnsembleClassifier, ModelError> {
        TreeEnsembleClassifier::from_json(&value.to_string())
    }

    #[test]
    fn test_predict_walks_splits() {
        let model = load(stump_json()).unwrap();

        assert_eq!(model.predict(&[15.0, 50.0, 0.0]).as_str(), "none");
        assert_eq!(model.predict(&[28.0, 80.0, 0.5]).as_str(), "dengue");
        assert_eq!(model.predict(&[28.0, 80.0, 2.0]).as_str(), "malaria");
    }

    #[test]
    fn test_threshold_is_inclusive_on_the_left() {
        let model = load(stump_json()).unwrap();
        assert_eq!(model.predict(&[20.0, 50.0, 5.0]).as_str(), "none");
    }

    #[test]
    fn test_predict_is_deterministic() {
        let model = load(stump_json()).unwrap();
        let row = [28.0, 80.0, 2.0];
        let first = model.predict(&row);
        for _ in 0..100 {
            assert_eq!(model.predict(&row), first);
        }
    }

    #[test]
    fn test_ties_go_to_first_class() {
        let mut json = stump_json();
        json["trees"] = serde_json::json!([{"nodes": [{"value": [1.0, 1.0, 0.0]}]}]);
        let model = load(json).unwrap();
        assert!(model.predict(&[30.0, 90.0, 9.0]).is_none());
    }

    #[test]
    fn test_labels_expose_class_set() {
        let model = load(stump_json()).unwrap();
        let labels: Vec<&str> = model.labels().iter().map(DiseaseLabel::as_str).collect();
        assert_eq!(labels, vec!["none", "dengue", "malaria"]);
    }

    #[test]
    fn test_rejects_wrong_feature_order() {
        let mut json = stump_json();
        json["features"] = serde_json::json!(["humidity", "temperature", "rainfall"]);
        let err = load(json).unwrap_err();
        assert!(err.to_string().contains("model expects features"));
    }

    #[test]
    fn test_rejects_missing_none_class() {
        let mut json = stump_json();
        json["classes"] = serde_json::json!(["flu", "dengue", "malaria"]);
        let err = load(json).unwrap_err();
        assert!(err.to_string().contains("must include 'none'"));
    }

    #[test]
    fn test_rejects_backward_child() {
        let mut json = stump_json();
        json["trees"][0]["nodes"][2]["left"] = serde_json::json!(0);
        let err = load(json).unwrap_err();
        assert!(err.to_string().contains("must point forward"));
    }

    #[test]
    fn test_rejects_leaf_width_mismatch() {
        let mut json = stump_json();
        json["trees"][1]["nodes"][0]["value"] = serde_json::json!([1.0, 1.0]);
        let err = load(json).unwrap_err();
        assert!(matches!(err, ModelError::Invalid(_)));
    }

    #[test]
    fn test_rejects_unsupported_version() {
        let mut json = stump_json();
        json["format_version"] = serde_json::json!(2);
        assert!(load(json).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = TreeEnsembleClassifier::from_json("{\"format_version\": 1").unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disease_predictor_model.json");
        let err = TreeEnsembleClassifier::from_path(&path).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(ref p) if p == &path));
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(stump_json().to_string().as_bytes()).unwrap();
        let model = TreeEnsembleClassifier::from_path(file.path()).unwrap();
        assert_eq!(model.labels().len(), 3);
    }

    #[test]
    fn test_bundled_artifact_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../models/disease_predictor_model.json");
        let model = TreeEnsembleClassifier::from_path(&path).unwrap();

        assert!(model.predict(&[10.0, 50.0, 0.0]).is_none());
        assert_eq!(model.predict(&[28.0, 80.0, 2.0]).as_str(), "malaria");
    }
}
