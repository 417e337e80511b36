use std::fmt;
use std::sync::Arc;

use climahealth_predictor::DiseaseLabel;

use crate::TextGenerator;

/// Shown instead of calling the model when the prediction is `none`.
pub const NO_RISK_MESSAGE: &str =
    "No climate-sensitive disease risk detected based on current weather.";

/// Prompt sent for a predicted disease.
pub fn build_prompt(disease: &DiseaseLabel) -> String {
    format!(
        "Explain the disease '{}' caused by climate conditions. \
         Include:\n- How weather affects it\n- Common symptoms\n\
         - Prevention tips\n- Remedies\nExplain simply for the general public.",
        disease
    )
}

/// What the result screen shows under the prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Explanation {
    NoRisk,
    /// Model output, displayed unmodified
    Generated(String),
    /// The generative call failed; holds the error detail
    Unavailable(String),
}

impl Explanation {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRisk => f.write_str(NO_RISK_MESSAGE),
            Self::Generated(text) => f.write_str(text),
            Self::Unavailable(detail) => write!(f, "Gemini error: {}", detail),
        }
    }
}

pub struct Explainer {
    generator: Arc<dyn TextGenerator>,
}

impl Explainer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Explain `label` in plain language. Never fails: service errors become
    /// [`Explanation::Unavailable`].
    pub async fn explain(&self, label: &DiseaseLabel) -> Explanation {
        if label.is_none() {
            return Explanation::NoRisk;
        }

        match self.generator.generate(&build_prompt(label)).await {
            Ok(text) => Explanation::Generated(text),
            Err(e) => {
                tracing::warn!("Explanation for {} failed: {}", label, e);
                Explanation::Unavailable(e.to_string())
            }
        }
    }
}

impl fmt::Debug for Explainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Explainer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::InsightError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Remembers prompts and answers with a canned result
    struct ScriptedGenerator {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl ScriptedGenerator {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, InsightError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                Err(InsightError::Unauthorized("API key not valid".to_string()))
            } else {
                Ok("Stay hydrated.".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_none_skips_the_service() {
        let generator = ScriptedGenerator::new(false);
        let explainer = Explainer::new(generator.clone());

        let explanation = explainer.explain(&DiseaseLabel::none()).await;

        assert_eq!(explanation, Explanation::NoRisk);
        assert_eq!(explanation.to_string(), NO_RISK_MESSAGE);
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_disease_issues_exactly_one_call() {
        let generator = ScriptedGenerator::new(false);
        let explainer = Explainer::new(generator.clone());

        let explanation = explainer.explain(&DiseaseLabel::from("dengue")).await;

        assert_eq!(explanation, Explanation::Generated("Stay hydrated.".to_string()));
        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("'dengue'"));
    }

    #[tokio::test]
    async fn test_service_failure_degrades_to_message() {
        let generator = ScriptedGenerator::new(true);
        let explainer = Explainer::new(generator.clone());

        let explanation = explainer.explain(&DiseaseLabel::from("malaria")).await;

        assert!(explanation.is_unavailable());
        let shown = explanation.to_string();
        assert!(shown.starts_with("Gemini error: "));
        assert!(shown.contains("API key not valid"));
    }

    #[test]
    fn test_prompt_structure() {
        let prompt = build_prompt(&DiseaseLabel::from("cholera"));
        assert!(prompt.starts_with("Explain the disease 'cholera' caused by climate conditions."));
        for section in [
            "- How weather affects it",
            "- Common symptoms",
            "- Prevention tips",
            "- Remedies",
        ] {
            assert!(prompt.contains(section), "missing {section}");
        }
        assert!(prompt.ends_with("Explain simply for the general public."));
    }
}
