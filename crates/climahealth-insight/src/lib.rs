//! Plain-language disease explanations from a generative language model.

pub mod client;
pub mod error;
pub mod explainer;

pub use client::{GeminiClient, TextGenerator};
pub use error::InsightError;
pub use explainer::{build_prompt, Explainer, Explanation, NO_RISK_MESSAGE};
