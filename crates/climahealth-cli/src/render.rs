//! Text shown for a finished run.

use climahealth_pipeline::{Explanation, PipelineError, PipelineReport};

pub fn report(report: &PipelineReport) -> String {
    let marker = match report.explanation {
        Explanation::NoRisk => "✅ ",
        Explanation::Unavailable(_) => "❌ ",
        Explanation::Generated(_) => "",
    };

    format!(
        "📍 Weather in {}: {}\n🦠 Predicted Disease: {}\n\n🧠 AI Health Insight:\n{}{}\n",
        report.city,
        report.reading.summary(),
        report.label,
        marker,
        report.explanation
    )
}

pub fn failure(error: &PipelineError) -> String {
    format!("⚠️ {}", error.user_message())
}
