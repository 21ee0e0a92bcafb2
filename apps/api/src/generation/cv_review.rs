//! CV review: maps model output to a `CvReviewResult`.
//!
//! Every field has a safe default, so malformed output never fails a review.
//! Only a missing credential or a failed remote call does.

use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::generation::lenient::{self, decode_or_default, parse_model_output};
use crate::generation::models::{CvReviewRequest, CvReviewResult};
use crate::llm_client::sanitize::{sanitize, strip_fence_markers};

/// Shown when the model gave no usable rating label ("not available").
pub const RATING_NOT_AVAILABLE: &str = "Tidak Tersedia";
/// Length cap for a summary synthesized from the model's own text.
pub const SUMMARY_FALLBACK_CHARS: usize = 1000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCvReview {
    #[serde(deserialize_with = "lenient::int")]
    overall_score: Option<i64>,
    #[serde(deserialize_with = "lenient::string")]
    rating_label: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    summary: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    strengths: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::string_list")]
    weaknesses: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::string_list")]
    recommendations: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::string_list")]
    suggested_career_paths: Option<Vec<String>>,
}

/// Maps raw model output to a review. Never fails.
pub fn map_cv_review(raw: &str, request: &CvReviewRequest) -> CvReviewResult {
    let parsed = parse_model_output(raw);
    if parsed.is_none() {
        warn!("CV review output is not JSON; returning defaults");
    }
    let review: RawCvReview = decode_or_default(parsed);

    let summary = review
        .summary
        .unwrap_or_else(|| fallback_summary(raw));

    CvReviewResult {
        review_id: Uuid::new_v4().to_string(),
        job_field: request.job_field.clone(),
        target_role: request.target_role.clone(),
        language: request.language.clone(),
        overall_score: review.overall_score.unwrap_or(0).clamp(0, 100) as u8,
        rating_label: review
            .rating_label
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| RATING_NOT_AVAILABLE.to_string()),
        summary,
        strengths: review.strengths.unwrap_or_default(),
        weaknesses: review.weaknesses.unwrap_or_default(),
        recommendations: review.recommendations.unwrap_or_default(),
        suggested_career_paths: review.suggested_career_paths,
    }
}

/// The sanitized model text itself, never the raw unsanitized output.
fn fallback_summary(raw: &str) -> String {
    strip_fence_markers(&sanitize(raw))
        .chars()
        .take(SUMMARY_FALLBACK_CHARS)
        .collect()
}
