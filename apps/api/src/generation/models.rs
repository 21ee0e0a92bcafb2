//! Request and result types for the four career-assistance tasks.
//!
//! Requests are immutable once deserialized. Results are always structurally valid:
//! the mappers fill every field, defaulting where the model output fell short.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_LANGUAGE: &str = "id";
pub const DEFAULT_NUM_QUESTIONS: u32 = 5;
pub const MAX_NUM_QUESTIONS: u32 = 20;
pub const DEFAULT_CURRENT_LEVEL: &str = "ENTRY";

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_num_questions() -> u32 {
    DEFAULT_NUM_QUESTIONS
}

fn default_current_level() -> String {
    DEFAULT_CURRENT_LEVEL.to_string()
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvReviewRequest {
    pub job_field: String,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Base64-encoded PDF of the CV.
    #[serde(default)]
    pub cv_file_base64: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewQuestionsRequest {
    pub job_field: String,
    #[serde(default)]
    pub target_role: Option<String>,
    pub difficulty: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_num_questions")]
    pub num_questions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackQuestion {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackAnswer {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewFeedbackRequest {
    pub job_field: String,
    #[serde(default)]
    pub target_role: Option<String>,
    pub difficulty: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub question: FeedbackQuestion,
    pub answer: FeedbackAnswer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerRoadmapRequest {
    pub job_field: String,
    pub target_role: String,
    #[serde(default = "default_current_level")]
    pub current_level: String,
    #[serde(default)]
    pub known_skills: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

/// A request for any of the four tasks, tagged by `"task"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum GenerationRequest {
    CvReview(CvReviewRequest),
    InterviewQuestions(InterviewQuestionsRequest),
    InterviewFeedback(InterviewFeedbackRequest),
    CareerRoadmap(CareerRoadmapRequest),
}

impl CvReviewRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require("job_field", &self.job_field)?;
        require("language", &self.language)
    }
}

impl InterviewQuestionsRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require("job_field", &self.job_field)?;
        require("difficulty", &self.difficulty)?;
        require("language", &self.language)?;
        if !(1..=MAX_NUM_QUESTIONS).contains(&self.num_questions) {
            return Err(AppError::Validation(format!(
                "num_questions must be between 1 and {MAX_NUM_QUESTIONS}"
            )));
        }
        Ok(())
    }
}

impl InterviewFeedbackRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require("job_field", &self.job_field)?;
        require("difficulty", &self.difficulty)?;
        require("language", &self.language)?;
        require("question.text", &self.question.text)?;
        require("answer.text", &self.answer.text)
    }
}

impl CareerRoadmapRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require("job_field", &self.job_field)?;
        require("target_role", &self.target_role)?;
        require("current_level", &self.current_level)?;
        require("language", &self.language)
    }
}

impl GenerationRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            GenerationRequest::CvReview(r) => r.validate(),
            GenerationRequest::InterviewQuestions(r) => r.validate(),
            GenerationRequest::InterviewFeedback(r) => r.validate(),
            GenerationRequest::CareerRoadmap(r) => r.validate(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Results
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvReviewResult {
    pub review_id: String,
    pub job_field: String,
    pub target_role: Option<String>,
    pub language: String,
    /// 0 – 100
    pub overall_score: u8,
    pub rating_label: String,
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_career_paths: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub id: String,
    pub text: String,
    pub topic: Option<String>,
    pub suggested_duration_sec: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestionsResult {
    pub session_template_id: String,
    pub job_field: String,
    pub target_role: Option<String>,
    pub difficulty: String,
    pub language: String,
    /// Never empty.
    pub questions: Vec<InterviewQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewFeedbackResult {
    pub question_id: Option<String>,
    pub job_field: String,
    pub difficulty: String,
    pub language: String,
    /// 0 – 100
    pub answer_score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub ideal_answer: String,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapResource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub resource_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapStage {
    pub id: String,
    pub title: String,
    pub description: String,
    /// At least 1.
    pub estimated_duration_months: u32,
    pub skills_to_learn: Vec<String>,
    pub resources: Vec<RoadmapResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerRoadmapResult {
    pub roadmap_id: String,
    pub job_field: String,
    pub target_role: String,
    pub current_level: String,
    /// Never empty.
    pub stages: Vec<RoadmapStage>,
}

/// One result variant per task kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TypedResult {
    CvReview(CvReviewResult),
    InterviewQuestions(InterviewQuestionsResult),
    InterviewFeedback(InterviewFeedbackResult),
    CareerRoadmap(CareerRoadmapResult),
}
