//! Response schemas sent to the model as generation constraints.
//!
//! These are part of the wire contract. Built once per process and never mutated.

use std::sync::OnceLock;

use serde_json::{json, Value};

/// The four task kinds the assistant supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    CvReview,
    InterviewQuestions,
    InterviewFeedback,
    CareerRoadmap,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::CvReview => "cv_review",
            TaskKind::InterviewQuestions => "interview_questions",
            TaskKind::InterviewFeedback => "interview_feedback",
            TaskKind::CareerRoadmap => "career_roadmap",
        }
    }
}

/// Returns the schema for a task kind.
pub fn schema_for(kind: TaskKind) -> &'static Value {
    static CV_REVIEW: OnceLock<Value> = OnceLock::new();
    static INTERVIEW_QUESTIONS: OnceLock<Value> = OnceLock::new();
    static INTERVIEW_FEEDBACK: OnceLock<Value> = OnceLock::new();
    static CAREER_ROADMAP: OnceLock<Value> = OnceLock::new();

    match kind {
        TaskKind::CvReview => CV_REVIEW.get_or_init(cv_review_schema),
        TaskKind::InterviewQuestions => INTERVIEW_QUESTIONS.get_or_init(interview_questions_schema),
        TaskKind::InterviewFeedback => INTERVIEW_FEEDBACK.get_or_init(interview_feedback_schema),
        TaskKind::CareerRoadmap => CAREER_ROADMAP.get_or_init(career_roadmap_schema),
    }
}

fn string_array() -> Value {
    json!({"type": "array", "items": {"type": "string"}})
}

fn cv_review_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "overall_score": {"type": "number"},
            "rating_label": {"type": "string"},
            "summary": {"type": "string"},
            "strengths": string_array(),
            "weaknesses": string_array(),
            "recommendations": string_array()
        },
        "required": ["overall_score", "rating_label", "summary"]
    })
}

fn interview_questions_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "text": {"type": "string"},
                "topic": {"type": "string"},
                "suggested_duration_sec": {"type": "number"}
            },
            "required": ["id", "text"]
        }
    })
}

fn interview_feedback_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "answer_score": {"type": "number"},
            "strengths": string_array(),
            "improvements": string_array(),
            "ideal_answer": {"type": "string"},
            "tips": string_array()
        },
        "required": ["answer_score", "strengths", "improvements"]
    })
}

fn career_roadmap_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "stages": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": {"type": "string"},
                        "title": {"type": "string"},
                        "description": {"type": "string"},
                        "estimated_duration_months": {"type": "number"},
                        "skills_to_learn": string_array(),
                        "resources": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "title": {"type": "string"},
                                    "url": {"type": "string"},
                                    "type": {"type": "string"}
                                },
                                "required": ["title", "url", "type"]
                            }
                        }
                    },
                    "required": ["id", "title", "description", "estimated_duration_months"]
                }
            }
        },
        "required": ["stages"]
    })
}
