//! Interview questions and interview-answer feedback mappers.
//!
//! Questions have no safe default: an empty or unparsable list is an error.
//! Feedback always produces a result.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::generation::lenient::{self, clean_text, decode_or_default, parse_model_output};
use crate::generation::models::{
    InterviewFeedbackRequest, InterviewFeedbackResult, InterviewQuestion,
    InterviewQuestionsRequest, InterviewQuestionsResult,
};
use crate::llm_client::sanitize::sanitize;
use crate::llm_client::GenerationError;

/// Prefix of a raw-output preview attached to errors.
const ERROR_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawQuestion {
    #[serde(deserialize_with = "lenient::string")]
    id: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    text: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    topic: Option<String>,
    #[serde(deserialize_with = "lenient::int")]
    suggested_duration_sec: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFeedback {
    #[serde(deserialize_with = "lenient::int")]
    answer_score: Option<i64>,
    #[serde(deserialize_with = "lenient::string_list")]
    strengths: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::string_list")]
    improvements: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::string")]
    ideal_answer: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    tips: Option<Vec<String>>,
}

fn preview(raw: &str) -> String {
    raw.chars().take(ERROR_PREVIEW_CHARS).collect()
}

/// Accepts a top-level array, an object wrapping a `questions` array, or a single
/// question object (what remains after sanitization cut an array down to its only item).
fn question_items(parsed: Value) -> Vec<Value> {
    match parsed {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            _ if map.contains_key("id") || map.contains_key("text") => vec![Value::Object(map)],
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// `position` is 1-based and counts every item the model returned.
fn map_question(item: Value, position: usize) -> Option<InterviewQuestion> {
    let raw = match item {
        Value::Object(_) => serde_json::from_value::<RawQuestion>(item).ok()?,
        Value::String(_) => RawQuestion {
            text: clean_text(&item),
            ..RawQuestion::default()
        },
        _ => return None,
    };

    Some(InterviewQuestion {
        id: raw
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("q{position}")),
        text: raw.text.unwrap_or_default(),
        topic: raw.topic.filter(|t| !t.is_empty()),
        suggested_duration_sec: raw
            .suggested_duration_sec
            .filter(|secs| *secs >= 0)
            .map(|secs| secs.min(u32::MAX as i64) as u32),
    })
}

/// Maps raw model output to interview questions.
///
/// The count is whatever the model returned: the list is neither padded nor truncated
/// to `num_questions`.
pub fn map_interview_questions(
    raw: &str,
    request: &InterviewQuestionsRequest,
) -> Result<InterviewQuestionsResult, GenerationError> {
    let parsed = parse_model_output(raw).ok_or_else(|| {
        GenerationError::EmptyOrInvalidGeneration(format!(
            "model did not return valid question JSON: {}",
            preview(raw)
        ))
    })?;

    let questions: Vec<InterviewQuestion> = question_items(parsed)
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| map_question(item, i + 1))
        .collect();

    if questions.is_empty() {
        return Err(GenerationError::EmptyOrInvalidGeneration(
            "model returned no interview questions".to_string(),
        ));
    }

    if questions.len() != request.num_questions as usize {
        warn!(
            requested = request.num_questions,
            returned = questions.len(),
            "Model returned a different number of interview questions than requested"
        );
    }

    Ok(InterviewQuestionsResult {
        session_template_id: Uuid::new_v4().to_string(),
        job_field: request.job_field.clone(),
        target_role: request.target_role.clone(),
        difficulty: request.difficulty.clone(),
        language: request.language.clone(),
        questions,
    })
}

/// Maps raw model output to answer feedback. Never fails.
pub fn map_interview_feedback(
    raw: &str,
    request: &InterviewFeedbackRequest,
) -> InterviewFeedbackResult {
    let parsed = parse_model_output(raw);
    if parsed.is_none() {
        warn!("Interview feedback output is not JSON; returning defaults");
    }
    let feedback: RawFeedback = decode_or_default(parsed);

    InterviewFeedbackResult {
        question_id: request.question.id.clone(),
        job_field: request.job_field.clone(),
        difficulty: request.difficulty.clone(),
        language: request.language.clone(),
        answer_score: feedback.answer_score.unwrap_or(0).clamp(0, 100) as u8,
        strengths: feedback.strengths.unwrap_or_default(),
        improvements: feedback.improvements.unwrap_or_default(),
        ideal_answer: feedback.ideal_answer.unwrap_or_else(|| sanitize(raw)),
        tips: feedback.tips.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::models::{FeedbackAnswer, FeedbackQuestion};

    fn questions_request(num_questions: u32) -> InterviewQuestionsRequest {
        InterviewQuestionsRequest {
            job_field: "Software Engineering".to_string(),
            target_role: Some("Backend Developer".to_string()),
            difficulty: "MEDIUM".to_string(),
            language: "id".to_string(),
            num_questions,
        }
    }

    fn feedback_request() -> InterviewFeedbackRequest {
        InterviewFeedbackRequest {
            job_field: "Software Engineering".to_string(),
            target_role: None,
            difficulty: "HARD".to_string(),
            language: "en".to_string(),
            question: FeedbackQuestion {
                id: Some("q2".to_string()),
                text: "Describe a production incident.".to_string(),
            },
            answer: FeedbackAnswer {
                text: "We had an outage...".to_string(),
            },
        }
    }

    #[test]
    fn test_fenced_single_question_is_not_padded() {
        let raw = "```json\n[{\"id\":\"q1\",\"text\":\"Explain REST\"}]\n```";
        let result = map_interview_questions(raw, &questions_request(3)).unwrap();

        assert_eq!(result.questions.len(), 1);
        assert_eq!(
            result.questions[0],
            InterviewQuestion {
                id: "q1".to_string(),
                text: "Explain REST".to_string(),
                topic: None,
                suggested_duration_sec: None,
            }
        );
        assert_eq!(result.difficulty, "MEDIUM");
        assert_eq!(result.target_role.as_deref(), Some("Backend Developer"));
    }

    #[test]
    fn test_fenced_array_with_spaced_language_tag_keeps_every_question() {
        let raw = "```json \n[{\"id\":\"q1\",\"text\":\"a\"},{\"id\":\"q2\",\"text\":\"b\"}]\n```";
        let result = map_interview_questions(raw, &questions_request(2)).unwrap();

        let ids: Vec<&str> = result.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, ["q1", "q2"]);
        assert_eq!(result.questions[1].text, "b");
    }

    #[test]
    fn test_schema_conformant_questions_are_reproduced() {
        let raw = r#"[
            {"id": "q1", "text": "What is ownership?", "topic": "Technical", "suggested_duration_sec": 90},
            {"id": "q2", "text": "Tell me about a conflict.", "topic": "Behavioral", "suggested_duration_sec": 120}
        ]"#;
        let result = map_interview_questions(raw, &questions_request(2)).unwrap();

        assert_eq!(result.questions.len(), 2);
        assert_eq!(result.questions[1].id, "q2");
        assert_eq!(result.questions[1].topic.as_deref(), Some("Behavioral"));
        assert_eq!(result.questions[1].suggested_duration_sec, Some(120));
        assert!(Uuid::parse_str(&result.session_template_id).is_ok());
    }

    #[test]
    fn test_missing_ids_fall_back_to_position() {
        let raw = r#"[{"text": "A"}, 42, {"id": "", "text": "C", "suggested_duration_sec": 60.4}, "D"]"#;
        let result = map_interview_questions(raw, &questions_request(4)).unwrap();

        let ids: Vec<&str> = result.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, ["q1", "q3", "q4"]);
        assert_eq!(result.questions[1].suggested_duration_sec, Some(60));
        assert_eq!(result.questions[2].text, "D");
    }

    #[test]
    fn test_question_without_text_keeps_empty_text() {
        let result = map_interview_questions(r#"[{"id": "q1"}]"#, &questions_request(1)).unwrap();
        assert_eq!(result.questions[0].text, "");
    }

    #[test]
    fn test_wrapped_questions_object_is_accepted() {
        let raw = r#"{"questions": [{"id": "q1", "text": "Why us?"}]}"#;
        let result = map_interview_questions(raw, &questions_request(1)).unwrap();
        assert_eq!(result.questions[0].text, "Why us?");
    }

    #[test]
    fn test_empty_or_unparsable_questions_fail() {
        for raw in [
            "[]",
            "",
            "{}",
            "Sorry, I can't do that.",
            "{\"questions\": []}",
            "[1, 2, null]",
        ] {
            let err = map_interview_questions(raw, &questions_request(5)).unwrap_err();
            assert!(
                matches!(err, GenerationError::EmptyOrInvalidGeneration(_)),
                "input {raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_feedback_schema_conformant_output_is_reproduced() {
        let raw = r#"{
            "answer_score": 64,
            "strengths": ["Honest"],
            "improvements": ["Use STAR"],
            "ideal_answer": "Situation, task, action, result.",
            "tips": ["Quantify downtime"]
        }"#;
        let result = map_interview_feedback(raw, &feedback_request());

        assert_eq!(result.answer_score, 64);
        assert_eq!(result.strengths, ["Honest"]);
        assert_eq!(result.improvements, ["Use STAR"]);
        assert_eq!(result.ideal_answer, "Situation, task, action, result.");
        assert_eq!(result.tips, ["Quantify downtime"]);
        assert_eq!(result.question_id.as_deref(), Some("q2"));
        assert_eq!(result.difficulty, "HARD");
        assert_eq!(result.language, "en");
    }

    #[test]
    fn test_feedback_defaults_on_malformed_output() {
        let raw = "Good answer overall, but add numbers.";
        let result = map_interview_feedback(raw, &feedback_request());

        assert_eq!(result.answer_score, 0);
        assert!(result.strengths.is_empty());
        assert!(result.improvements.is_empty());
        assert!(result.tips.is_empty());
        assert_eq!(result.ideal_answer, raw);
    }

    #[test]
    fn test_feedback_ideal_answer_defaults_to_sanitized_text() {
        let raw = "```json\n{\"answer_score\": \"70\"}\n```";
        let result = map_interview_feedback(raw, &feedback_request());
        assert_eq!(result.answer_score, 70);
        assert_eq!(result.ideal_answer, "{\"answer_score\": \"70\"}");
    }
}
