//! Career assistance: CV review, interview questions, answer feedback, career roadmap.
//!
//! Flow per task: request → prompt (+ CV text) → one model call → sanitize → typed result.
//! All model calls go through `llm_client`; nothing here talks to the API directly.

pub mod cv_review;
pub mod handlers;
pub mod interview;
pub mod lenient;
pub mod models;
pub mod prompts;
pub mod roadmap;
pub mod schemas;

use tracing::{debug, info};

use crate::document::extract_document_text_blocking;
use crate::llm_client::{GenerationError, ModelClient};

use self::models::{
    CareerRoadmapRequest, CareerRoadmapResult, CvReviewRequest, CvReviewResult,
    GenerationRequest, InterviewFeedbackRequest, InterviewFeedbackResult,
    InterviewQuestionsRequest, InterviewQuestionsResult, TypedResult,
};
use self::prompts::Prompt;
use self::schemas::TaskKind;

/// Orchestrates the four generation tasks over one shared `ModelClient`.
///
/// Stateless between calls; clone freely across concurrent requests.
#[derive(Clone)]
pub struct CareerAssistant {
    model: ModelClient,
}

impl CareerAssistant {
    pub fn new(model: ModelClient) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    /// Reviews a CV. The uploaded document is optional; extraction problems only mean
    /// the prompt says no CV text was supplied.
    pub async fn review_cv(&self, request: &CvReviewRequest) -> Result<CvReviewResult, GenerationError> {
        let document_text = extract_document_text_blocking(request.cv_file_base64.clone()).await;
        let prompt = prompts::build_cv_review_prompt(request, &document_text);

        let raw = self.call(TaskKind::CvReview, &prompt).await?;
        Ok(cv_review::map_cv_review(&raw, request))
    }

    pub async fn interview_questions(
        &self,
        request: &InterviewQuestionsRequest,
    ) -> Result<InterviewQuestionsResult, GenerationError> {
        let prompt = prompts::build_interview_questions_prompt(request);
        let raw = self.call(TaskKind::InterviewQuestions, &prompt).await?;
        interview::map_interview_questions(&raw, request)
    }

    pub async fn interview_feedback(
        &self,
        request: &InterviewFeedbackRequest,
    ) -> Result<InterviewFeedbackResult, GenerationError> {
        let prompt = prompts::build_interview_feedback_prompt(request);
        let raw = self.call(TaskKind::InterviewFeedback, &prompt).await?;
        Ok(interview::map_interview_feedback(&raw, request))
    }

    pub async fn career_roadmap(
        &self,
        request: &CareerRoadmapRequest,
    ) -> Result<CareerRoadmapResult, GenerationError> {
        let prompt = prompts::build_career_roadmap_prompt(request);
        let raw = self.call(TaskKind::CareerRoadmap, &prompt).await?;
        Ok(roadmap::map_career_roadmap(&raw, request))
    }

    /// Dispatches a tagged request to its task.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<TypedResult, GenerationError> {
        match request {
            GenerationRequest::CvReview(r) => self.review_cv(r).await.map(TypedResult::CvReview),
            GenerationRequest::InterviewQuestions(r) => self
                .interview_questions(r)
                .await
                .map(TypedResult::InterviewQuestions),
            GenerationRequest::InterviewFeedback(r) => self
                .interview_feedback(r)
                .await
                .map(TypedResult::InterviewFeedback),
            GenerationRequest::CareerRoadmap(r) => {
                self.career_roadmap(r).await.map(TypedResult::CareerRoadmap)
            }
        }
    }

    async fn call(&self, kind: TaskKind, prompt: &Prompt) -> Result<String, GenerationError> {
        info!(task = kind.as_str(), model = %self.model.model(), "Running generation task");

        let raw = self
            .model
            .generate(
                &prompt.instruction,
                Some(prompt.system_instruction.as_str()),
                Some(prompt.schema),
            )
            .await?;

        debug!(task = kind.as_str(), raw_chars = raw.len(), "Model returned output");
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;

    use super::*;
    use crate::generation::models::{FeedbackAnswer, FeedbackQuestion};
    use crate::generation::schemas::schema_for;
    use crate::llm_client::test_support::{candidate_envelope, client_for, spawn_stub, Seen};

    async fn assistant_answering(text: &str) -> (CareerAssistant, Seen) {
        let (base_url, seen) =
            spawn_stub(StatusCode::OK, candidate_envelope(text), Duration::ZERO).await;
        let client = client_for(base_url, Some("test-key"), Duration::from_secs(5));
        (CareerAssistant::new(client), seen)
    }

    fn questions_request() -> InterviewQuestionsRequest {
        InterviewQuestionsRequest {
            job_field: "Software Engineering".to_string(),
            target_role: Some("Backend Developer".to_string()),
            difficulty: "MEDIUM".to_string(),
            language: "id".to_string(),
            num_questions: 3,
        }
    }

    #[tokio::test]
    async fn test_fenced_single_question_end_to_end() {
        let (assistant, seen) =
            assistant_answering("```json\n[{\"id\":\"q1\",\"text\":\"Explain REST\"}]\n```").await;

        let result = assistant.interview_questions(&questions_request()).await.unwrap();
        assert_eq!(result.questions.len(), 1);
        assert_eq!(result.questions[0].id, "q1");
        assert_eq!(result.questions[0].text, "Explain REST");
        assert_eq!(result.questions[0].topic, None);

        let (_, _, payload) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(
            payload["generationConfig"]["response_schema"],
            *schema_for(TaskKind::InterviewQuestions)
        );
        let prompt = payload["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("Software Engineering"));
    }

    #[tokio::test]
    async fn test_empty_question_list_is_an_error() {
        let (assistant, _) = assistant_answering("[]").await;
        let err = assistant.interview_questions(&questions_request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyOrInvalidGeneration(_)));
    }

    #[tokio::test]
    async fn test_cv_review_without_document_still_runs() {
        let (assistant, seen) = assistant_answering(
            r#"{"overall_score": 81, "rating_label": "Baik", "summary": "Solid CV."}"#,
        )
        .await;
        let request = CvReviewRequest {
            job_field: "Data".to_string(),
            target_role: None,
            language: "id".to_string(),
            cv_file_base64: Some("not-a-pdf".to_string()),
        };

        let result = assistant.review_cv(&request).await.unwrap();
        assert_eq!(result.overall_score, 81);
        assert_eq!(result.rating_label, "Baik");

        let (_, _, payload) = seen.lock().unwrap().clone().unwrap();
        let system = payload["system_instruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(system.contains("'id'"));
    }

    #[tokio::test]
    async fn test_generate_dispatches_by_task() {
        let (assistant, _) = assistant_answering(r#"{"stages": []}"#).await;
        let request = GenerationRequest::CareerRoadmap(CareerRoadmapRequest {
            job_field: "Data".to_string(),
            target_role: "Data Engineer".to_string(),
            current_level: "ENTRY".to_string(),
            known_skills: Vec::new(),
            language: "en".to_string(),
        });

        match assistant.generate(&request).await.unwrap() {
            TypedResult::CareerRoadmap(roadmap) => {
                assert_eq!(roadmap.stages.len(), 1);
                assert_eq!(roadmap.target_role, "Data Engineer");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_feedback_on_prose_output_uses_defaults() {
        let (assistant, _) = assistant_answering("Nice answer.").await;
        let request = InterviewFeedbackRequest {
            job_field: "Design".to_string(),
            target_role: None,
            difficulty: "EASY".to_string(),
            language: "en".to_string(),
            question: FeedbackQuestion {
                id: None,
                text: "Why design?".to_string(),
            },
            answer: FeedbackAnswer {
                text: "I like it.".to_string(),
            },
        };

        let result = assistant.interview_feedback(&request).await.unwrap();
        assert_eq!(result.answer_score, 0);
        assert_eq!(result.ideal_answer, "Nice answer.");
    }

    #[tokio::test]
    async fn test_missing_credential_surfaces_from_every_task() {
        let client = client_for("http://127.0.0.1:9".to_string(), None, Duration::from_secs(1));
        let assistant = CareerAssistant::new(client);

        let err = assistant.interview_questions(&questions_request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::CredentialMissing));
    }
}
