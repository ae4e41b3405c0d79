//! Thin seam over the quiz collaborator.
//!
//! Quizzes are opaque to the session engine: generating or submitting one
//! never touches lesson completion state.

use std::sync::Arc;

use course_core::model::{CourseId, LessonId};

use crate::api::{GeneratedQuiz, QuizAnswer, QuizApi, QuizOutcome};
use crate::error::SyncError;

#[derive(Clone)]
pub struct QuizService {
    api: Arc<dyn QuizApi>,
}

impl QuizService {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>) -> Self {
        Self { api }
    }

    /// Ask the quiz service to generate a quiz for one lesson.
    ///
    /// # Errors
    ///
    /// Returns a `SyncError` taxonomy variant on failure.
    pub async fn generate(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<GeneratedQuiz, SyncError> {
        self.api.generate(course_id, lesson_id).await
    }

    /// Submit answers for grading.
    ///
    /// # Errors
    ///
    /// Returns a `SyncError` taxonomy variant on failure.
    pub async fn submit(
        &self,
        quiz_id: &str,
        answers: &[QuizAnswer],
        course_id: CourseId,
    ) -> Result<QuizOutcome, SyncError> {
        self.api.submit(quiz_id, answers, course_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryApi;

    #[tokio::test]
    async fn submit_passes_the_outcome_through() {
        let api = InMemoryApi::new();
        api.seed_quiz(
            GeneratedQuiz {
                quiz_id: "quiz-1".into(),
                questions: Vec::new(),
            },
            QuizOutcome {
                results: serde_json::Value::Null,
                score: 80.0,
                passed: true,
            },
        );

        let quiz = QuizService::new(Arc::new(api));
        let course_id = CourseId::generate();
        let generated = quiz
            .generate(course_id, LessonId::generate())
            .await
            .unwrap();
        let outcome = quiz.submit(&generated.quiz_id, &[], course_id).await.unwrap();

        assert!(outcome.passed);
        assert_eq!(outcome.score, 80.0);
    }
}
