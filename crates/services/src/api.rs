//! Collaborator contracts for the learning session engine.
//!
//! Every remote service the engine talks to sits behind one of these traits;
//! `HttpSyncClient` implements them over the wire and `InMemoryApi` implements
//! them for tests and prototyping. All calls yield a tagged `SyncError`
//! taxonomy instead of raw transport errors.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use course_core::model::{
    CartItem, CartItemId, Course, CourseId, LessonId, Note, NoteId,
};

use crate::error::SyncError;

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

/// Per-learner progress fact as returned by the course content service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressFact {
    pub lesson_id: LessonId,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub watched_seconds: f64,
    #[serde(default)]
    pub last_position_seconds: f64,
}

/// Course structure plus the learner's progress records, fetched in one
/// round trip and merged client-side by the progress store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSnapshot {
    pub course: Course,
    #[serde(default)]
    pub progress: Vec<ProgressFact>,
}

/// One throttled playback report.
///
/// `sequence` is monotonic per tracker so the server can treat the
/// highest-tagged report as authoritative regardless of delivery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub course_id: CourseId,
    pub lesson_id: LessonId,
    pub watched_seconds: f64,
    pub last_position_seconds: f64,
    pub sequence: u64,
    pub sampled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuiz {
    pub quiz_id: String,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub question: u32,
    pub answer: String,
}

/// Graded quiz result. `results` stays opaque to this engine; quizzes never
/// affect lesson completion state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub results: serde_json::Value,
    pub score: f64,
    pub passed: bool,
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

#[async_trait]
pub trait CourseContentApi: Send + Sync {
    /// Fetch the full course structure with embedded progress records.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NotFound` for an unknown course, or other
    /// taxonomy variants for auth/transport failures.
    async fn fetch_course_content(&self, course_id: CourseId)
    -> Result<CourseSnapshot, SyncError>;
}

#[async_trait]
pub trait ProgressApi: Send + Sync {
    /// Submit one playback report.
    ///
    /// # Errors
    ///
    /// Returns a `SyncError` taxonomy variant on failure.
    async fn post_progress(&self, report: &ProgressReport) -> Result<(), SyncError>;

    /// Mark a lesson complete on the server.
    ///
    /// # Errors
    ///
    /// Returns a `SyncError` taxonomy variant on failure.
    async fn post_completion(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<(), SyncError>;
}

#[async_trait]
pub trait NotesApi: Send + Sync {
    /// List notes for one (course, lesson) pair.
    ///
    /// # Errors
    ///
    /// Returns a `SyncError` taxonomy variant on failure.
    async fn list_notes(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<Vec<Note>, SyncError>;

    /// Create a note with a client-minted id.
    ///
    /// # Errors
    ///
    /// Returns a `SyncError` taxonomy variant on failure.
    async fn create_note(&self, note: &Note) -> Result<(), SyncError>;

    /// Replace a note's content.
    ///
    /// # Errors
    ///
    /// Returns a `SyncError` taxonomy variant on failure.
    async fn update_note(&self, note: &Note) -> Result<(), SyncError>;

    /// Delete a note. `NotFound` means it was already gone.
    ///
    /// # Errors
    ///
    /// Returns a `SyncError` taxonomy variant on failure.
    async fn delete_note(&self, note_id: NoteId) -> Result<(), SyncError>;
}

#[async_trait]
pub trait CartApi: Send + Sync {
    /// Current authoritative cart contents.
    ///
    /// # Errors
    ///
    /// Returns a `SyncError` taxonomy variant on failure.
    async fn list_cart(&self) -> Result<Vec<CartItem>, SyncError>;

    /// Remove one item. `NotFound` means it was already gone.
    ///
    /// # Errors
    ///
    /// Returns a `SyncError` taxonomy variant on failure.
    async fn remove_cart_item(&self, item_id: CartItemId) -> Result<(), SyncError>;
}

#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Ask the quiz service for a generated quiz for one lesson.
    ///
    /// # Errors
    ///
    /// Returns a `SyncError` taxonomy variant on failure.
    async fn generate(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<GeneratedQuiz, SyncError>;

    /// Submit answers for grading.
    ///
    /// # Errors
    ///
    /// Returns a `SyncError` taxonomy variant on failure.
    async fn submit(
        &self,
        quiz_id: &str,
        answers: &[QuizAnswer],
        course_id: CourseId,
    ) -> Result<QuizOutcome, SyncError>;
}

//
// ─── IN-MEMORY FAKE ────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct InMemoryState {
    snapshot: Option<CourseSnapshot>,
    notes: Vec<Note>,
    cart: Vec<CartItem>,
    quiz: Option<GeneratedQuiz>,
    quiz_outcome: Option<QuizOutcome>,
    reports: Vec<ProgressReport>,
    completions: Vec<(CourseId, LessonId)>,
    failures: VecDeque<SyncError>,
    calls: Vec<&'static str>,
}

/// In-memory implementation of every collaborator trait, for tests and
/// prototyping. Failures can be scripted per upcoming call via `fail_next`.
#[derive(Clone, Default)]
pub struct InMemoryApi {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, InMemoryState>, SyncError> {
        self.state
            .lock()
            .map_err(|e| SyncError::Transient(e.to_string()))
    }

    /// Record the call and consume a scripted failure if one is queued.
    fn begin(&self, op: &'static str) -> Result<MutexGuard<'_, InMemoryState>, SyncError> {
        let mut state = self.lock()?;
        state.calls.push(op);
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        Ok(state)
    }

    pub fn set_snapshot(&self, snapshot: CourseSnapshot) {
        if let Ok(mut state) = self.state.lock() {
            state.snapshot = Some(snapshot);
        }
    }

    pub fn seed_notes(&self, notes: Vec<Note>) {
        if let Ok(mut state) = self.state.lock() {
            state.notes = notes;
        }
    }

    pub fn seed_cart(&self, items: Vec<CartItem>) {
        if let Ok(mut state) = self.state.lock() {
            state.cart = items;
        }
    }

    pub fn seed_quiz(&self, quiz: GeneratedQuiz, outcome: QuizOutcome) {
        if let Ok(mut state) = self.state.lock() {
            state.quiz = Some(quiz);
            state.quiz_outcome = Some(outcome);
        }
    }

    /// Queue a failure for the next API call, in call order.
    pub fn fail_next(&self, error: SyncError) {
        if let Ok(mut state) = self.state.lock() {
            state.failures.push_back(error);
        }
    }

    #[must_use]
    pub fn reports(&self) -> Vec<ProgressReport> {
        self.state.lock().map(|s| s.reports.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn completions(&self) -> Vec<(CourseId, LessonId)> {
        self.state
            .lock()
            .map(|s| s.completions.clone())
            .unwrap_or_default()
    }

    /// Server-side view of the notes collection.
    #[must_use]
    pub fn server_notes(&self) -> Vec<Note> {
        self.state.lock().map(|s| s.notes.clone()).unwrap_or_default()
    }

    /// Server-side view of the cart.
    #[must_use]
    pub fn server_cart(&self) -> Vec<CartItem> {
        self.state.lock().map(|s| s.cart.clone()).unwrap_or_default()
    }

    /// Names of the API calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CourseContentApi for InMemoryApi {
    async fn fetch_course_content(
        &self,
        course_id: CourseId,
    ) -> Result<CourseSnapshot, SyncError> {
        let state = self.begin("fetch_course_content")?;
        match &state.snapshot {
            Some(snapshot) if snapshot.course.id() == course_id => Ok(snapshot.clone()),
            _ => Err(SyncError::NotFound),
        }
    }
}

#[async_trait]
impl ProgressApi for InMemoryApi {
    async fn post_progress(&self, report: &ProgressReport) -> Result<(), SyncError> {
        let mut state = self.begin("post_progress")?;
        if let Some(snapshot) = state.snapshot.as_mut() {
            if let Some(fact) = snapshot
                .progress
                .iter_mut()
                .find(|f| f.lesson_id == report.lesson_id)
            {
                fact.watched_seconds = report.watched_seconds;
                fact.last_position_seconds = report.last_position_seconds;
            } else {
                snapshot.progress.push(ProgressFact {
                    lesson_id: report.lesson_id,
                    completed: false,
                    completed_at: None,
                    watched_seconds: report.watched_seconds,
                    last_position_seconds: report.last_position_seconds,
                });
            }
        }
        state.reports.push(report.clone());
        Ok(())
    }

    async fn post_completion(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<(), SyncError> {
        let mut state = self.begin("post_completion")?;
        let now = Utc::now();
        if let Some(snapshot) = state.snapshot.as_mut() {
            if let Some(fact) = snapshot
                .progress
                .iter_mut()
                .find(|f| f.lesson_id == lesson_id)
            {
                fact.completed = true;
                fact.completed_at.get_or_insert(now);
            } else {
                snapshot.progress.push(ProgressFact {
                    lesson_id,
                    completed: true,
                    completed_at: Some(now),
                    watched_seconds: 0.0,
                    last_position_seconds: 0.0,
                });
            }
        }
        state.completions.push((course_id, lesson_id));
        Ok(())
    }
}

#[async_trait]
impl NotesApi for InMemoryApi {
    async fn list_notes(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<Vec<Note>, SyncError> {
        let state = self.begin("list_notes")?;
        Ok(state
            .notes
            .iter()
            .filter(|n| n.course_id() == course_id && n.lesson_id() == lesson_id)
            .cloned()
            .collect())
    }

    async fn create_note(&self, note: &Note) -> Result<(), SyncError> {
        let mut state = self.begin("create_note")?;
        state.notes.push(note.clone());
        Ok(())
    }

    async fn update_note(&self, note: &Note) -> Result<(), SyncError> {
        let mut state = self.begin("update_note")?;
        match state.notes.iter_mut().find(|n| n.id() == note.id()) {
            Some(existing) => {
                *existing = note.clone();
                Ok(())
            }
            None => Err(SyncError::NotFound),
        }
    }

    async fn delete_note(&self, note_id: NoteId) -> Result<(), SyncError> {
        let mut state = self.begin("delete_note")?;
        let before = state.notes.len();
        state.notes.retain(|n| n.id() != note_id);
        if state.notes.len() == before {
            return Err(SyncError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CartApi for InMemoryApi {
    async fn list_cart(&self) -> Result<Vec<CartItem>, SyncError> {
        let state = self.begin("list_cart")?;
        Ok(state.cart.clone())
    }

    async fn remove_cart_item(&self, item_id: CartItemId) -> Result<(), SyncError> {
        let mut state = self.begin("remove_cart_item")?;
        let before = state.cart.len();
        state.cart.retain(|item| item.id() != item_id);
        if state.cart.len() == before {
            return Err(SyncError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl QuizApi for InMemoryApi {
    async fn generate(
        &self,
        _course_id: CourseId,
        _lesson_id: LessonId,
    ) -> Result<GeneratedQuiz, SyncError> {
        let state = self.begin("generate_quiz")?;
        state.quiz.clone().ok_or(SyncError::NotFound)
    }

    async fn submit(
        &self,
        _quiz_id: &str,
        _answers: &[QuizAnswer],
        _course_id: CourseId,
    ) -> Result<QuizOutcome, SyncError> {
        let state = self.begin("submit_quiz")?;
        state.quiz_outcome.clone().ok_or(SyncError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_failure_applies_to_next_call_only() {
        let api = InMemoryApi::new();
        api.seed_cart(Vec::new());
        api.fail_next(SyncError::Transient("down".into()));

        assert!(matches!(
            api.list_cart().await,
            Err(SyncError::Transient(_))
        ));
        assert!(api.list_cart().await.is_ok());
    }

    #[tokio::test]
    async fn fetch_unknown_course_is_not_found() {
        let api = InMemoryApi::new();
        let err = api
            .fetch_course_content(CourseId::generate())
            .await
            .unwrap_err();
        assert_eq!(err, SyncError::NotFound);
    }

    #[tokio::test]
    async fn delete_missing_note_is_not_found() {
        let api = InMemoryApi::new();
        let err = api.delete_note(NoteId::generate()).await.unwrap_err();
        assert_eq!(err, SyncError::NotFound);
    }
}
