//! The learning session controller.
//!
//! One `LearningSession` instance exists per course-viewing session and is
//! the sole owner of the course snapshot and the session pointer; the
//! presentation layer holds a handle and reads through it. Completion is
//! applied optimistically and rolled back when the server does not confirm,
//! so the UI never ends up advanced past server truth.

use std::sync::Arc;

use course_core::model::{Course, CourseId, Lesson, SessionPointer};
use course_core::Clock;

use crate::api::{CourseContentApi, ProgressApi, ProgressReport};
use crate::error::{SessionError, SyncError};
use crate::position_tracker::{PositionSample, PositionTracker};
use crate::progress_store::ProgressStore;

/// Controller state machine: `Loading -> Ready`, `Loading -> Failed -> retry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Ready,
    Failed(SyncError),
}

/// Result of a confirmed `mark_lesson_complete`.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    /// The lesson was already complete; a distinct notice, not an error.
    AlreadyComplete,
    Completed {
        /// Where the pointer auto-advanced to; `None` at course end (the
        /// pointer stays on the last lesson).
        advanced_to: Option<SessionPointer>,
        percent_complete: f64,
        /// Every lesson in the course is now complete.
        course_complete: bool,
    },
}

/// Owns the learner's position in the module/lesson hierarchy and drives
/// lesson-complete transitions.
pub struct LearningSession {
    course_id: CourseId,
    clock: Clock,
    content_api: Arc<dyn CourseContentApi>,
    progress_api: Arc<dyn ProgressApi>,
    store: ProgressStore,
    tracker: PositionTracker,
    pointer: SessionPointer,
    phase: SessionPhase,
}

impl LearningSession {
    #[must_use]
    pub fn new(
        course_id: CourseId,
        clock: Clock,
        content_api: Arc<dyn CourseContentApi>,
        progress_api: Arc<dyn ProgressApi>,
    ) -> Self {
        Self {
            course_id,
            clock,
            content_api,
            progress_api,
            store: ProgressStore::new(),
            tracker: PositionTracker::new(),
            pointer: SessionPointer::default(),
            phase: SessionPhase::Loading,
        }
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    #[must_use]
    pub fn pointer(&self) -> SessionPointer {
        self.pointer
    }

    #[must_use]
    pub fn course(&self) -> Option<&Course> {
        self.store.course()
    }

    #[must_use]
    pub fn current_lesson(&self) -> Option<&Lesson> {
        self.store.lesson_at(self.pointer)
    }

    #[must_use]
    pub fn percent_complete(&self) -> f64 {
        self.store.percent_complete()
    }

    /// Fetch the course snapshot and enter `Ready`.
    ///
    /// The pointer starts at `resume` when it resolves against the fetched
    /// course, otherwise at the first lesson.
    ///
    /// # Errors
    ///
    /// On a failed fetch the session enters `Failed` and the error is
    /// returned; `retry` re-runs the fetch.
    pub async fn start(&mut self, resume: Option<SessionPointer>) -> Result<(), SessionError> {
        self.phase = SessionPhase::Loading;
        let snapshot = match self.content_api.fetch_course_content(self.course_id).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.phase = SessionPhase::Failed(err.clone());
                return Err(SessionError::Sync(err));
            }
        };

        self.store
            .apply_course_snapshot(snapshot.course, &snapshot.progress);
        self.pointer = resume
            .filter(|p| self.store.course().is_some_and(|c| c.resolves(*p)))
            .or_else(|| self.store.course().and_then(Course::first_position))
            .unwrap_or_default();

        self.tracker.clear();
        self.refocus();
        self.phase = SessionPhase::Ready;
        Ok(())
    }

    /// Re-run the initial fetch after a failure.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotReady` unless the session is in `Failed`;
    /// otherwise behaves like `start`.
    pub async fn retry(&mut self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Failed(_) => self.start(None).await,
            _ => Err(SessionError::NotReady),
        }
    }

    /// Wholesale snapshot replacement while `Ready`.
    ///
    /// The pointer is kept when it still resolves, else reset to the first
    /// lesson. The session stays `Ready` if the fetch fails.
    ///
    /// # Errors
    ///
    /// Returns the sync failure for the caller to surface.
    pub async fn refresh(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Ready {
            return Err(SessionError::NotReady);
        }
        if let Some(report) = self.tracker.flush(self.clock.now()) {
            // a lost flush is superseded by the refreshed snapshot
            let _ = self.submit_report(report).await;
        }

        let snapshot = self
            .content_api
            .fetch_course_content(self.course_id)
            .await
            .map_err(SessionError::Sync)?;
        self.store
            .apply_course_snapshot(snapshot.course, &snapshot.progress);
        if !self.store.course().is_some_and(|c| c.resolves(self.pointer)) {
            self.pointer = self
                .store
                .course()
                .and_then(Course::first_position)
                .unwrap_or_default();
        }
        self.refocus();
        Ok(())
    }

    /// Move focus to the lesson at `(module, lesson)`.
    ///
    /// Guarded: a coordinate that does not resolve is a no-op returning
    /// `false`. Switching flushes the previous lesson's held playback sample
    /// as a final report; a transport failure there is discarded, since the
    /// next report (or a fresh snapshot) supersedes it.
    pub async fn select_lesson(&mut self, module: usize, lesson: usize) -> bool {
        if self.phase != SessionPhase::Ready {
            return false;
        }
        let target = SessionPointer::new(module, lesson);
        if !self.store.course().is_some_and(|c| c.resolves(target)) {
            return false;
        }
        if target == self.pointer {
            return true;
        }

        self.pointer = target;
        if let Some(final_report) = self.refocus() {
            let _ = self.submit_report(final_report).await;
        }
        true
    }

    /// Feed one player timing callback for the focused lesson.
    ///
    /// Emits at most one report per throttle window; an emitted report is
    /// submitted immediately and folded into the fact base on success.
    ///
    /// # Errors
    ///
    /// Returns the sync failure when a due report could not be delivered;
    /// the sample itself is never lost to the throttle.
    pub async fn record_playback(&mut self, sample: PositionSample) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Ready {
            return Err(SessionError::NotReady);
        }
        let now = self.clock.now();
        if let Some(report) = self.tracker.sample(sample, now) {
            self.submit_report(report).await?;
        }
        Ok(())
    }

    /// Mark the focused lesson complete and auto-advance.
    ///
    /// Already-complete lessons yield `CompletionOutcome::AlreadyComplete`
    /// without a network call. Otherwise the record is flipped
    /// optimistically, the completion is posted, and on confirmation the
    /// pointer advances to the next lesson (or stays in place at course
    /// end).
    ///
    /// # Errors
    ///
    /// On a failed post the optimistic flip is rolled back, the pointer is
    /// left untouched, and the failure is returned for the caller to
    /// surface — exactly one notice per failure.
    pub async fn mark_lesson_complete(&mut self) -> Result<CompletionOutcome, SessionError> {
        if self.phase != SessionPhase::Ready {
            return Err(SessionError::NotReady);
        }
        let Some(lesson) = self.store.lesson_at(self.pointer) else {
            return Err(SessionError::NotReady);
        };
        let lesson_id = lesson.id();
        if lesson.progress().completed() {
            return Ok(CompletionOutcome::AlreadyComplete);
        }

        let now = self.clock.now();
        if let Some(report) = self.tracker.flush(now) {
            // completion flushes held playback; best-effort
            let _ = self.submit_report(report).await;
        }

        self.store.apply_local_completion(lesson_id, now);
        if let Err(err) = self
            .progress_api
            .post_completion(self.course_id, lesson_id)
            .await
        {
            self.store.revert_local_completion(lesson_id);
            return Err(SessionError::Sync(err));
        }

        let percent_complete = self.store.percent_complete();
        let advanced_to = self
            .store
            .course()
            .and_then(|c| c.position_after(self.pointer));
        if let Some(next) = advanced_to {
            self.pointer = next;
            self.refocus();
        }
        let total = self.store.total_lessons();
        let course_complete = total > 0 && self.store.completed_lessons() == total;

        Ok(CompletionOutcome::Completed {
            advanced_to,
            percent_complete,
            course_complete,
        })
    }

    /// Flush held playback on session exit.
    pub async fn finish(&mut self) {
        if let Some(report) = self.tracker.flush(self.clock.now()) {
            let _ = self.submit_report(report).await;
        }
        self.tracker.clear();
    }

    /// Point the tracker at the lesson under the pointer, returning the
    /// previous lesson's final report if one was held.
    fn refocus(&mut self) -> Option<ProgressReport> {
        let now = self.clock.now();
        let lesson = self.store.lesson_at(self.pointer)?;
        self.tracker
            .focus(self.course_id, lesson.id(), lesson.kind(), now)
    }

    async fn submit_report(&mut self, report: ProgressReport) -> Result<(), SessionError> {
        self.progress_api.post_progress(&report).await?;
        self.store.apply_report(&report);
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
