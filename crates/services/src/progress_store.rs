//! Per-lesson fact base: server course structure merged with server
//! progress records, plus the locally-optimistic updates layered on top.

use chrono::{DateTime, Utc};

use course_core::model::{Course, Lesson, LessonId, ProgressRecord, SessionPointer};

use crate::api::{ProgressFact, ProgressReport};

/// Merged course + progress facts for one viewing session.
///
/// The session controller is the only writer; everything else reads
/// through it.
#[derive(Debug, Clone, Default)]
pub struct ProgressStore {
    course: Option<Course>,
}

impl ProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot wholesale and merge progress facts by lesson id.
    ///
    /// Lessons with no matching fact keep the default record (not completed,
    /// zero watched). Facts referencing unknown lessons are ignored.
    /// Applying the identical snapshot twice is a no-op.
    pub fn apply_course_snapshot(&mut self, mut course: Course, facts: &[ProgressFact]) {
        for fact in facts {
            if let Some(lesson) = course.lesson_by_id_mut(fact.lesson_id) {
                let record = lesson.progress_mut();
                *record = ProgressRecord::from_parts(
                    fact.completed,
                    fact.completed_at,
                    fact.watched_seconds,
                    fact.last_position_seconds,
                );
            }
        }
        self.course = Some(course);
    }

    #[must_use]
    pub fn course(&self) -> Option<&Course> {
        self.course.as_ref()
    }

    #[must_use]
    pub fn lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.course.as_ref()?.lesson_by_id(id)
    }

    #[must_use]
    pub fn lesson_at(&self, pointer: SessionPointer) -> Option<&Lesson> {
        self.course.as_ref()?.lesson_at(pointer)
    }

    /// Optimistically mark a lesson complete.
    ///
    /// Idempotent: returns `false` when the lesson was already complete or
    /// does not exist (a no-op, not an error).
    pub fn apply_local_completion(&mut self, lesson_id: LessonId, now: DateTime<Utc>) -> bool {
        self.course
            .as_mut()
            .and_then(|c| c.lesson_by_id_mut(lesson_id))
            .is_some_and(|lesson| lesson.progress_mut().mark_completed(now))
    }

    /// Roll back an optimistic completion the server did not confirm.
    pub fn revert_local_completion(&mut self, lesson_id: LessonId) {
        if let Some(lesson) = self
            .course
            .as_mut()
            .and_then(|c| c.lesson_by_id_mut(lesson_id))
        {
            lesson.progress_mut().clear_completed();
        }
    }

    /// Fold a confirmed playback report into the fact base.
    ///
    /// The report is bound to its lesson id; a report for a lesson that is
    /// no longer focused (or no longer present) touches nothing else.
    pub fn apply_report(&mut self, report: &ProgressReport) {
        if let Some(lesson) = self
            .course
            .as_mut()
            .and_then(|c| c.lesson_by_id_mut(report.lesson_id))
        {
            lesson
                .progress_mut()
                .record_position(report.watched_seconds, report.last_position_seconds);
        }
    }

    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.course.as_ref().map_or(0, Course::total_lessons)
    }

    #[must_use]
    pub fn completed_lessons(&self) -> usize {
        self.course.as_ref().map_or(0, Course::completed_lessons)
    }

    /// Aggregate completion percentage, derived and never stored.
    ///
    /// `0.0` when the course has no lessons; always within `[0, 100]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_complete(&self) -> f64 {
        let total = self.total_lessons();
        if total == 0 {
            return 0.0;
        }
        self.completed_lessons() as f64 / total as f64 * 100.0
    }
}
