//! Converts raw player timing callbacks into a throttled progress-report
//! stream.
//!
//! At most one report is emitted per fixed window; samples arriving inside
//! the window are held as the pending report (last-observed-wins, so a
//! backward seek still forwards) and emitted by the next qualifying sample
//! or an explicit flush. Refocusing on another lesson flushes the previous
//! lesson's pending sample as a final report tagged with the *previous*
//! lesson id, so a late emission can never touch the new lesson's record.

use chrono::{DateTime, Duration, Utc};

use course_core::model::{CourseId, LessonId, LessonKind};

use crate::api::ProgressReport;

/// Fixed report window: one report per lesson per 15 seconds.
pub const REPORT_WINDOW_SECS: i64 = 15;

/// One raw timing callback from the media surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub played_seconds: f64,
    pub played_fraction: f64,
}

#[derive(Debug, Clone)]
struct LessonFocus {
    course_id: CourseId,
    lesson_id: LessonId,
    kind: LessonKind,
    last_emitted_at: Option<DateTime<Utc>>,
    pending: Option<(PositionSample, DateTime<Utc>)>,
}

/// Owns the throttle state for the lesson currently being played.
#[derive(Debug)]
pub struct PositionTracker {
    window: Duration,
    focus: Option<LessonFocus>,
    sequence: u64,
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(Duration::seconds(REPORT_WINDOW_SECS))
    }

    #[must_use]
    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            focus: None,
            sequence: 0,
        }
    }

    #[must_use]
    pub fn focused_lesson(&self) -> Option<LessonId> {
        self.focus.as_ref().map(|f| f.lesson_id)
    }

    /// Switch the tracker to a new lesson.
    ///
    /// Returns the previous lesson's pending sample as an immediate final
    /// report, if one was held.
    pub fn focus(
        &mut self,
        course_id: CourseId,
        lesson_id: LessonId,
        kind: LessonKind,
        now: DateTime<Utc>,
    ) -> Option<ProgressReport> {
        let flushed = self.flush(now);
        self.focus = Some(LessonFocus {
            course_id,
            lesson_id,
            kind,
            last_emitted_at: None,
            pending: None,
        });
        flushed
    }

    /// Feed one timing callback.
    ///
    /// Emits nothing for non-video lessons and nothing while the report
    /// window is still open; the sample is retained either way.
    pub fn sample(&mut self, sample: PositionSample, now: DateTime<Utc>) -> Option<ProgressReport> {
        let window = self.window;
        let focus = self.focus.as_mut()?;
        if !focus.kind.tracks_playback() {
            return None;
        }
        focus.pending = Some((sample, now));

        let due = match focus.last_emitted_at {
            None => true,
            Some(at) => now.signed_duration_since(at) >= window,
        };
        if !due {
            return None;
        }
        self.emit_pending(now)
    }

    /// Emit the held sample immediately (lesson change, session exit, or
    /// explicit completion).
    pub fn flush(&mut self, now: DateTime<Utc>) -> Option<ProgressReport> {
        self.emit_pending(now)
    }

    /// Drop focus and any held sample without emitting (session teardown
    /// where no final report is wanted).
    pub fn clear(&mut self) {
        self.focus = None;
    }

    fn emit_pending(&mut self, now: DateTime<Utc>) -> Option<ProgressReport> {
        let focus = self.focus.as_mut()?;
        let (sample, sampled_at) = focus.pending.take()?;
        focus.last_emitted_at = Some(now);
        self.sequence += 1;
        Some(ProgressReport {
            course_id: focus.course_id,
            lesson_id: focus.lesson_id,
            watched_seconds: sample.played_seconds,
            last_position_seconds: sample.played_seconds,
            sequence: self.sequence,
            sampled_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::time::fixed_now;

    fn sample(seconds: f64) -> PositionSample {
        PositionSample {
            played_seconds: seconds,
            played_fraction: seconds / 600.0,
        }
    }

    fn video_tracker() -> (PositionTracker, CourseId, LessonId) {
        let mut tracker = PositionTracker::new();
        let course_id = CourseId::generate();
        let lesson_id = LessonId::generate();
        tracker.focus(course_id, lesson_id, LessonKind::Video, fixed_now());
        (tracker, course_id, lesson_id)
    }

    #[test]
    fn non_video_lessons_emit_nothing() {
        let mut tracker = PositionTracker::new();
        tracker.focus(
            CourseId::generate(),
            LessonId::generate(),
            LessonKind::Text,
            fixed_now(),
        );
        assert!(tracker.sample(sample(10.0), fixed_now()).is_none());
        assert!(tracker.flush(fixed_now()).is_none());
    }

    #[test]
    fn first_sample_emits_then_window_throttles() {
        let (mut tracker, _, _) = video_tracker();
        let t0 = fixed_now();

        let first = tracker.sample(sample(5.0), t0).unwrap();
        assert_eq!(first.watched_seconds, 5.0);

        // inside the window: held, not emitted
        assert!(tracker
            .sample(sample(10.0), t0 + Duration::seconds(5))
            .is_none());

        // window elapsed: the latest held sample goes out
        let third = tracker
            .sample(sample(20.0), t0 + Duration::seconds(16))
            .unwrap();
        assert_eq!(third.watched_seconds, 20.0);
    }

    #[test]
    fn flush_emits_the_held_sample() {
        let (mut tracker, _, _) = video_tracker();
        let t0 = fixed_now();

        tracker.sample(sample(5.0), t0);
        tracker.sample(sample(12.0), t0 + Duration::seconds(3));

        let flushed = tracker.flush(t0 + Duration::seconds(4)).unwrap();
        assert_eq!(flushed.watched_seconds, 12.0);
        // nothing left to flush
        assert!(tracker.flush(t0 + Duration::seconds(5)).is_none());
    }

    #[test]
    fn backward_seek_still_forwards() {
        let (mut tracker, _, _) = video_tracker();
        let t0 = fixed_now();

        tracker.sample(sample(120.0), t0);
        tracker.sample(sample(30.0), t0 + Duration::seconds(2));

        let flushed = tracker.flush(t0 + Duration::seconds(3)).unwrap();
        assert_eq!(flushed.watched_seconds, 30.0);
    }

    #[test]
    fn refocus_flushes_tagged_with_previous_lesson() {
        let (mut tracker, _, first_lesson) = video_tracker();
        let t0 = fixed_now();

        tracker.sample(sample(5.0), t0);
        tracker.sample(sample(9.0), t0 + Duration::seconds(2));

        let next_lesson = LessonId::generate();
        let final_report = tracker
            .focus(
                CourseId::generate(),
                next_lesson,
                LessonKind::Video,
                t0 + Duration::seconds(3),
            )
            .unwrap();
        assert_eq!(final_report.lesson_id, first_lesson);
        assert_eq!(final_report.watched_seconds, 9.0);

        // fresh lesson, fresh window
        let report = tracker
            .sample(sample(1.0), t0 + Duration::seconds(4))
            .unwrap();
        assert_eq!(report.lesson_id, next_lesson);
    }

    #[test]
    fn sequence_numbers_are_strictly_increasing() {
        let (mut tracker, _, _) = video_tracker();
        let t0 = fixed_now();

        let a = tracker.sample(sample(1.0), t0).unwrap();
        let b = tracker
            .sample(sample(2.0), t0 + Duration::seconds(20))
            .unwrap();
        tracker.sample(sample(3.0), t0 + Duration::seconds(21));
        let c = tracker.flush(t0 + Duration::seconds(22)).unwrap();

        assert!(a.sequence < b.sequence);
        assert!(b.sequence < c.sequence);
    }

    #[test]
    fn clear_discards_the_held_sample() {
        let (mut tracker, _, _) = video_tracker();
        tracker.sample(sample(5.0), fixed_now());
        tracker.sample(sample(8.0), fixed_now() + Duration::seconds(1));
        tracker.clear();
        assert!(tracker.flush(fixed_now() + Duration::seconds(2)).is_none());
        assert_eq!(tracker.focused_lesson(), None);
    }
}
