use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-lesson, per-learner completion and playback-position fact.
///
/// `completed` only ever moves `false -> true` from the client's point of
/// view; the sole exception is a fresh course snapshot reflecting server
/// truth (and the controller's rollback of its own optimistic flip).
///
/// `watched_seconds` holds the *most recent* playback position, not the
/// furthest position ever reached. Both playback fields are meaningful only
/// for video lessons.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    watched_seconds: f64,
    #[serde(default)]
    last_position_seconds: f64,
}

impl ProgressRecord {
    /// Rehydrate a record from server data.
    #[must_use]
    pub fn from_parts(
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
        watched_seconds: f64,
        last_position_seconds: f64,
    ) -> Self {
        Self {
            completed,
            completed_at,
            watched_seconds,
            last_position_seconds,
        }
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn watched_seconds(&self) -> f64 {
        self.watched_seconds
    }

    #[must_use]
    pub fn last_position_seconds(&self) -> f64 {
        self.last_position_seconds
    }

    /// Mark the lesson completed at `now`.
    ///
    /// Idempotent: returns `false` (and changes nothing, including the
    /// original completion time) when the lesson was already complete.
    pub fn mark_completed(&mut self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(now);
        true
    }

    /// Undo an optimistic completion flip.
    ///
    /// Only the session controller calls this, and only to roll back a
    /// completion the server did not confirm.
    pub fn clear_completed(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }

    /// Record the latest observed playback position (last-observed-wins).
    pub fn record_position(&mut self, watched_seconds: f64, last_position_seconds: f64) {
        self.watched_seconds = watched_seconds;
        self.last_position_seconds = last_position_seconds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn mark_completed_is_idempotent() {
        let now = fixed_now();
        let mut record = ProgressRecord::default();

        assert!(record.mark_completed(now));
        assert_eq!(record.completed_at(), Some(now));

        let later = now + chrono::Duration::minutes(5);
        assert!(!record.mark_completed(later));
        assert_eq!(record.completed_at(), Some(now));
    }

    #[test]
    fn clear_completed_resets_both_fields() {
        let mut record = ProgressRecord::default();
        record.mark_completed(fixed_now());
        record.clear_completed();
        assert!(!record.completed());
        assert_eq!(record.completed_at(), None);
    }

    #[test]
    fn record_position_overwrites_backwards() {
        let mut record = ProgressRecord::default();
        record.record_position(120.0, 120.0);
        record.record_position(30.0, 30.0);
        assert_eq!(record.watched_seconds(), 30.0);
        assert_eq!(record.last_position_seconds(), 30.0);
    }
}
