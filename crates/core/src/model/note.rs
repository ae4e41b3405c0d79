use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CourseId, LessonId, NoteId};

/// Upper bound on note length, matching the server-side column limit.
pub const MAX_NOTE_CHARS: usize = 10_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NoteError {
    #[error("note cannot be empty")]
    Empty,

    #[error("note exceeds {MAX_NOTE_CHARS} characters: {len}")]
    TooLong { len: usize },
}

/// Unvalidated note content as typed by the learner.
///
/// Validation happens here, before any network call; an invalid draft never
/// produces a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    content: String,
}

impl NoteDraft {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Validate and trim the draft content.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::Empty` for whitespace-only content and
    /// `NoteError::TooLong` past `MAX_NOTE_CHARS`.
    pub fn validate(self) -> Result<String, NoteError> {
        let content = self.content.trim().to_owned();
        if content.is_empty() {
            return Err(NoteError::Empty);
        }
        let len = content.chars().count();
        if len > MAX_NOTE_CHARS {
            return Err(NoteError::TooLong { len });
        }
        Ok(content)
    }

    /// Build a validated note owned by the given (course, lesson) pair.
    ///
    /// # Errors
    ///
    /// Propagates content validation failures.
    pub fn into_note(
        self,
        id: NoteId,
        course_id: CourseId,
        lesson_id: LessonId,
        now: DateTime<Utc>,
    ) -> Result<Note, NoteError> {
        let content = self.validate()?;
        Ok(Note {
            id,
            course_id,
            lesson_id,
            content,
            created_at: now,
            updated_at: now,
        })
    }
}

/// A learner note attached to one lesson. Many notes per lesson are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    id: NoteId,
    course_id: CourseId,
    lesson_id: LessonId,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Note {
    #[must_use]
    pub fn id(&self) -> NoteId {
        self.id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the note content with a validated draft.
    ///
    /// # Errors
    ///
    /// Propagates content validation failures; the note is untouched on error.
    pub fn edit(&mut self, draft: NoteDraft, now: DateTime<Utc>) -> Result<(), NoteError> {
        let content = draft.validate()?;
        self.content = content;
        self.updated_at = now;
        Ok(())
    }
}
