//! Lesson note CRUD over the apply-then-reconcile coordinator.

use std::sync::Arc;

use course_core::model::{CourseId, LessonId, Note, NoteDraft, NoteId};
use course_core::Clock;

use crate::api::NotesApi;
use crate::error::{NoteServiceError, SyncError};
use crate::optimistic::OptimisticCollection;

/// Notes for the currently focused (course, lesson) pair.
///
/// Every mutation is applied locally first; on a failed network call the
/// collection is re-fetched from the server and exactly one error is
/// surfaced.
pub struct NotesService {
    api: Arc<dyn NotesApi>,
    clock: Clock,
    course_id: CourseId,
    lesson_id: Option<LessonId>,
    notes: OptimisticCollection<Note>,
}

impl NotesService {
    #[must_use]
    pub fn new(api: Arc<dyn NotesApi>, clock: Clock, course_id: CourseId) -> Self {
        Self {
            api,
            clock,
            course_id,
            lesson_id: None,
            notes: OptimisticCollection::new(),
        }
    }

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        self.notes.items()
    }

    /// Load the authoritative note list for one lesson.
    ///
    /// # Errors
    ///
    /// Returns the sync failure; the previous collection is kept on error.
    pub async fn load(&mut self, lesson_id: LessonId) -> Result<(), NoteServiceError> {
        let notes = self.api.list_notes(self.course_id, lesson_id).await?;
        self.lesson_id = Some(lesson_id);
        self.notes.replace_all(notes);
        Ok(())
    }

    /// Create a note from a draft.
    ///
    /// The draft is validated before any network call; the note is inserted
    /// optimistically with a client-minted id.
    ///
    /// # Errors
    ///
    /// Returns validation failures without touching the network, or the
    /// sync failure after reconciling the collection.
    pub async fn create(&mut self, draft: NoteDraft) -> Result<NoteId, NoteServiceError> {
        let lesson_id = self.lesson_id.ok_or(NoteServiceError::NotLoaded)?;
        let note = draft.into_note(
            NoteId::generate(),
            self.course_id,
            lesson_id,
            self.clock.now(),
        )?;
        let note_id = note.id();

        self.notes.insert(note.clone());
        if let Err(err) = self.api.create_note(&note).await {
            self.reconcile().await;
            return Err(err.into());
        }
        Ok(note_id)
    }

    /// Replace a note's content.
    ///
    /// # Errors
    ///
    /// Returns `UnknownNote` when the note is not in the loaded collection,
    /// validation failures before any network call, or the sync failure
    /// after reconciling.
    pub async fn update(
        &mut self,
        note_id: NoteId,
        draft: NoteDraft,
    ) -> Result<(), NoteServiceError> {
        let mut updated = self
            .notes
            .find(|n| n.id() == note_id)
            .cloned()
            .ok_or(NoteServiceError::UnknownNote)?;
        updated.edit(draft, self.clock.now())?;

        self.notes.update_where(|n| n.id() == note_id, updated.clone());
        if let Err(err) = self.api.update_note(&updated).await {
            self.reconcile().await;
            return Err(err.into());
        }
        Ok(())
    }

    /// Delete a note.
    ///
    /// A server `NotFound` is success-equivalent: the note stays removed
    /// locally and nothing is restored.
    ///
    /// # Errors
    ///
    /// Returns the sync failure after reconciling the collection.
    pub async fn delete(&mut self, note_id: NoteId) -> Result<(), NoteServiceError> {
        if self.notes.remove_where(|n| n.id() == note_id).is_none() {
            return Err(NoteServiceError::UnknownNote);
        }
        match self.api.delete_note(note_id).await {
            Ok(()) | Err(SyncError::NotFound) => Ok(()),
            Err(err) => {
                self.reconcile().await;
                Err(err.into())
            }
        }
    }

    /// Discard optimistic state by re-fetching the authoritative list.
    ///
    /// Best-effort: when the re-fetch itself fails the local copy stays,
    /// since the original error is already being surfaced.
    async fn reconcile(&mut self) {
        let Some(lesson_id) = self.lesson_id else {
            return;
        };
        if let Ok(notes) = self.api.list_notes(self.course_id, lesson_id).await {
            self.notes.replace_all(notes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::time::{fixed_clock, fixed_now};

    use crate::api::InMemoryApi;

    fn service(api: &InMemoryApi, course_id: CourseId) -> NotesService {
        NotesService::new(Arc::new(api.clone()), fixed_clock(), course_id)
    }

    fn seeded_note(course_id: CourseId, lesson_id: LessonId, content: &str) -> Note {
        NoteDraft::new(content)
            .into_note(NoteId::generate(), course_id, lesson_id, fixed_now())
            .unwrap()
    }

    #[tokio::test]
    async fn create_round_trips_to_the_server() {
        let api = InMemoryApi::new();
        let course_id = CourseId::generate();
        let lesson_id = LessonId::generate();
        let mut notes = service(&api, course_id);

        notes.load(lesson_id).await.unwrap();
        let id = notes.create(NoteDraft::new("remember")).await.unwrap();

        assert_eq!(notes.notes().len(), 1);
        assert_eq!(api.server_notes()[0].id(), id);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_network() {
        let api = InMemoryApi::new();
        let course_id = CourseId::generate();
        let lesson_id = LessonId::generate();
        let mut notes = service(&api, course_id);
        notes.load(lesson_id).await.unwrap();
        let calls_before = api.calls().len();

        let err = notes.create(NoteDraft::new("   ")).await.unwrap_err();

        assert!(matches!(err, NoteServiceError::Note(_)));
        assert_eq!(api.calls().len(), calls_before);
        assert!(notes.notes().is_empty());
    }

    #[tokio::test]
    async fn failed_create_reconciles_to_server_truth() {
        let api = InMemoryApi::new();
        let course_id = CourseId::generate();
        let lesson_id = LessonId::generate();
        api.seed_notes(vec![seeded_note(course_id, lesson_id, "existing")]);

        let mut notes = service(&api, course_id);
        notes.load(lesson_id).await.unwrap();

        api.fail_next(SyncError::Transient("down".into()));
        let err = notes.create(NoteDraft::new("new one")).await.unwrap_err();

        assert!(matches!(err, NoteServiceError::Sync(SyncError::Transient(_))));
        // optimistic insert rolled back by re-fetch
        assert_eq!(notes.notes().len(), 1);
        assert_eq!(notes.notes()[0].content(), "existing");
    }

    #[tokio::test]
    async fn delete_not_found_keeps_the_removal() {
        let api = InMemoryApi::new();
        let course_id = CourseId::generate();
        let lesson_id = LessonId::generate();
        let note = seeded_note(course_id, lesson_id, "stale");
        let note_id = note.id();

        let mut notes = service(&api, course_id);
        // loaded copy contains the note, but the server already lost it
        api.seed_notes(vec![note]);
        notes.load(lesson_id).await.unwrap();
        api.seed_notes(Vec::new());

        notes.delete(note_id).await.unwrap();
        assert!(notes.notes().is_empty());
    }

    #[tokio::test]
    async fn failed_update_restores_server_content() {
        let api = InMemoryApi::new();
        let course_id = CourseId::generate();
        let lesson_id = LessonId::generate();
        let note = seeded_note(course_id, lesson_id, "original");
        let note_id = note.id();
        api.seed_notes(vec![note]);

        let mut notes = service(&api, course_id);
        notes.load(lesson_id).await.unwrap();

        api.fail_next(SyncError::Rejected("no".into()));
        let err = notes
            .update(note_id, NoteDraft::new("revised"))
            .await
            .unwrap_err();

        assert!(matches!(err, NoteServiceError::Sync(SyncError::Rejected(_))));
        assert_eq!(notes.notes()[0].content(), "original");
    }
}
