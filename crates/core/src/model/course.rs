use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::{CourseId, LessonId, ModuleId};
use crate::model::pointer::SessionPointer;
use crate::model::progress::ProgressRecord;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyCourseTitle,

    #[error("module title cannot be empty")]
    EmptyModuleTitle,
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// Content category of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonKind {
    Video,
    Text,
    Quiz,
    Article,
    Flashcard,
    Assignment,
}

impl LessonKind {
    /// Playback positions are only tracked for video lessons.
    #[must_use]
    pub fn tracks_playback(&self) -> bool {
        matches!(self, LessonKind::Video)
    }
}

/// Atomic content unit within a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    id: LessonId,
    title: String,
    kind: LessonKind,
    content_ref: Option<Url>,
    duration_seconds: u32,
    #[serde(default)]
    is_preview: bool,
    #[serde(default)]
    progress: ProgressRecord,
}

impl Lesson {
    #[must_use]
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        kind: LessonKind,
        content_ref: Option<Url>,
        duration_seconds: u32,
        is_preview: bool,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            kind,
            content_ref,
            duration_seconds,
            is_preview,
            progress: ProgressRecord::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn kind(&self) -> LessonKind {
        self.kind
    }

    #[must_use]
    pub fn content_ref(&self) -> Option<&Url> {
        self.content_ref.as_ref()
    }

    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.is_preview
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressRecord {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressRecord {
        &mut self.progress
    }
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// Ordered group of lessons within a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    id: ModuleId,
    title: String,
    lessons: Vec<Lesson>,
}

impl Module {
    /// # Errors
    ///
    /// Returns `CourseError::EmptyModuleTitle` if the title is blank.
    pub fn new(
        id: ModuleId,
        title: impl Into<String>,
        lessons: Vec<Lesson>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyModuleTitle);
        }
        Ok(Self { id, title, lessons })
    }

    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A course snapshot: the full module/lesson hierarchy for one course.
///
/// Snapshots are wholesale-replaced on fetch/refresh; individual
/// `ProgressRecord`s are updated in place between refreshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    id: CourseId,
    title: String,
    modules: Vec<Module>,
}

impl Course {
    /// # Errors
    ///
    /// Returns `CourseError::EmptyCourseTitle` if the title is blank.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        modules: Vec<Module>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyCourseTitle);
        }
        Ok(Self { id, title, modules })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Total number of lessons across all modules.
    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// Number of lessons currently marked complete.
    #[must_use]
    pub fn completed_lessons(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .filter(|l| l.progress().completed())
            .count()
    }

    /// True when the pointer refers to a real lesson in this course.
    #[must_use]
    pub fn resolves(&self, pointer: SessionPointer) -> bool {
        self.lesson_at(pointer).is_some()
    }

    #[must_use]
    pub fn lesson_at(&self, pointer: SessionPointer) -> Option<&Lesson> {
        self.modules
            .get(pointer.module_index())?
            .lessons
            .get(pointer.lesson_index())
    }

    pub fn lesson_at_mut(&mut self, pointer: SessionPointer) -> Option<&mut Lesson> {
        self.modules
            .get_mut(pointer.module_index())?
            .lessons
            .get_mut(pointer.lesson_index())
    }

    #[must_use]
    pub fn lesson_by_id(&self, id: LessonId) -> Option<&Lesson> {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .find(|l| l.id() == id)
    }

    pub fn lesson_by_id_mut(&mut self, id: LessonId) -> Option<&mut Lesson> {
        self.modules
            .iter_mut()
            .flat_map(|m| m.lessons.iter_mut())
            .find(|l| l.id() == id)
    }

    /// Coordinate of the first lesson of the first non-empty module.
    #[must_use]
    pub fn first_position(&self) -> Option<SessionPointer> {
        self.modules
            .iter()
            .position(|m| !m.lessons.is_empty())
            .map(|m| SessionPointer::new(m, 0))
    }

    /// Coordinate that follows `pointer` in course order.
    ///
    /// Next lesson in the same module, else the first lesson of the next
    /// non-empty module, else `None` at course end.
    #[must_use]
    pub fn position_after(&self, pointer: SessionPointer) -> Option<SessionPointer> {
        let module = self.modules.get(pointer.module_index())?;
        let next_lesson = pointer.lesson_index() + 1;
        if next_lesson < module.lessons.len() {
            return Some(SessionPointer::new(pointer.module_index(), next_lesson));
        }
        self.modules
            .iter()
            .enumerate()
            .skip(pointer.module_index() + 1)
            .find(|(_, m)| !m.lessons.is_empty())
            .map(|(i, _)| SessionPointer::new(i, 0))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(title: &str) -> Lesson {
        Lesson::new(
            LessonId::generate(),
            title,
            LessonKind::Video,
            None,
            600,
            false,
        )
    }

    fn two_by_two() -> Course {
        let m0 = Module::new(
            ModuleId::generate(),
            "Basics",
            vec![lesson("Intro"), lesson("Setup")],
        )
        .unwrap();
        let m1 = Module::new(
            ModuleId::generate(),
            "Advanced",
            vec![lesson("Deep dive"), lesson("Wrap up")],
        )
        .unwrap();
        Course::new(CourseId::generate(), "Rust 101", vec![m0, m1]).unwrap()
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = Course::new(CourseId::generate(), "  ", Vec::new()).unwrap_err();
        assert_eq!(err, CourseError::EmptyCourseTitle);
    }

    #[test]
    fn counts_lessons_across_modules() {
        let course = two_by_two();
        assert_eq!(course.total_lessons(), 4);
        assert_eq!(course.completed_lessons(), 0);
    }

    #[test]
    fn pointer_resolution_is_guarded() {
        let course = two_by_two();
        assert!(course.resolves(SessionPointer::new(1, 1)));
        assert!(!course.resolves(SessionPointer::new(1, 2)));
        assert!(!course.resolves(SessionPointer::new(2, 0)));
    }

    #[test]
    fn position_after_crosses_module_boundary() {
        let course = two_by_two();
        assert_eq!(
            course.position_after(SessionPointer::new(0, 0)),
            Some(SessionPointer::new(0, 1))
        );
        assert_eq!(
            course.position_after(SessionPointer::new(0, 1)),
            Some(SessionPointer::new(1, 0))
        );
        assert_eq!(course.position_after(SessionPointer::new(1, 1)), None);
    }

    #[test]
    fn position_after_skips_empty_modules() {
        let m0 = Module::new(ModuleId::generate(), "Start", vec![lesson("Only")]).unwrap();
        let m1 = Module::new(ModuleId::generate(), "Empty", Vec::new()).unwrap();
        let m2 = Module::new(ModuleId::generate(), "End", vec![lesson("Last")]).unwrap();
        let course = Course::new(CourseId::generate(), "Gaps", vec![m0, m1, m2]).unwrap();

        assert_eq!(
            course.position_after(SessionPointer::new(0, 0)),
            Some(SessionPointer::new(2, 0))
        );
    }

    #[test]
    fn first_position_skips_empty_leading_module() {
        let m0 = Module::new(ModuleId::generate(), "Empty", Vec::new()).unwrap();
        let m1 = Module::new(ModuleId::generate(), "Real", vec![lesson("First")]).unwrap();
        let course = Course::new(CourseId::generate(), "Offset", vec![m0, m1]).unwrap();

        assert_eq!(course.first_position(), Some(SessionPointer::new(1, 0)));
    }
}
