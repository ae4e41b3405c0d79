mod cart;
mod course;
mod ids;
mod note;
mod pointer;
mod progress;

pub use ids::{CartItemId, CourseId, LessonId, ModuleId, NoteId, ParseIdError};

pub use cart::CartItem;
pub use course::{Course, CourseError, Lesson, LessonKind, Module};
pub use note::{Note, NoteDraft, NoteError, MAX_NOTE_CHARS};
pub use pointer::SessionPointer;
pub use progress::ProgressRecord;
