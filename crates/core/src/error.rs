use thiserror::Error;

use crate::model::{CourseError, NoteError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Note(#[from] NoteError),
}
