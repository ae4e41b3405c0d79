use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a Course
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseId(Uuid);

/// Unique identifier for a Module
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(Uuid);

/// Unique identifier for a Lesson
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LessonId(Uuid);

/// Unique identifier for a Note
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(Uuid);

/// Unique identifier for a cart item
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CartItemId(Uuid);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            /// Wraps an existing UUID (server-minted ids).
            #[must_use]
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// Mints a fresh random id (client-created entities).
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the underlying UUID value
            #[must_use]
            pub fn value(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<Uuid>().map($name::new).map_err(|_| ParseIdError {
                    kind: stringify!($name),
                })
            }
        }
    };
}

impl_id!(CourseId);
impl_id!(ModuleId);
impl_id!(LessonId);
impl_id!(NoteId);
impl_id!(CartItemId);

/// Error type for parsing an id from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

// ─── Tests ─────────────────────────────────────────────────────────────────────
