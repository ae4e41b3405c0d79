use serde::{Deserialize, Serialize};

/// The (module, lesson) coordinate currently presented to the learner.
///
/// A pointer is only meaningful against a concrete `Course`; callers check
/// `Course::resolves` before adopting one. Transitions that would produce an
/// out-of-range coordinate are rejected as no-ops by the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPointer {
    module_index: usize,
    lesson_index: usize,
}

impl SessionPointer {
    #[must_use]
    pub fn new(module_index: usize, lesson_index: usize) -> Self {
        Self {
            module_index,
            lesson_index,
        }
    }

    #[must_use]
    pub fn module_index(&self) -> usize {
        self.module_index
    }

    #[must_use]
    pub fn lesson_index(&self) -> usize {
        self.lesson_index
    }
}
