use std::sync::Arc;

use course_core::model::CourseId;
use course_core::Clock;

use crate::api::{CartApi, CourseContentApi, NotesApi, ProgressApi, QuizApi};
use crate::auth::AuthProvider;
use crate::cart::CartService;
use crate::notes::NotesService;
use crate::quiz::QuizService;
use crate::session::LearningSession;
use crate::sync_client::{HttpSyncClient, SyncConfig};

/// Assembles the engine's services around one set of collaborator handles.
///
/// Presentation components receive per-course sessions and services from
/// here instead of sharing a global singleton.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    content: Arc<dyn CourseContentApi>,
    progress: Arc<dyn ProgressApi>,
    notes: Arc<dyn NotesApi>,
    cart: Arc<dyn CartApi>,
    quiz: Arc<dyn QuizApi>,
}

impl AppServices {
    /// Wire every service over one HTTP sync client.
    #[must_use]
    pub fn new_http(config: SyncConfig, auth: Arc<dyn AuthProvider>, clock: Clock) -> Self {
        let client = Arc::new(HttpSyncClient::new(config, auth));
        Self {
            clock,
            content: client.clone(),
            progress: client.clone(),
            notes: client.clone(),
            cart: client.clone(),
            quiz: client,
        }
    }

    /// Wire services over explicit collaborator handles (tests, fakes).
    #[must_use]
    pub fn new_with(
        clock: Clock,
        content: Arc<dyn CourseContentApi>,
        progress: Arc<dyn ProgressApi>,
        notes: Arc<dyn NotesApi>,
        cart: Arc<dyn CartApi>,
        quiz: Arc<dyn QuizApi>,
    ) -> Self {
        Self {
            clock,
            content,
            progress,
            notes,
            cart,
            quiz,
        }
    }

    /// One owned session per course-viewing session.
    #[must_use]
    pub fn open_session(&self, course_id: CourseId) -> LearningSession {
        LearningSession::new(
            course_id,
            self.clock,
            Arc::clone(&self.content),
            Arc::clone(&self.progress),
        )
    }

    #[must_use]
    pub fn notes_service(&self, course_id: CourseId) -> NotesService {
        NotesService::new(Arc::clone(&self.notes), self.clock, course_id)
    }

    #[must_use]
    pub fn cart_service(&self) -> CartService {
        CartService::new(Arc::clone(&self.cart))
    }

    #[must_use]
    pub fn quiz_service(&self) -> QuizService {
        QuizService::new(Arc::clone(&self.quiz))
    }
}
