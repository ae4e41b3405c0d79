#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod auth;
pub mod cart;
pub mod error;
pub mod notes;
pub mod optimistic;
pub mod position_tracker;
pub mod progress_store;
pub mod quiz;
pub mod session;
pub mod sync_client;

pub use course_core::Clock;

pub use api::{
    CartApi, CourseContentApi, CourseSnapshot, GeneratedQuiz, InMemoryApi, NotesApi, ProgressApi,
    ProgressFact, ProgressReport, QuizAnswer, QuizApi, QuizOutcome, QuizQuestion,
};
pub use app_services::AppServices;
pub use auth::{AuthProvider, Credential, StaticAuthProvider};
pub use cart::CartService;
pub use error::{CartServiceError, NoteServiceError, SessionError, SyncError};
pub use notes::NotesService;
pub use optimistic::OptimisticCollection;
pub use position_tracker::{PositionSample, PositionTracker, REPORT_WINDOW_SECS};
pub use progress_store::ProgressStore;
pub use quiz::QuizService;
pub use session::{CompletionOutcome, LearningSession, SessionPhase};
pub use sync_client::{HttpSyncClient, SyncConfig, DEFAULT_TIMEOUT_SECS};
