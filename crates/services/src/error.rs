//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::NoteError;

/// Tagged outcome of every collaborator call.
///
/// The sync client never lets a raw transport error cross its boundary; each
/// failure is folded into exactly one of these variants and callers decide
/// how to react.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyncError {
    /// No usable credential. Routed to sign-in, never retried.
    #[error("not signed in")]
    Unauthenticated,

    /// Timeout, connection failure, or 5xx. Retryable by explicit user action.
    #[error("service unavailable: {0}")]
    Transient(String),

    /// Non-auth 4xx; the server message is shown verbatim.
    #[error("{0}")]
    Rejected(String),

    /// Referenced entity is missing. Success-equivalent for deletes.
    #[error("not found")]
    NotFound,

    /// Caught client-side before any network call.
    #[error("{0}")]
    Validation(String),
}

/// Errors emitted by `LearningSession`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session is not ready")]
    NotReady,
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Errors emitted by `NotesService`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NoteServiceError {
    #[error("no lesson loaded")]
    NotLoaded,
    #[error("note is not in the loaded collection")]
    UnknownNote,
    #[error(transparent)]
    Note(#[from] NoteError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Errors emitted by `CartService`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CartServiceError {
    #[error(transparent)]
    Sync(#[from] SyncError),
}
