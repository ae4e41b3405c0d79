//! Single-round-trip HTTP submission for progress reports, completion
//! markers, and entity mutations.
//!
//! Each call obtains a credential from the `AuthProvider`, runs one bounded
//! request, and folds the outcome into the `SyncError` taxonomy. The client
//! never mutates the progress store; callers decide how to react.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use course_core::model::{CartItem, CartItemId, CourseId, LessonId, Note, NoteId};

use crate::api::{
    CartApi, CourseContentApi, CourseSnapshot, GeneratedQuiz, NotesApi, ProgressApi,
    ProgressReport, QuizAnswer, QuizApi, QuizOutcome,
};
use crate::auth::AuthProvider;
use crate::error::SyncError;

/// Upper bound on any single network call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl SyncConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("COURSE_API_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let timeout = env::var("COURSE_API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);
        Some(Self { base_url, timeout })
    }
}

/// HTTP implementation of every collaborator contract.
#[derive(Clone)]
pub struct HttpSyncClient {
    client: Client,
    config: SyncConfig,
    auth: Arc<dyn AuthProvider>,
}

impl HttpSyncClient {
    #[must_use]
    pub fn new(config: SyncConfig, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            client: Client::new(),
            config,
            auth,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Authorize, bound, and send one request; classify every failure.
    async fn send(&self, request: RequestBuilder) -> Result<Response, SyncError> {
        let credential = self.auth.credential().await?;
        let response = request
            .bearer_auth(credential.token())
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = error_message(response).await;
        Err(classify_status(status, message))
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, SyncError> {
        response.json().await.map_err(classify_transport)
    }
}

fn classify_transport(error: reqwest::Error) -> SyncError {
    if error.is_timeout() {
        SyncError::Transient("request timed out".to_owned())
    } else {
        SyncError::Transient(error.to_string())
    }
}

fn classify_status(status: StatusCode, message: String) -> SyncError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Unauthenticated,
        StatusCode::NOT_FOUND => SyncError::NotFound,
        s if s.is_server_error() => SyncError::Transient(format!("server error {s}")),
        s if s.is_client_error() => SyncError::Rejected(message),
        s => SyncError::Transient(format!("unexpected status {s}")),
    }
}

/// Pull the human-readable message out of an error body, if there is one.
async fn error_message(response: Response) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    let status = response.status();
    let raw = response.text().await.unwrap_or_default();
    if let Ok(body) = serde_json::from_str::<ErrorBody>(&raw) {
        return body.message;
    }
    if raw.trim().is_empty() {
        format!("request failed with status {status}")
    } else {
        raw
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateQuizRequest {
    course_id: CourseId,
    lesson_id: LessonId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitQuizRequest<'a> {
    course_id: CourseId,
    answers: &'a [QuizAnswer],
}

#[async_trait]
impl CourseContentApi for HttpSyncClient {
    async fn fetch_course_content(
        &self,
        course_id: CourseId,
    ) -> Result<CourseSnapshot, SyncError> {
        let url = self.url(&format!("courses/{course_id}/content"));
        let response = self.send(self.client.get(url)).await?;
        Self::read_json(response).await
    }
}

#[async_trait]
impl ProgressApi for HttpSyncClient {
    async fn post_progress(&self, report: &ProgressReport) -> Result<(), SyncError> {
        let url = self.url("progress");
        self.send(self.client.post(url).json(report)).await?;
        Ok(())
    }

    async fn post_completion(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<(), SyncError> {
        let url = self.url(&format!("courses/{course_id}/lessons/{lesson_id}/complete"));
        self.send(self.client.post(url)).await?;
        Ok(())
    }
}

#[async_trait]
impl NotesApi for HttpSyncClient {
    async fn list_notes(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<Vec<Note>, SyncError> {
        let url = self.url(&format!("courses/{course_id}/lessons/{lesson_id}/notes"));
        let response = self.send(self.client.get(url)).await?;
        Self::read_json(response).await
    }

    async fn create_note(&self, note: &Note) -> Result<(), SyncError> {
        let url = self.url("notes");
        self.send(self.client.post(url).json(note)).await?;
        Ok(())
    }

    async fn update_note(&self, note: &Note) -> Result<(), SyncError> {
        let url = self.url(&format!("notes/{}", note.id()));
        self.send(self.client.put(url).json(note)).await?;
        Ok(())
    }

    async fn delete_note(&self, note_id: NoteId) -> Result<(), SyncError> {
        let url = self.url(&format!("notes/{note_id}"));
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

#[async_trait]
impl CartApi for HttpSyncClient {
    async fn list_cart(&self) -> Result<Vec<CartItem>, SyncError> {
        let url = self.url("cart");
        let response = self.send(self.client.get(url)).await?;
        Self::read_json(response).await
    }

    async fn remove_cart_item(&self, item_id: CartItemId) -> Result<(), SyncError> {
        let url = self.url(&format!("cart/items/{item_id}"));
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

#[async_trait]
impl QuizApi for HttpSyncClient {
    async fn generate(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<GeneratedQuiz, SyncError> {
        let url = self.url("quiz/generate");
        let payload = GenerateQuizRequest {
            course_id,
            lesson_id,
        };
        let response = self.send(self.client.post(url).json(&payload)).await?;
        Self::read_json(response).await
    }

    async fn submit(
        &self,
        quiz_id: &str,
        answers: &[QuizAnswer],
        course_id: CourseId,
    ) -> Result<QuizOutcome, SyncError> {
        let url = self.url(&format!("quiz/{quiz_id}/submit"));
        let payload = SubmitQuizRequest { course_id, answers };
        let response = self.send(self.client.post(url).json(&payload)).await?;
        Self::read_json(response).await
    }
}
