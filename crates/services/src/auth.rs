use async_trait::async_trait;

use crate::error::SyncError;

/// Opaque bearer credential handed to the sync client per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// External credential source. The sync client asks once per request.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current credential for the signed-in learner.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Unauthenticated` when no credential is available.
    async fn credential(&self) -> Result<Credential, SyncError>;
}

/// Fixed-credential provider for tests and prototyping.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthProvider {
    credential: Option<Credential>,
}

impl StaticAuthProvider {
    #[must_use]
    pub fn signed_in(token: impl Into<String>) -> Self {
        Self {
            credential: Some(Credential::new(token)),
        }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self { credential: None }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn credential(&self) -> Result<Credential, SyncError> {
        self.credential.clone().ok_or(SyncError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signed_out_provider_is_unauthenticated() {
        let provider = StaticAuthProvider::signed_out();
        assert_eq!(
            provider.credential().await.unwrap_err(),
            SyncError::Unauthenticated
        );
    }

    #[tokio::test]
    async fn signed_in_provider_returns_token() {
        let provider = StaticAuthProvider::signed_in("tok-1");
        assert_eq!(provider.credential().await.unwrap().token(), "tok-1");
    }
}
