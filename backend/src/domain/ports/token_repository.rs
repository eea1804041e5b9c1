//! Port abstraction for auth-token persistence.
//!
//! Tokens themselves never touch storage; only their digests do. The
//! inbound auth extractor digests the presented key and asks this port who
//! it belongs to.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by token repository adapters.
    pub enum TokenPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "token repository query failed: {message}",
    }
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Store a token digest for the given user.
    async fn insert(&self, user_id: UserId, digest: &str) -> Result<(), TokenPersistenceError>;

    /// Resolve a token digest to its owner, if the token is live.
    async fn find_user_id(&self, digest: &str) -> Result<Option<UserId>, TokenPersistenceError>;

    /// Revoke a token digest; `false` when it was not present.
    async fn delete(&self, digest: &str) -> Result<bool, TokenPersistenceError>;
}

/// In-memory `TokenRepository` used by handler tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryTokenRepository {
    tokens: Mutex<HashMap<String, UserId>>,
}

impl InMemoryTokenRepository {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, UserId>> {
        self.tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn insert(&self, user_id: UserId, digest: &str) -> Result<(), TokenPersistenceError> {
        self.lock().insert(digest.to_owned(), user_id);
        Ok(())
    }

    async fn find_user_id(&self, digest: &str) -> Result<Option<UserId>, TokenPersistenceError> {
        Ok(self.lock().get(digest).copied())
    }

    async fn delete(&self, digest: &str) -> Result<bool, TokenPersistenceError> {
        Ok(self.lock().remove(digest).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn inserted_digests_resolve_to_their_owner() {
        let repo = InMemoryTokenRepository::default();
        let owner = UserId::random();
        repo.insert(owner, "digest-1").await.expect("insert");

        assert_eq!(
            repo.find_user_id("digest-1").await.expect("query"),
            Some(owner)
        );
        assert_eq!(repo.find_user_id("other").await.expect("query"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_reports_whether_the_token_existed() {
        let repo = InMemoryTokenRepository::default();
        repo.insert(UserId::random(), "digest-1")
            .await
            .expect("insert");

        assert!(repo.delete("digest-1").await.expect("delete"));
        assert!(!repo.delete("digest-1").await.expect("repeat delete"));
    }
}
