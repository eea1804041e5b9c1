//! Port abstraction for user persistence adapters and their errors.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::user::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this email address.
        DuplicateEmail => "a user with this email already exists",
        /// Another account already uses this username.
        DuplicateUsername => "a user with this username already exists",
    }
}

/// Insert payload for a new user account.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub user: User,
    /// Hex digest of the salted password.
    pub password_digest: String,
    /// Per-user random salt.
    pub password_salt: String,
}

/// Credential material looked up during login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user_id: UserId,
    pub password_digest: String,
    pub password_salt: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; unique-constraint conflicts surface as duplicates.
    async fn create(&self, record: &NewUserRecord) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch login credentials by email address.
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// One page of users ordered by id, plus the total count.
    async fn list(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<User>, u64), UserPersistenceError>;
}

#[derive(Debug, Default)]
struct InMemoryUserState {
    users: Vec<User>,
    credentials: Vec<StoredCredentials>,
}

/// In-memory `UserRepository` used by handler tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: Mutex<InMemoryUserState>,
}

impl InMemoryUserRepository {
    /// Pre-populate the repository with existing users (no credentials).
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            state: Mutex::new(InMemoryUserState {
                users,
                credentials: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryUserState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, record: &NewUserRecord) -> Result<(), UserPersistenceError> {
        let mut state = self.lock();
        if state
            .users
            .iter()
            .any(|user| user.email == record.user.email)
        {
            return Err(UserPersistenceError::duplicate_email());
        }
        if state
            .users
            .iter()
            .any(|user| user.username == record.user.username)
        {
            return Err(UserPersistenceError::duplicate_username());
        }
        state.users.push(record.user.clone());
        state.credentials.push(StoredCredentials {
            user_id: record.user.id,
            password_digest: record.password_digest.clone(),
            password_salt: record.password_salt.clone(),
        });
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let state = self.lock();
        let Some(user) = state
            .users
            .iter()
            .find(|user| user.email.as_ref() == email)
        else {
            return Ok(None);
        };
        Ok(state
            .credentials
            .iter()
            .find(|credentials| credentials.user_id == user.id)
            .cloned())
    }

    async fn list(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<User>, u64), UserPersistenceError> {
        let state = self.lock();
        let count = state.users.len() as u64;
        let page = state
            .users
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect();
        Ok((page, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{Email, Username};
    use rstest::rstest;

    fn user(email: &str, username: &str) -> User {
        User {
            id: UserId::random(),
            email: Email::new(email).expect("valid email"),
            username: Username::new(username).expect("valid username"),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        }
    }

    fn record(email: &str, username: &str) -> NewUserRecord {
        NewUserRecord {
            user: user(email, username),
            password_digest: "digest".into(),
            password_salt: "salt".into(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let repo = InMemoryUserRepository::default();
        repo.create(&record("ada@example.com", "ada"))
            .await
            .expect("first insert");
        let result = repo.create(&record("ada@example.com", "countess")).await;
        assert_eq!(result, Err(UserPersistenceError::duplicate_email()));
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_duplicate_username() {
        let repo = InMemoryUserRepository::default();
        repo.create(&record("ada@example.com", "ada"))
            .await
            .expect("first insert");
        let result = repo.create(&record("other@example.com", "ada")).await;
        assert_eq!(result, Err(UserPersistenceError::duplicate_username()));
    }

    #[rstest]
    #[tokio::test]
    async fn credentials_are_found_by_email() {
        let repo = InMemoryUserRepository::default();
        let record = record("ada@example.com", "ada");
        repo.create(&record).await.expect("insert");

        let credentials = repo
            .find_credentials_by_email("ada@example.com")
            .await
            .expect("query")
            .expect("present");
        assert_eq!(credentials.user_id, record.user.id);
        assert_eq!(credentials.password_digest, "digest");
    }

    #[rstest]
    #[tokio::test]
    async fn list_pages_and_counts() {
        let repo = InMemoryUserRepository::default();
        for n in 0..5 {
            repo.create(&record(&format!("u{n}@example.com"), &format!("user{n}")))
                .await
                .expect("insert");
        }
        let (page, count) = repo.list(2, 2).await.expect("query");
        assert_eq!(count, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].username.as_ref(), "user2");
    }
}
