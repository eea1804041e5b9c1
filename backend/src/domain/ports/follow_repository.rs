//! Port abstraction for author subscriptions (follow edges).

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::user::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by follow repository adapters.
    pub enum FollowPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "follow repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "follow repository query failed: {message}",
        /// The (follower, followed) pair already exists.
        AlreadyFollowing => "subscription already exists",
    }
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Insert a follow edge; duplicates fail with `AlreadyFollowing`.
    ///
    /// Self-follow rejection happens in the inbound adapter before this
    /// call; the storage schema additionally guards it with a check
    /// constraint.
    async fn create(
        &self,
        follower: UserId,
        followed: UserId,
    ) -> Result<(), FollowPersistenceError>;

    /// Delete the edge; `false` when it was not present.
    async fn delete(
        &self,
        follower: UserId,
        followed: UserId,
    ) -> Result<bool, FollowPersistenceError>;

    /// Whether the edge exists.
    async fn exists(
        &self,
        follower: UserId,
        followed: UserId,
    ) -> Result<bool, FollowPersistenceError>;

    /// One page of followed authors ordered by username, plus the total count.
    async fn followed_authors(
        &self,
        follower: UserId,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<User>, u64), FollowPersistenceError>;

    /// Subset of `candidates` the follower subscribes to.
    async fn followed_ids(
        &self,
        follower: UserId,
        candidates: &[UserId],
    ) -> Result<Vec<UserId>, FollowPersistenceError>;
}

#[derive(Debug, Default)]
struct InMemoryFollowState {
    edges: HashSet<(UserId, UserId)>,
    users: Vec<User>,
}

/// In-memory `FollowRepository` used by handler tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryFollowRepository {
    state: Mutex<InMemoryFollowState>,
}

impl InMemoryFollowRepository {
    /// Pre-populate the user directory used to resolve followed authors.
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            state: Mutex::new(InMemoryFollowState {
                edges: HashSet::new(),
                users,
            }),
        }
    }

    /// Add a user to the directory after construction.
    pub fn add_user(&self, user: User) {
        self.lock().users.push(user);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryFollowState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl FollowRepository for InMemoryFollowRepository {
    async fn create(
        &self,
        follower: UserId,
        followed: UserId,
    ) -> Result<(), FollowPersistenceError> {
        if !self.lock().edges.insert((follower, followed)) {
            return Err(FollowPersistenceError::already_following());
        }
        Ok(())
    }

    async fn delete(
        &self,
        follower: UserId,
        followed: UserId,
    ) -> Result<bool, FollowPersistenceError> {
        Ok(self.lock().edges.remove(&(follower, followed)))
    }

    async fn exists(
        &self,
        follower: UserId,
        followed: UserId,
    ) -> Result<bool, FollowPersistenceError> {
        Ok(self.lock().edges.contains(&(follower, followed)))
    }

    async fn followed_authors(
        &self,
        follower: UserId,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<User>, u64), FollowPersistenceError> {
        let state = self.lock();
        let mut authors: Vec<User> = state
            .users
            .iter()
            .filter(|user| state.edges.contains(&(follower, user.id)))
            .cloned()
            .collect();
        authors.sort_by(|a, b| a.username.as_ref().cmp(b.username.as_ref()));
        let count = authors.len() as u64;
        let page = authors
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect();
        Ok((page, count))
    }

    async fn followed_ids(
        &self,
        follower: UserId,
        candidates: &[UserId],
    ) -> Result<Vec<UserId>, FollowPersistenceError> {
        let state = self.lock();
        Ok(candidates
            .iter()
            .copied()
            .filter(|candidate| state.edges.contains(&(follower, *candidate)))
            .collect())
    }
}
