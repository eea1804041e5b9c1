//! Port abstraction for per-user recipe marks (favorites and shopping cart).
//!
//! Favorites and the shopping cart share one contract: a (user, recipe)
//! pair guarded by a storage-layer uniqueness constraint. The constraint is
//! the race-safety mechanism; concurrent duplicate inserts surface as
//! [`RecipeMarkError::AlreadyMarked`] instead of corrupting state.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mark repository adapters.
    pub enum RecipeMarkError {
        /// Repository connection could not be established.
        Connection { message: String } => "mark repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "mark repository query failed: {message}",
        /// The (user, recipe) pair already exists.
        AlreadyMarked => "recipe is already marked for this user",
    }
}

#[async_trait]
pub trait RecipeMarkRepository: Send + Sync {
    /// Insert the (user, recipe) pair; duplicates fail with `AlreadyMarked`.
    async fn add(&self, user_id: UserId, recipe_id: i32) -> Result<(), RecipeMarkError>;

    /// Delete the pair; `false` when it was not present.
    async fn remove(&self, user_id: UserId, recipe_id: i32) -> Result<bool, RecipeMarkError>;

    /// Whether the pair exists.
    async fn contains(&self, user_id: UserId, recipe_id: i32) -> Result<bool, RecipeMarkError>;

    /// Subset of `recipe_ids` marked by this user.
    async fn marked_ids(
        &self,
        user_id: UserId,
        recipe_ids: &[i32],
    ) -> Result<Vec<i32>, RecipeMarkError>;
}

/// In-memory `RecipeMarkRepository` used by handler tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryRecipeMarkRepository {
    marks: Mutex<HashSet<(UserId, i32)>>,
}

impl InMemoryRecipeMarkRepository {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<(UserId, i32)>> {
        self.marks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Synchronous membership check for sibling fixtures.
    pub(crate) fn contains_sync(&self, user_id: UserId, recipe_id: i32) -> bool {
        self.lock().contains(&(user_id, recipe_id))
    }
}

#[async_trait]
impl RecipeMarkRepository for InMemoryRecipeMarkRepository {
    async fn add(&self, user_id: UserId, recipe_id: i32) -> Result<(), RecipeMarkError> {
        if !self.lock().insert((user_id, recipe_id)) {
            return Err(RecipeMarkError::already_marked());
        }
        Ok(())
    }

    async fn remove(&self, user_id: UserId, recipe_id: i32) -> Result<bool, RecipeMarkError> {
        Ok(self.lock().remove(&(user_id, recipe_id)))
    }

    async fn contains(&self, user_id: UserId, recipe_id: i32) -> Result<bool, RecipeMarkError> {
        Ok(self.contains_sync(user_id, recipe_id))
    }

    async fn marked_ids(
        &self,
        user_id: UserId,
        recipe_ids: &[i32],
    ) -> Result<Vec<i32>, RecipeMarkError> {
        let marks = self.lock();
        Ok(recipe_ids
            .iter()
            .copied()
            .filter(|recipe_id| marks.contains(&(user_id, *recipe_id)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn duplicate_add_fails_cleanly() {
        let repo = InMemoryRecipeMarkRepository::default();
        let user = UserId::random();
        repo.add(user, 1).await.expect("first add");
        assert_eq!(repo.add(user, 1).await, Err(RecipeMarkError::already_marked()));
    }

    #[rstest]
    #[tokio::test]
    async fn remove_reports_absence() {
        let repo = InMemoryRecipeMarkRepository::default();
        let user = UserId::random();
        assert!(!repo.remove(user, 1).await.expect("remove"));
        repo.add(user, 1).await.expect("add");
        assert!(repo.remove(user, 1).await.expect("remove"));
        assert!(!repo.contains(user, 1).await.expect("contains"));
    }

    #[rstest]
    #[tokio::test]
    async fn marked_ids_filters_candidates() {
        let repo = InMemoryRecipeMarkRepository::default();
        let user = UserId::random();
        repo.add(user, 1).await.expect("add");
        repo.add(user, 3).await.expect("add");
        let marked = repo.marked_ids(user, &[1, 2, 3]).await.expect("query");
        assert_eq!(marked, vec![1, 3]);
    }
}
