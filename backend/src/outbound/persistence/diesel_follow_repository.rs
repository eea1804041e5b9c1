//! PostgreSQL-backed `FollowRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{FollowPersistenceError, FollowRepository};
use crate::domain::user::{User, UserId};

use super::diesel_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation_constraint,
};
use super::diesel_user_repository::row_to_user;
use super::models::{NewFollowRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{follows, users};

/// Diesel-backed implementation of the `FollowRepository` port.
#[derive(Clone)]
pub struct DieselFollowRepository {
    pool: DbPool,
}

impl DieselFollowRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FollowPersistenceError {
    map_basic_pool_error(error, FollowPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> FollowPersistenceError {
    map_basic_diesel_error(
        error,
        FollowPersistenceError::query,
        FollowPersistenceError::connection,
    )
}

fn map_insert_error(error: diesel::result::Error) -> FollowPersistenceError {
    if unique_violation_constraint(&error).is_some() {
        return FollowPersistenceError::already_following();
    }
    map_diesel_error(error)
}

fn map_user_error(error: crate::domain::ports::UserPersistenceError) -> FollowPersistenceError {
    FollowPersistenceError::query(error.to_string())
}

#[async_trait]
impl FollowRepository for DieselFollowRepository {
    async fn create(
        &self,
        follower: UserId,
        followed: UserId,
    ) -> Result<(), FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewFollowRow {
            follower_id: *follower.as_uuid(),
            followed_id: *followed.as_uuid(),
        };

        diesel::insert_into(follows::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_insert_error)
    }

    async fn delete(
        &self,
        follower: UserId,
        followed: UserId,
    ) -> Result<bool, FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            follows::table.find((*follower.as_uuid(), *followed.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn exists(
        &self,
        follower: UserId,
        followed: UserId,
    ) -> Result<bool, FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let found: Option<Uuid> = follows::table
            .find((*follower.as_uuid(), *followed.as_uuid()))
            .select(follows::followed_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(found.is_some())
    }

    async fn followed_authors(
        &self,
        follower: UserId,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<User>, u64), FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = follows::table
            .filter(follows::follower_id.eq(follower.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<UserRow> = follows::table
            .inner_join(users::table.on(users::id.eq(follows::followed_id)))
            .filter(follows::follower_id.eq(follower.as_uuid()))
            .order(users::username.asc())
            .offset(offset)
            .limit(limit)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let page = rows
            .into_iter()
            .map(|row| row_to_user(row).map_err(map_user_error))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((page, total.unsigned_abs()))
    }

    async fn followed_ids(
        &self,
        follower: UserId,
        candidates: &[UserId],
    ) -> Result<Vec<UserId>, FollowPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let candidate_uuids: Vec<Uuid> =
            candidates.iter().map(|id| *id.as_uuid()).collect();

        let followed: Vec<Uuid> = follows::table
            .filter(follows::follower_id.eq(follower.as_uuid()))
            .filter(follows::followed_id.eq_any(&candidate_uuids))
            .select(follows::followed_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(followed.into_iter().map(UserId::from_uuid).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(
            repo_err,
            FollowPersistenceError::Connection { .. }
        ));
    }
}
