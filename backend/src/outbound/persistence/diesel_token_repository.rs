//! PostgreSQL-backed `TokenRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TokenPersistenceError, TokenRepository};
use crate::domain::user::UserId;

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewAuthTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::auth_tokens;

/// Diesel-backed implementation of the `TokenRepository` port.
#[derive(Clone)]
pub struct DieselTokenRepository {
    pool: DbPool,
}

impl DieselTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TokenPersistenceError {
    map_basic_pool_error(error, TokenPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TokenPersistenceError {
    map_basic_diesel_error(
        error,
        TokenPersistenceError::query,
        TokenPersistenceError::connection,
    )
}

#[async_trait]
impl TokenRepository for DieselTokenRepository {
    async fn insert(&self, user_id: UserId, digest: &str) -> Result<(), TokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewAuthTokenRow {
            digest,
            user_id: *user_id.as_uuid(),
        };

        diesel::insert_into(auth_tokens::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_user_id(&self, digest: &str) -> Result<Option<UserId>, TokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let owner: Option<uuid::Uuid> = auth_tokens::table
            .filter(auth_tokens::digest.eq(digest))
            .select(auth_tokens::user_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(owner.map(UserId::from_uuid))
    }

    async fn delete(&self, digest: &str) -> Result<bool, TokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(auth_tokens::table.filter(auth_tokens::digest.eq(digest)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
