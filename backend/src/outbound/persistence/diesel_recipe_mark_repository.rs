//! PostgreSQL-backed `RecipeMarkRepository` implementations using Diesel ORM.
//!
//! Favorites and the shopping cart are the same (user, recipe) pair shape
//! over two tables, so both adapters are generated from one macro. The
//! composite primary key is the race guard: concurrent duplicate inserts
//! surface as a unique violation and map to `AlreadyMarked`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RecipeMarkError, RecipeMarkRepository};
use crate::domain::user::UserId;

use super::diesel_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation_constraint,
};
use super::models::{NewFavoriteRow, NewShoppingCartRow};
use super::pool::{DbPool, PoolError};
use super::schema::{favorite_recipes, shopping_carts};

fn map_pool_error(error: PoolError) -> RecipeMarkError {
    map_basic_pool_error(error, RecipeMarkError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RecipeMarkError {
    map_basic_diesel_error(error, RecipeMarkError::query, RecipeMarkError::connection)
}

fn map_insert_error(error: diesel::result::Error) -> RecipeMarkError {
    if unique_violation_constraint(&error).is_some() {
        return RecipeMarkError::already_marked();
    }
    map_diesel_error(error)
}

macro_rules! define_mark_repository {
    (
        $(#[$outer:meta])*
        $name:ident, $table:ident, $row:ident
    ) => {
        $(#[$outer])*
        #[derive(Clone)]
        pub struct $name {
            pool: DbPool,
        }

        impl $name {
            /// Create a new repository with the given connection pool.
            pub fn new(pool: DbPool) -> Self {
                Self { pool }
            }
        }

        #[async_trait]
        impl RecipeMarkRepository for $name {
            async fn add(&self, user_id: UserId, recipe_id: i32) -> Result<(), RecipeMarkError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;

                let new_row = $row {
                    user_id: *user_id.as_uuid(),
                    recipe_id,
                };

                diesel::insert_into($table::table)
                    .values(&new_row)
                    .execute(&mut conn)
                    .await
                    .map(|_| ())
                    .map_err(map_insert_error)
            }

            async fn remove(
                &self,
                user_id: UserId,
                recipe_id: i32,
            ) -> Result<bool, RecipeMarkError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;

                let deleted = diesel::delete(
                    $table::table.find((*user_id.as_uuid(), recipe_id)),
                )
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;

                Ok(deleted > 0)
            }

            async fn contains(
                &self,
                user_id: UserId,
                recipe_id: i32,
            ) -> Result<bool, RecipeMarkError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;

                let found: Option<i32> = $table::table
                    .find((*user_id.as_uuid(), recipe_id))
                    .select($table::recipe_id)
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;

                Ok(found.is_some())
            }

            async fn marked_ids(
                &self,
                user_id: UserId,
                recipe_ids: &[i32],
            ) -> Result<Vec<i32>, RecipeMarkError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;

                $table::table
                    .filter($table::user_id.eq(user_id.as_uuid()))
                    .filter($table::recipe_id.eq_any(recipe_ids))
                    .select($table::recipe_id)
                    .load(&mut conn)
                    .await
                    .map_err(map_diesel_error)
            }
        }
    };
}

define_mark_repository! {
    /// Diesel-backed favorites adapter over the `favorite_recipes` table.
    DieselFavoriteRepository, favorite_recipes, NewFavoriteRow
}

define_mark_repository! {
    /// Diesel-backed shopping-cart adapter over the `shopping_carts` table.
    DieselShoppingCartRepository, shopping_carts, NewShoppingCartRow
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(repo_err, RecipeMarkError::Connection { .. }));
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(repo_err, RecipeMarkError::Query { .. }));
    }
}
