//! PostgreSQL-backed `IngredientRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ingredient::Ingredient;
use crate::domain::ports::{IngredientPersistenceError, IngredientRepository};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::IngredientRow;
use super::pool::{DbPool, PoolError};
use super::schema::ingredients;

/// Diesel-backed implementation of the `IngredientRepository` port.
#[derive(Clone)]
pub struct DieselIngredientRepository {
    pool: DbPool,
}

impl DieselIngredientRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> IngredientPersistenceError {
    map_basic_pool_error(error, IngredientPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> IngredientPersistenceError {
    map_basic_diesel_error(
        error,
        IngredientPersistenceError::query,
        IngredientPersistenceError::connection,
    )
}

fn row_to_ingredient(row: IngredientRow) -> Ingredient {
    Ingredient {
        id: row.id,
        name: row.name,
        measurement_unit: row.measurement_unit,
    }
}

/// Escape LIKE metacharacters so a prefix matches literally.
fn escape_like_prefix(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl IngredientRepository for DieselIngredientRepository {
    async fn list(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, IngredientPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = ingredients::table.into_boxed();
        if let Some(prefix) = name_prefix {
            query = query.filter(ingredients::name.ilike(escape_like_prefix(prefix)));
        }

        let rows: Vec<IngredientRow> = query
            .order(ingredients::id.asc())
            .select(IngredientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_ingredient).collect())
    }

    async fn find_by_id(
        &self,
        id: i32,
    ) -> Result<Option<Ingredient>, IngredientPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<IngredientRow> = ingredients::table
            .find(id)
            .select(IngredientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_ingredient))
    }

    async fn find_by_ids(
        &self,
        ids: &[i32],
    ) -> Result<Vec<Ingredient>, IngredientPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<IngredientRow> = ingredients::table
            .filter(ingredients::id.eq_any(ids))
            .order(ingredients::id.asc())
            .select(IngredientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_ingredient).collect())
    }
}
