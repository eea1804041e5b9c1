//! PostgreSQL-backed `TagRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TagPersistenceError, TagRepository};
use crate::domain::tag::Tag;

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::TagRow;
use super::pool::{DbPool, PoolError};
use super::schema::tags;

/// Diesel-backed implementation of the `TagRepository` port.
#[derive(Clone)]
pub struct DieselTagRepository {
    pool: DbPool,
}

impl DieselTagRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TagPersistenceError {
    map_basic_pool_error(error, TagPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TagPersistenceError {
    map_basic_diesel_error(
        error,
        TagPersistenceError::query,
        TagPersistenceError::connection,
    )
}

pub(crate) fn row_to_tag(row: TagRow) -> Result<Tag, TagPersistenceError> {
    Tag::try_from_parts(row.id, &row.name, &row.color, &row.slug)
        .map_err(|err| TagPersistenceError::query(format!("stored tag invalid: {err}")))
}

#[async_trait]
impl TagRepository for DieselTagRepository {
    async fn list(&self) -> Result<Vec<Tag>, TagPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TagRow> = tags::table
            .order(tags::id.asc())
            .select(TagRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_tag).collect()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, TagPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TagRow> = tags::table
            .find(id)
            .select(TagRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_tag).transpose()
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>, TagPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TagRow> = tags::table
            .filter(tags::id.eq_any(ids))
            .order(tags::id.asc())
            .select(TagRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_tag).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn valid_row_maps_to_a_tag() {
        let row = TagRow {
            id: 1,
            name: "Breakfast".into(),
            color: "#49B64E".into(),
            slug: "breakfast".into(),
        };
        let tag = row_to_tag(row).expect("valid row");
        assert_eq!(tag.name, "Breakfast");
        assert_eq!(String::from(tag.slug), "breakfast");
    }

    #[rstest]
    fn invalid_stored_color_surfaces_as_query_error() {
        let row = TagRow {
            id: 1,
            name: "Breakfast".into(),
            color: "green".into(),
            slug: "breakfast".into(),
        };
        assert!(matches!(
            row_to_tag(row),
            Err(TagPersistenceError::Query { .. })
        ));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(repo_err, TagPersistenceError::Connection { .. }));
    }
}
