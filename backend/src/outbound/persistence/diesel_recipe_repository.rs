//! PostgreSQL-backed `RecipeRepository` implementation using Diesel ORM.
//!
//! Writes run inside a transaction so the recipe row and its tag and line
//! associations change atomically; readers never observe a half-updated
//! recipe. Reads batch-load associations for a whole page to avoid
//! per-recipe queries.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ingredient::Ingredient;
use crate::domain::ports::{RecipePersistenceError, RecipeRepository};
use crate::domain::recipe::{IngredientLine, RecipeDraft, RecipeListFilter, RecipeView};
use crate::domain::shopping_list::CartLine;
use crate::domain::tag::Tag;
use crate::domain::user::{User, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_user_repository::row_to_user;
use super::models::{
    IngredientRow, NewRecipeIngredientRow, NewRecipeRow, NewRecipeTagRow, RecipeRow, RecipeUpdate,
    TagRow, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, shopping_carts, tags, users};

/// Diesel-backed implementation of the `RecipeRepository` port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipePersistenceError {
    map_basic_pool_error(error, RecipePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RecipePersistenceError {
    map_basic_diesel_error(
        error,
        RecipePersistenceError::query,
        RecipePersistenceError::connection,
    )
}

/// Build the filtered recipes query shared by `list` paging and counting.
fn filtered_recipes(filter: &RecipeListFilter) -> recipes::BoxedQuery<'static, Pg> {
    let mut query = recipes::table.into_boxed();

    if let Some(author) = filter.author {
        query = query.filter(recipes::author_id.eq(*author.as_uuid()));
    }
    if !filter.tag_slugs.is_empty() {
        let tagged = recipe_tags::table
            .inner_join(tags::table)
            .filter(tags::slug.eq_any(filter.tag_slugs.clone()))
            .select(recipe_tags::recipe_id);
        query = query.filter(recipes::id.eq_any(tagged));
    }
    if let Some(user) = filter.favorited_by {
        let marked = super::schema::favorite_recipes::table
            .filter(super::schema::favorite_recipes::user_id.eq(*user.as_uuid()))
            .select(super::schema::favorite_recipes::recipe_id);
        query = query.filter(recipes::id.eq_any(marked));
    }
    if let Some(user) = filter.in_cart_of {
        let marked = shopping_carts::table
            .filter(shopping_carts::user_id.eq(*user.as_uuid()))
            .select(shopping_carts::recipe_id);
        query = query.filter(recipes::id.eq_any(marked));
    }

    query
}

/// Association rows for the recipe write path.
fn association_rows(
    recipe_id: i32,
    draft: &RecipeDraft,
) -> (Vec<NewRecipeTagRow>, Vec<NewRecipeIngredientRow>) {
    let tag_rows = draft
        .tag_ids
        .iter()
        .map(|&tag_id| NewRecipeTagRow { recipe_id, tag_id })
        .collect();
    let line_rows = draft
        .ingredients
        .iter()
        .map(|line| NewRecipeIngredientRow {
            recipe_id,
            ingredient_id: line.id,
            amount: line.amount,
        })
        .collect();
    (tag_rows, line_rows)
}

/// Batch-load authors, tags, and lines, then assemble views in row order.
async fn assemble_views<C>(
    conn: &mut C,
    rows: Vec<RecipeRow>,
) -> Result<Vec<RecipeView>, RecipePersistenceError>
where
    C: AsyncConnection<Backend = Pg> + Send,
{
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    let author_ids: Vec<Uuid> = rows.iter().map(|row| row.author_id).collect();

    let author_rows: Vec<UserRow> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(UserRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let mut authors: HashMap<Uuid, User> = HashMap::with_capacity(author_rows.len());
    for row in author_rows {
        let id = row.id;
        let user = row_to_user(row)
            .map_err(|err| RecipePersistenceError::query(err.to_string()))?;
        authors.insert(id, user);
    }

    let tag_rows: Vec<(i32, TagRow)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .order(tags::id.asc())
        .select((recipe_tags::recipe_id, TagRow::as_select()))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let mut tags_by_recipe: HashMap<i32, Vec<Tag>> = HashMap::new();
    for (recipe_id, row) in tag_rows {
        let tag = Tag::try_from_parts(row.id, &row.name, &row.color, &row.slug)
            .map_err(|err| RecipePersistenceError::query(format!("stored tag invalid: {err}")))?;
        tags_by_recipe.entry(recipe_id).or_default().push(tag);
    }

    let line_rows: Vec<(i32, i32, IngredientRow)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .order(ingredients::id.asc())
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::amount,
            IngredientRow::as_select(),
        ))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let mut lines_by_recipe: HashMap<i32, Vec<IngredientLine>> = HashMap::new();
    for (recipe_id, amount, row) in line_rows {
        lines_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(IngredientLine {
                id: row.id,
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount,
            });
    }

    rows.into_iter()
        .map(|row| {
            let author = authors
                .get(&row.author_id)
                .cloned()
                .ok_or_else(|| RecipePersistenceError::query("recipe author row missing"))?;
            Ok(RecipeView {
                id: row.id,
                author,
                name: row.name,
                text: row.text,
                cooking_time: row.cooking_time,
                image: row.image,
                tags: tags_by_recipe.remove(&row.id).unwrap_or_default(),
                ingredients: lines_by_recipe.remove(&row.id).unwrap_or_default(),
                created_at: row.created_at,
            })
        })
        .collect()
}

/// Build the view for a freshly written recipe from already-resolved parts.
fn view_from_parts(
    row: RecipeRow,
    author: User,
    draft: &RecipeDraft,
    tags: Vec<Tag>,
    ingredients: &[Ingredient],
) -> RecipeView {
    RecipeView {
        id: row.id,
        author,
        name: draft.name.clone(),
        text: draft.text.clone(),
        cooking_time: draft.cooking_time,
        image: draft.image.as_ref().to_owned(),
        tags,
        ingredients: crate::domain::ports::recipe_repository::resolve_lines(draft, ingredients),
        created_at: row.created_at,
    }
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn create(
        &self,
        author: &User,
        draft: &RecipeDraft,
        tags: Vec<Tag>,
        ingredients: Vec<Ingredient>,
    ) -> Result<RecipeView, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewRecipeRow {
            author_id: *author.id.as_uuid(),
            name: &draft.name,
            image: draft.image.as_ref(),
            text: &draft.text,
            cooking_time: draft.cooking_time,
        };

        let row = conn
            .transaction::<RecipeRow, diesel::result::Error, _>(|conn| {
                async move {
                    let row: RecipeRow = diesel::insert_into(recipes::table)
                        .values(&new_row)
                        .returning(RecipeRow::as_returning())
                        .get_result(conn)
                        .await?;

                    let (tag_rows, line_rows) = association_rows(row.id, draft);
                    diesel::insert_into(recipe_tags::table)
                        .values(&tag_rows)
                        .execute(conn)
                        .await?;
                    diesel::insert_into(recipe_ingredients::table)
                        .values(&line_rows)
                        .execute(conn)
                        .await?;

                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(view_from_parts(row, author.clone(), draft, tags, &ingredients))
    }

    async fn update(
        &self,
        recipe_id: i32,
        draft: &RecipeDraft,
        tags: Vec<Tag>,
        ingredients: Vec<Ingredient>,
    ) -> Result<Option<RecipeView>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let update = RecipeUpdate {
            name: &draft.name,
            image: draft.image.as_ref(),
            text: &draft.text,
            cooking_time: draft.cooking_time,
        };

        let row = conn
            .transaction::<Option<RecipeRow>, diesel::result::Error, _>(|conn| {
                async move {
                    let row: Option<RecipeRow> = diesel::update(recipes::table.find(recipe_id))
                        .set(&update)
                        .returning(RecipeRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()?;
                    let Some(row) = row else {
                        return Ok(None);
                    };

                    diesel::delete(
                        recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(
                        recipe_ingredients::table
                            .filter(recipe_ingredients::recipe_id.eq(recipe_id)),
                    )
                    .execute(conn)
                    .await?;

                    let (tag_rows, line_rows) = association_rows(recipe_id, draft);
                    diesel::insert_into(recipe_tags::table)
                        .values(&tag_rows)
                        .execute(conn)
                        .await?;
                    diesel::insert_into(recipe_ingredients::table)
                        .values(&line_rows)
                        .execute(conn)
                        .await?;

                    Ok(Some(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let author_row: UserRow = users::table
            .filter(users::id.eq(row.author_id))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let author =
            row_to_user(author_row).map_err(|err| RecipePersistenceError::query(err.to_string()))?;

        Ok(Some(view_from_parts(row, author, draft, tags, &ingredients)))
    }

    async fn delete(&self, recipe_id: i32) -> Result<bool, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Junction and mark rows go with the recipe via ON DELETE CASCADE.
        let deleted = diesel::delete(recipes::table.find(recipe_id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn find_view(
        &self,
        recipe_id: i32,
    ) -> Result<Option<RecipeView>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<RecipeRow> = recipes::table
            .find(recipe_id)
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut views = assemble_views(&mut conn, vec![row]).await?;
        Ok(views.pop())
    }

    async fn list(
        &self,
        filter: &RecipeListFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<RecipeView>, u64), RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered_recipes(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<RecipeRow> = filtered_recipes(filter)
            .order(recipes::id.desc())
            .offset(offset)
            .limit(limit)
            .select(RecipeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let views = assemble_views(&mut conn, rows).await?;
        Ok((views, total.unsigned_abs()))
    }

    async fn list_by_author(
        &self,
        author: UserId,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeView>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = recipes::table
            .filter(recipes::author_id.eq(*author.as_uuid()))
            .order(recipes::id.desc())
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let rows: Vec<RecipeRow> = query
            .select(RecipeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        assemble_views(&mut conn, rows).await
    }

    async fn count_by_author(&self, author: UserId) -> Result<u64, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = recipes::table
            .filter(recipes::author_id.eq(author.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(total.unsigned_abs())
    }

    async fn shopping_cart_lines(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CartLine>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let in_cart = shopping_carts::table
            .filter(shopping_carts::user_id.eq(*user_id.as_uuid()))
            .select(shopping_carts::recipe_id);

        let rows: Vec<(String, String, i32)> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq_any(in_cart))
            .select((
                ingredients::name,
                ingredients::measurement_unit,
                recipe_ingredients::amount,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|(name, measurement_unit, amount)| CartLine {
                name,
                measurement_unit,
                amount,
            })
            .collect())
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
            RecipePersistenceError::Connection { .. }
        ));
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(repo_err, RecipePersistenceError::Query { .. }));
    }
}
