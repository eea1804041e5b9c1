//! Port abstraction for recipe persistence adapters.
//!
//! The write operations take the already-resolved tag and ingredient
//! entities alongside the validated draft so adapters only persist and
//! assemble; referential checks happen in the inbound adapter before the
//! call. Adapters must replace tag and line associations atomically: a
//! concurrent reader never observes a recipe with a partial line set.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ingredient::Ingredient;
use crate::domain::recipe::{IngredientLine, RecipeDraft, RecipeListFilter, RecipeView};
use crate::domain::shopping_list::CartLine;
use crate::domain::tag::Tag;
use crate::domain::user::{User, UserId};

use super::define_port_error;
use super::recipe_mark_repository::InMemoryRecipeMarkRepository;

define_port_error! {
    /// Persistence errors raised by recipe repository adapters.
    pub enum RecipePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "recipe repository query failed: {message}",
    }
}

/// Resolve draft lines against the referenced catalogue entries.
///
/// `ingredients` must contain every ingredient the draft references; the
/// inbound adapter guarantees this before the write reaches an adapter.
pub fn resolve_lines(draft: &RecipeDraft, ingredients: &[Ingredient]) -> Vec<IngredientLine> {
    draft
        .ingredients
        .iter()
        .filter_map(|line| {
            ingredients
                .iter()
                .find(|ingredient| ingredient.id == line.id)
                .map(|ingredient| IngredientLine {
                    id: ingredient.id,
                    name: ingredient.name.clone(),
                    measurement_unit: ingredient.measurement_unit.clone(),
                    amount: line.amount,
                })
        })
        .collect()
}

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Persist a new recipe with its tag and line associations.
    async fn create(
        &self,
        author: &User,
        draft: &RecipeDraft,
        tags: Vec<Tag>,
        ingredients: Vec<Ingredient>,
    ) -> Result<RecipeView, RecipePersistenceError>;

    /// Replace an existing recipe's fields and associations atomically.
    ///
    /// Returns `None` when the recipe does not exist.
    async fn update(
        &self,
        recipe_id: i32,
        draft: &RecipeDraft,
        tags: Vec<Tag>,
        ingredients: Vec<Ingredient>,
    ) -> Result<Option<RecipeView>, RecipePersistenceError>;

    /// Delete a recipe and its dependent rows; `false` when absent.
    async fn delete(&self, recipe_id: i32) -> Result<bool, RecipePersistenceError>;

    /// Full read representation of one recipe.
    async fn find_view(
        &self,
        recipe_id: i32,
    ) -> Result<Option<RecipeView>, RecipePersistenceError>;

    /// One page of recipes, newest first, plus the total count.
    async fn list(
        &self,
        filter: &RecipeListFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<RecipeView>, u64), RecipePersistenceError>;

    /// An author's recipes, newest first, optionally capped.
    async fn list_by_author(
        &self,
        author: UserId,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeView>, RecipePersistenceError>;

    /// Number of recipes by this author.
    async fn count_by_author(&self, author: UserId) -> Result<u64, RecipePersistenceError>;

    /// Every ingredient line of every recipe in the user's shopping cart.
    async fn shopping_cart_lines(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CartLine>, RecipePersistenceError>;
}

#[derive(Debug, Default)]
struct InMemoryRecipeState {
    recipes: Vec<RecipeView>,
    next_id: i32,
}

/// In-memory `RecipeRepository` used by handler tests and local development.
///
/// Shares the favorite and cart fixtures so list filters and the
/// shopping-cart join behave like the database-backed adapter.
#[derive(Debug)]
pub struct InMemoryRecipeRepository {
    state: Mutex<InMemoryRecipeState>,
    favorites: Arc<InMemoryRecipeMarkRepository>,
    cart: Arc<InMemoryRecipeMarkRepository>,
}

impl InMemoryRecipeRepository {
    /// Build a repository wired to the given mark fixtures.
    pub fn new(
        favorites: Arc<InMemoryRecipeMarkRepository>,
        cart: Arc<InMemoryRecipeMarkRepository>,
    ) -> Self {
        Self {
            state: Mutex::new(InMemoryRecipeState {
                recipes: Vec::new(),
                next_id: 1,
            }),
            favorites,
            cart,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryRecipeState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn matches(&self, recipe: &RecipeView, filter: &RecipeListFilter) -> bool {
        if let Some(author) = filter.author {
            if recipe.author.id != author {
                return false;
            }
        }
        if !filter.tag_slugs.is_empty()
            && !recipe
                .tags
                .iter()
                .any(|tag| filter.tag_slugs.iter().any(|slug| tag.slug.as_ref() == slug))
        {
            return false;
        }
        if let Some(user) = filter.favorited_by {
            if !self.favorites.contains_sync(user, recipe.id) {
                return false;
            }
        }
        if let Some(user) = filter.in_cart_of {
            if !self.cart.contains_sync(user, recipe.id) {
                return false;
            }
        }
        true
    }
}

impl Default for InMemoryRecipeRepository {
    fn default() -> Self {
        Self::new(
            Arc::new(InMemoryRecipeMarkRepository::default()),
            Arc::new(InMemoryRecipeMarkRepository::default()),
        )
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn create(
        &self,
        author: &User,
        draft: &RecipeDraft,
        tags: Vec<Tag>,
        ingredients: Vec<Ingredient>,
    ) -> Result<RecipeView, RecipePersistenceError> {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        let view = RecipeView {
            id,
            author: author.clone(),
            name: draft.name.clone(),
            text: draft.text.clone(),
            cooking_time: draft.cooking_time,
            image: draft.image.as_ref().to_owned(),
            tags,
            ingredients: resolve_lines(draft, &ingredients),
            created_at: Utc::now(),
        };
        state.recipes.push(view.clone());
        Ok(view)
    }

    async fn update(
        &self,
        recipe_id: i32,
        draft: &RecipeDraft,
        tags: Vec<Tag>,
        ingredients: Vec<Ingredient>,
    ) -> Result<Option<RecipeView>, RecipePersistenceError> {
        let mut state = self.lock();
        let Some(recipe) = state
            .recipes
            .iter_mut()
            .find(|recipe| recipe.id == recipe_id)
        else {
            return Ok(None);
        };
        recipe.name = draft.name.clone();
        recipe.text = draft.text.clone();
        recipe.cooking_time = draft.cooking_time;
        recipe.image = draft.image.as_ref().to_owned();
        recipe.tags = tags;
        recipe.ingredients = resolve_lines(draft, &ingredients);
        Ok(Some(recipe.clone()))
    }

    async fn delete(&self, recipe_id: i32) -> Result<bool, RecipePersistenceError> {
        let mut state = self.lock();
        let before = state.recipes.len();
        state.recipes.retain(|recipe| recipe.id != recipe_id);
        Ok(state.recipes.len() != before)
    }

    async fn find_view(
        &self,
        recipe_id: i32,
    ) -> Result<Option<RecipeView>, RecipePersistenceError> {
        Ok(self
            .lock()
            .recipes
            .iter()
            .find(|recipe| recipe.id == recipe_id)
            .cloned())
    }

    async fn list(
        &self,
        filter: &RecipeListFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<RecipeView>, u64), RecipePersistenceError> {
        let matched: Vec<RecipeView> = {
            let state = self.lock();
            state
                .recipes
                .iter()
                .filter(|recipe| self.matches(recipe, filter))
                .cloned()
                .collect()
        };
        let mut matched = matched;
        matched.sort_by_key(|recipe| std::cmp::Reverse(recipe.id));
        let count = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect();
        Ok((page, count))
    }

    async fn list_by_author(
        &self,
        author: UserId,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeView>, RecipePersistenceError> {
        let mut matched: Vec<RecipeView> = self
            .lock()
            .recipes
            .iter()
            .filter(|recipe| recipe.author.id == author)
            .cloned()
            .collect();
        matched.sort_by_key(|recipe| std::cmp::Reverse(recipe.id));
        if let Some(limit) = limit {
            matched.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(matched)
    }

    async fn count_by_author(&self, author: UserId) -> Result<u64, RecipePersistenceError> {
        Ok(self
            .lock()
            .recipes
            .iter()
            .filter(|recipe| recipe.author.id == author)
            .count() as u64)
    }

    async fn shopping_cart_lines(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CartLine>, RecipePersistenceError> {
        let state = self.lock();
        Ok(state
            .recipes
            .iter()
            .filter(|recipe| self.cart.contains_sync(user_id, recipe.id))
            .flat_map(|recipe| {
                recipe.ingredients.iter().map(|line| CartLine {
                    name: line.name.clone(),
                    measurement_unit: line.measurement_unit.clone(),
                    amount: line.amount,
                })
            })
            .collect())
    }
}
