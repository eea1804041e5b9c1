//! Port abstraction for the read-only ingredient catalogue.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::ingredient::Ingredient;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by ingredient repository adapters.
    pub enum IngredientPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "ingredient repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "ingredient repository query failed: {message}",
    }
}

#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// All ingredients ordered by id, optionally restricted to a
    /// case-insensitive name prefix.
    async fn list(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, IngredientPersistenceError>;

    /// Fetch one ingredient by id.
    async fn find_by_id(
        &self,
        id: i32,
    ) -> Result<Option<Ingredient>, IngredientPersistenceError>;

    /// Fetch the subset of `ids` that exist, in id order.
    async fn find_by_ids(
        &self,
        ids: &[i32],
    ) -> Result<Vec<Ingredient>, IngredientPersistenceError>;
}

/// In-memory `IngredientRepository` used by handler tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryIngredientRepository {
    ingredients: Mutex<Vec<Ingredient>>,
}

impl InMemoryIngredientRepository {
    /// Pre-populate the catalogue.
    pub fn with_ingredients(ingredients: Vec<Ingredient>) -> Self {
        Self {
            ingredients: Mutex::new(ingredients),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Ingredient>> {
        self.ingredients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl IngredientRepository for InMemoryIngredientRepository {
    async fn list(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, IngredientPersistenceError> {
        let prefix = name_prefix.map(str::to_lowercase);
        let mut matched: Vec<Ingredient> = self
            .lock()
            .iter()
            .filter(|ingredient| match &prefix {
                Some(prefix) => ingredient.name.to_lowercase().starts_with(prefix),
                None => true,
            })
            .cloned()
            .collect();
        matched.sort_by_key(|ingredient| ingredient.id);
        Ok(matched)
    }

    async fn find_by_id(
        &self,
        id: i32,
    ) -> Result<Option<Ingredient>, IngredientPersistenceError> {
        Ok(self
            .lock()
            .iter()
            .find(|ingredient| ingredient.id == id)
            .cloned())
    }

    async fn find_by_ids(
        &self,
        ids: &[i32],
    ) -> Result<Vec<Ingredient>, IngredientPersistenceError> {
        let mut matched: Vec<Ingredient> = self
            .lock()
            .iter()
            .filter(|ingredient| ids.contains(&ingredient.id))
            .cloned()
            .collect();
        matched.sort_by_key(|ingredient| ingredient.id);
        Ok(matched)
    }
}
