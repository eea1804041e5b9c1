//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend on
//! domain ports only and remain testable without a database.

use std::sync::Arc;

use crate::domain::ports::{
    FollowRepository, IngredientRepository, RecipeMarkRepository, RecipeRepository, TagRepository,
    TokenRepository, UserRepository,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub ingredients: Arc<dyn IngredientRepository>,
    pub recipes: Arc<dyn RecipeRepository>,
    pub favorites: Arc<dyn RecipeMarkRepository>,
    pub cart: Arc<dyn RecipeMarkRepository>,
    pub follows: Arc<dyn FollowRepository>,
}
