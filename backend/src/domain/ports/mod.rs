//! Port traits the inbound adapters depend on.
//!
//! Each port carries its own error enum plus an in-memory implementation
//! used by handler tests and local development. Database-backed adapters
//! live under `outbound::persistence`.

mod macros;

pub mod follow_repository;
pub mod ingredient_repository;
pub mod recipe_mark_repository;
pub mod recipe_repository;
pub mod tag_repository;
pub mod token_repository;
pub mod user_repository;

pub(crate) use macros::define_port_error;

pub use follow_repository::{FollowPersistenceError, FollowRepository, InMemoryFollowRepository};
pub use ingredient_repository::{
    IngredientPersistenceError, IngredientRepository, InMemoryIngredientRepository,
};
pub use recipe_mark_repository::{
    InMemoryRecipeMarkRepository, RecipeMarkError, RecipeMarkRepository,
};
pub use recipe_repository::{
    InMemoryRecipeRepository, RecipePersistenceError, RecipeRepository,
};
pub use tag_repository::{InMemoryTagRepository, TagPersistenceError, TagRepository};
pub use token_repository::{InMemoryTokenRepository, TokenPersistenceError, TokenRepository};
pub use user_repository::{
    InMemoryUserRepository, NewUserRecord, StoredCredentials, UserPersistenceError, UserRepository,
};
