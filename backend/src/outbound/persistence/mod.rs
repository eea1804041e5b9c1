//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL through `diesel-async` with `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows
//!   and domain entities. No business logic lives here.
//! - **Internal models**: row structs (`models.rs`) and schema definitions
//!   (`schema.rs`) never cross into the domain layer.
//! - **Strongly typed errors**: database failures map onto the port error
//!   enums; unique violations become the ports' duplicate variants.

mod diesel_error_mapping;
mod diesel_follow_repository;
mod diesel_ingredient_repository;
mod diesel_recipe_mark_repository;
mod diesel_recipe_repository;
mod diesel_tag_repository;
mod diesel_token_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_follow_repository::DieselFollowRepository;
pub use diesel_ingredient_repository::DieselIngredientRepository;
pub use diesel_recipe_mark_repository::{DieselFavoriteRepository, DieselShoppingCartRepository};
pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_tag_repository::DieselTagRepository;
pub use diesel_token_repository::DieselTokenRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
