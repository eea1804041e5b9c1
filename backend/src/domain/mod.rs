//! Transport-agnostic domain layer.
//!
//! Entities, validation, and the port traits adapters implement. Nothing
//! in this module depends on actix or diesel.

pub mod auth;
pub mod error;
pub mod ingredient;
pub mod ports;
pub mod recipe;
pub mod shopping_list;
pub mod tag;
pub mod user;

pub use error::{Error, ErrorCode};
