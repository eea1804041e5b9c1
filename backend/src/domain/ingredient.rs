//! Ingredient data model.
//!
//! Ingredients form a read-only catalogue; recipes reference them through
//! quantified lines. The (name, measurement unit) pair is unique so the
//! shopping-list aggregation can group on it safely.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A catalogue ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Ingredient {
    /// Stable identifier.
    pub id: i32,
    /// Ingredient name, unique per measurement unit.
    pub name: String,
    /// Unit the amount is expressed in, e.g. `g` or `ml`.
    pub measurement_unit: String,
}
