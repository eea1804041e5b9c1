//! Ingredient catalogue handlers.
//!
//! ```text
//! GET /api/ingredients?name=<prefix>  Search ingredients by name prefix
//! GET /api/ingredients/{id}           Fetch one ingredient
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ingredient::Ingredient;
use crate::domain::Error;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Ingredient payload returned by the catalogue endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// Name-prefix search parameter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientQuery {
    pub name: Option<String>,
}

/// List ingredients, optionally restricted to a name prefix.
#[utoipa::path(
    get,
    path = "/api/ingredients",
    params(("name" = Option<String>, Query, description = "Case-insensitive name prefix")),
    responses((status = 200, description = "Matching ingredients", body = [IngredientResponse])),
    tags = ["ingredients"],
    operation_id = "listIngredients"
)]
#[get("/ingredients")]
pub async fn list_ingredients(
    state: web::Data<HttpState>,
    query: web::Query<IngredientQuery>,
) -> ApiResult<web::Json<Vec<IngredientResponse>>> {
    let ingredients = state.ingredients.list(query.name.as_deref()).await?;
    Ok(web::Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

/// Fetch a single ingredient by id.
#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    params(("id" = i32, Path, description = "Ingredient identifier")),
    responses(
        (status = 200, description = "The ingredient", body = IngredientResponse),
        (status = 404, description = "No such ingredient", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "retrieveIngredient"
)]
#[get("/ingredients/{id}")]
pub async fn retrieve_ingredient(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<IngredientResponse>> {
    let ingredient = state
        .ingredients
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("ingredient does not exist"))?;
    Ok(web::Json(IngredientResponse::from(ingredient)))
}
