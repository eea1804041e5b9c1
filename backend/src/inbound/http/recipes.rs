//! Recipe HTTP handlers.
//!
//! ```text
//! GET    /api/recipes                         List recipes (filtered, paginated)
//! POST   /api/recipes                         Publish a recipe
//! GET    /api/recipes/download_shopping_cart  Consolidated shopping list
//! GET    /api/recipes/{id}                    Fetch one recipe
//! PATCH  /api/recipes/{id}                    Edit own recipe
//! DELETE /api/recipes/{id}                    Delete own recipe
//! POST   /api/recipes/{id}/favorite           Add to favorites
//! DELETE /api/recipes/{id}/favorite           Remove from favorites
//! POST   /api/recipes/{id}/shopping_cart      Add to the shopping cart
//! DELETE /api/recipes/{id}/shopping_cart      Remove from the shopping cart
//! ```

use std::collections::HashSet;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{delete, get, patch, post, web, HttpRequest, HttpResponse};
use pagination::{Page, PageQuery};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ingredient::Ingredient;
use crate::domain::ports::RecipeMarkError;
use crate::domain::recipe::{
    ImageData, IngredientAmount, RecipeDraft, RecipeListFilter, RecipeView,
};
use crate::domain::shopping_list::{aggregate, render};
use crate::domain::tag::Tag;
use crate::domain::user::UserId;
use crate::domain::Error;
use crate::inbound::http::auth::RequestIdentity;
use crate::inbound::http::paging::{envelope, page_params};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::tags::TagResponse;
use crate::inbound::http::users::UserResponse;
use crate::inbound::http::ApiResult;

/// One ingredient reference in a recipe write request.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct IngredientAmountRequest {
    pub id: i32,
    pub amount: i32,
}

/// Recipe create/update request body.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RecipeRequest {
    pub ingredients: Vec<IngredientAmountRequest>,
    pub tags: Vec<i32>,
    /// Base64 data URL, e.g. `data:image/png;base64,...`.
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

/// One ingredient line in a recipe response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientLineResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full recipe payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<IngredientLineResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Compact recipe payload used by favorites, cart, and subscriptions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShortRecipeResponse {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl ShortRecipeResponse {
    pub(crate) fn from_view(view: RecipeView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            image: view.image,
            cooking_time: view.cooking_time,
        }
    }
}

/// Per-viewer mark and subscription state for a batch of recipes.
#[derive(Debug, Default)]
struct ViewerFlags {
    favorited: HashSet<i32>,
    in_cart: HashSet<i32>,
    followed_authors: HashSet<UserId>,
}

async fn viewer_flags(
    state: &HttpState,
    viewer: Option<UserId>,
    views: &[RecipeView],
) -> ApiResult<ViewerFlags> {
    let Some(viewer) = viewer else {
        return Ok(ViewerFlags::default());
    };

    let recipe_ids: Vec<i32> = views.iter().map(|view| view.id).collect();
    let author_ids: Vec<UserId> = views.iter().map(|view| view.author.id).collect();

    let favorited = state.favorites.marked_ids(viewer, &recipe_ids).await?;
    let in_cart = state.cart.marked_ids(viewer, &recipe_ids).await?;
    let followed = state.follows.followed_ids(viewer, &author_ids).await?;

    Ok(ViewerFlags {
        favorited: favorited.into_iter().collect(),
        in_cart: in_cart.into_iter().collect(),
        followed_authors: followed.into_iter().collect(),
    })
}

fn to_response(view: RecipeView, flags: &ViewerFlags) -> RecipeResponse {
    let is_subscribed = flags.followed_authors.contains(&view.author.id);
    RecipeResponse {
        id: view.id,
        tags: view.tags.into_iter().map(TagResponse::from).collect(),
        author: UserResponse::from_user(view.author, is_subscribed),
        ingredients: view
            .ingredients
            .into_iter()
            .map(|line| IngredientLineResponse {
                id: line.id,
                name: line.name,
                measurement_unit: line.measurement_unit,
                amount: line.amount,
            })
            .collect(),
        is_favorited: flags.favorited.contains(&view.id),
        is_in_shopping_cart: flags.in_cart.contains(&view.id),
        name: view.name,
        image: view.image,
        text: view.text,
        cooking_time: view.cooking_time,
    }
}

/// Validate the write payload into a domain draft.
fn parse_draft(payload: RecipeRequest) -> Result<RecipeDraft, Error> {
    let image =
        ImageData::new(payload.image).map_err(|err| Error::invalid_request(err.to_string()))?;
    RecipeDraft::try_from_parts(
        &payload.name,
        &payload.text,
        payload.cooking_time,
        image,
        payload.tags,
        payload
            .ingredients
            .into_iter()
            .map(|line| IngredientAmount {
                id: line.id,
                amount: line.amount,
            })
            .collect(),
    )
    .map_err(|err| Error::invalid_request(err.to_string()))
}

/// Resolve the draft's tag and ingredient references.
///
/// A dangling tag id is a validation failure; a dangling ingredient id is
/// a missing resource.
async fn resolve_references(
    state: &HttpState,
    draft: &RecipeDraft,
) -> ApiResult<(Vec<Tag>, Vec<Ingredient>)> {
    let tags = state.tags.find_by_ids(&draft.tag_ids).await?;
    if tags.len() != draft.tag_ids.len() {
        return Err(Error::invalid_request("tag does not exist"));
    }

    let ingredient_ids: Vec<i32> = draft.ingredients.iter().map(|line| line.id).collect();
    let ingredients = state.ingredients.find_by_ids(&ingredient_ids).await?;
    if ingredients.len() != ingredient_ids.len() {
        return Err(Error::not_found("ingredient does not exist"));
    }

    Ok((tags, ingredients))
}

/// Scalar list filters; repeated `tags` parameters are parsed separately.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeListQuery {
    pub author: Option<Uuid>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn flag_is_set(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

/// Collect every `tags=<slug>` pair from the raw query string.
///
/// `web::Query` flattens repeated keys, so the slugs are pulled from the
/// query string directly. Slugs are constrained to URL-safe characters,
/// which keeps this free of percent-decoding.
fn tag_slugs_from_query(query_string: &str) -> Vec<String> {
    query_string
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| *key == "tags")
        .map(|(_, value)| value.to_owned())
        .collect()
}

fn list_filter(
    query: &RecipeListQuery,
    tag_slugs: Vec<String>,
    viewer: Option<UserId>,
) -> RecipeListFilter {
    // Mark filters only make sense for an authenticated viewer; anonymous
    // callers get the unfiltered listing.
    let favorited_by = viewer.filter(|_| flag_is_set(query.is_favorited.as_deref()));
    let in_cart_of = viewer.filter(|_| flag_is_set(query.is_in_shopping_cart.as_deref()));
    RecipeListFilter {
        author: query.author.map(UserId::from_uuid),
        tag_slugs,
        favorited_by,
        in_cart_of,
    }
}

/// List recipes, newest first.
#[utoipa::path(
    get,
    path = "/api/recipes",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size"),
        ("author" = Option<Uuid>, Query, description = "Only recipes by this author"),
        ("tags" = Option<Vec<String>>, Query, description = "Tag slugs, repeatable"),
        ("is_favorited" = Option<String>, Query, description = "Only own favorites when `1`"),
        ("is_in_shopping_cart" = Option<String>, Query, description = "Only own cart when `1`")
    ),
    responses(
        (status = 200, description = "One page of recipes"),
        (status = 400, description = "Invalid parameters", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes"
)]
#[get("/recipes")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    request: HttpRequest,
    query: web::Query<RecipeListQuery>,
) -> ApiResult<web::Json<Page<RecipeResponse>>> {
    let viewer = identity.optional();
    let query = query.into_inner();
    let params = page_params(PageQuery {
        page: query.page,
        limit: query.limit,
    })?;

    let filter = list_filter(&query, tag_slugs_from_query(request.query_string()), viewer);
    let (views, count) = state
        .recipes
        .list(&filter, params.offset(), i64::from(params.limit()))
        .await?;

    let flags = viewer_flags(&state, viewer, &views).await?;
    let results = views
        .into_iter()
        .map(|view| to_response(view, &flags))
        .collect();

    Ok(web::Json(envelope(params, &request, count, results)?))
}

/// Publish a new recipe.
#[utoipa::path(
    post,
    path = "/api/recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown ingredient", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = identity.require()?;
    let author = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| Error::unauthorized("account no longer exists"))?;

    let draft = parse_draft(payload.into_inner())?;
    let (tags, ingredients) = resolve_references(&state, &draft).await?;

    let view = state
        .recipes
        .create(&author, &draft, tags, ingredients)
        .await?;

    let flags = ViewerFlags::default();
    Ok(HttpResponse::Created().json(to_response(view, &flags)))
}

/// Consolidated shopping list for everything in the cart.
#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    responses(
        (status = 200, description = "Plain-text shopping list", content_type = "text/plain"),
        (status = 400, description = "Shopping cart is empty", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "downloadShoppingCart"
)]
#[get("/recipes/download_shopping_cart")]
pub async fn download_shopping_cart(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
) -> ApiResult<HttpResponse> {
    let user_id = identity.require()?;

    let lines = state.recipes.shopping_cart_lines(user_id).await?;
    if lines.is_empty() {
        return Err(Error::invalid_request("shopping cart is empty"));
    }

    let body = render(&aggregate(lines));
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename("shopping_list.txt".to_owned())],
        })
        .body(body))
}

/// Fetch a single recipe.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    params(("id" = i32, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "The recipe", body = RecipeResponse),
        (status = 404, description = "No such recipe", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "retrieveRecipe"
)]
#[get("/recipes/{id}")]
pub async fn retrieve_recipe(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    path: web::Path<i32>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let view = state
        .recipes
        .find_view(path.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("recipe does not exist"))?;

    let flags = viewer_flags(&state, identity.optional(), std::slice::from_ref(&view)).await?;
    Ok(web::Json(to_response(view, &flags)))
}

/// Load a recipe and check the caller owns it.
async fn owned_recipe(
    state: &HttpState,
    user_id: UserId,
    recipe_id: i32,
) -> ApiResult<RecipeView> {
    let view = state
        .recipes
        .find_view(recipe_id)
        .await?
        .ok_or_else(|| Error::not_found("recipe does not exist"))?;
    if view.author.id != user_id {
        return Err(Error::forbidden("you cannot modify someone else's recipe"));
    }
    Ok(view)
}

/// Edit an existing recipe.
#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    request_body = RecipeRequest,
    params(("id" = i32, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Updated recipe", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "No such recipe", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[patch("/recipes/{id}")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    path: web::Path<i32>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let user_id = identity.require()?;
    let recipe_id = path.into_inner();
    owned_recipe(&state, user_id, recipe_id).await?;

    let draft = parse_draft(payload.into_inner())?;
    let (tags, ingredients) = resolve_references(&state, &draft).await?;

    let view = state
        .recipes
        .update(recipe_id, &draft, tags, ingredients)
        .await?
        .ok_or_else(|| Error::not_found("recipe does not exist"))?;

    let flags = viewer_flags(&state, Some(user_id), std::slice::from_ref(&view)).await?;
    Ok(web::Json(to_response(view, &flags)))
}

/// Delete an own recipe.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    params(("id" = i32, Path, description = "Recipe identifier")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "No such recipe", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id}")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let user_id = identity.require()?;
    let recipe_id = path.into_inner();
    owned_recipe(&state, user_id, recipe_id).await?;

    state.recipes.delete(recipe_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Confirmation body for successful mark removals.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

/// Shared toggle logic for favorites and the shopping cart.
async fn add_mark(
    state: &HttpState,
    marks: &dyn crate::domain::ports::RecipeMarkRepository,
    user_id: UserId,
    recipe_id: i32,
    duplicate_message: &'static str,
) -> ApiResult<ShortRecipeResponse> {
    let view = state
        .recipes
        .find_view(recipe_id)
        .await?
        .ok_or_else(|| Error::not_found("recipe does not exist"))?;

    match marks.add(user_id, recipe_id).await {
        Ok(()) => Ok(ShortRecipeResponse::from_view(view)),
        Err(RecipeMarkError::AlreadyMarked) => Err(Error::invalid_request(duplicate_message)),
        Err(other) => Err(other.into()),
    }
}

async fn remove_mark(
    state: &HttpState,
    marks: &dyn crate::domain::ports::RecipeMarkRepository,
    user_id: UserId,
    recipe_id: i32,
    absent_message: &'static str,
    removed_message: &'static str,
) -> ApiResult<HttpResponse> {
    state
        .recipes
        .find_view(recipe_id)
        .await?
        .ok_or_else(|| Error::not_found("recipe does not exist"))?;

    if !marks.remove(user_id, recipe_id).await? {
        return Err(Error::invalid_request(absent_message));
    }
    // A successful removal confirms with a status body rather than 204.
    Ok(HttpResponse::Ok().json(StatusResponse {
        status: removed_message.to_owned(),
    }))
}

/// Add a recipe to favorites.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite",
    params(("id" = i32, Path, description = "Recipe identifier")),
    responses(
        (status = 201, description = "Added to favorites", body = ShortRecipeResponse),
        (status = 400, description = "Already in favorites", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such recipe", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "addFavorite"
)]
#[post("/recipes/{id}/favorite")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let user_id = identity.require()?;
    let body = add_mark(
        &state,
        state.favorites.as_ref(),
        user_id,
        path.into_inner(),
        "recipe is already in favorites",
    )
    .await?;
    Ok(HttpResponse::Created().json(body))
}

/// Remove a recipe from favorites.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite",
    params(("id" = i32, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Removed from favorites", body = StatusResponse),
        (status = 400, description = "Was not in favorites", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such recipe", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "removeFavorite"
)]
#[delete("/recipes/{id}/favorite")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let user_id = identity.require()?;
    remove_mark(
        &state,
        state.favorites.as_ref(),
        user_id,
        path.into_inner(),
        "recipe is not in favorites",
        "recipe removed from favorites",
    )
    .await
}

/// Add a recipe to the shopping cart.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart",
    params(("id" = i32, Path, description = "Recipe identifier")),
    responses(
        (status = 201, description = "Added to the cart", body = ShortRecipeResponse),
        (status = 400, description = "Already in the cart", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such recipe", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "addToShoppingCart"
)]
#[post("/recipes/{id}/shopping_cart")]
pub async fn add_to_shopping_cart(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let user_id = identity.require()?;
    let body = add_mark(
        &state,
        state.cart.as_ref(),
        user_id,
        path.into_inner(),
        "recipe is already in the shopping cart",
    )
    .await?;
    Ok(HttpResponse::Created().json(body))
}

/// Remove a recipe from the shopping cart.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart",
    params(("id" = i32, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Removed from the cart", body = StatusResponse),
        (status = 400, description = "Was not in the cart", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such recipe", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "removeFromShoppingCart"
)]
#[delete("/recipes/{id}/shopping_cart")]
pub async fn remove_from_shopping_cart(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let user_id = identity.require()?;
    remove_mark(
        &state,
        state.cart.as_ref(),
        user_id,
        path.into_inner(),
        "recipe is not in the shopping cart",
        "recipe removed from the shopping cart",
    )
    .await
}

#[cfg(test)]
mod tests;
