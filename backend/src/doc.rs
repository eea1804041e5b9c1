//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every REST endpoint and DTO schema into one document.
//! Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::ingredients::IngredientResponse;
use crate::inbound::http::recipes::{
    IngredientAmountRequest, IngredientLineResponse, RecipeRequest, RecipeResponse,
    ShortRecipeResponse, StatusResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::tags::TagResponse;
use crate::inbound::http::tokens::{LoginRequest, TokenResponse};
use crate::inbound::http::users::{
    SignupRequest, SignupResponse, SubscriptionResponse, UserResponse,
};

/// Enrich the generated document with the token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "TokenAuth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "`Token <key>` issued by POST /api/auth/token/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recipe-sharing backend API",
        description = "Recipes, tags, ingredients, favorites, shopping carts, and author subscriptions."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("TokenAuth" = [])),
    paths(
        crate::inbound::http::tokens::login,
        crate::inbound::http::tokens::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::retrieve_user,
        crate::inbound::http::users::list_subscriptions,
        crate::inbound::http::users::subscribe,
        crate::inbound::http::users::unsubscribe,
        crate::inbound::http::tags::list_tags,
        crate::inbound::http::tags::retrieve_tag,
        crate::inbound::http::ingredients::list_ingredients,
        crate::inbound::http::ingredients::retrieve_ingredient,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::retrieve_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::recipes::add_favorite,
        crate::inbound::http::recipes::remove_favorite,
        crate::inbound::http::recipes::add_to_shopping_cart,
        crate::inbound::http::recipes::remove_from_shopping_cart,
        crate::inbound::http::recipes::download_shopping_cart,
    ),
    components(schemas(
        ErrorSchema,
        LoginRequest,
        TokenResponse,
        SignupRequest,
        SignupResponse,
        UserResponse,
        SubscriptionResponse,
        TagResponse,
        IngredientResponse,
        IngredientAmountRequest,
        RecipeRequest,
        RecipeResponse,
        IngredientLineResponse,
        ShortRecipeResponse,
        StatusResponse,
    )),
    tags(
        (name = "auth", description = "Token issue and revocation"),
        (name = "users", description = "Accounts and profiles"),
        (name = "subscriptions", description = "Author subscriptions"),
        (name = "tags", description = "Recipe tag catalogue"),
        (name = "ingredients", description = "Ingredient catalogue"),
        (name = "recipes", description = "Recipes, marks, and the shopping list")
    )
)]
pub struct ApiDoc;
