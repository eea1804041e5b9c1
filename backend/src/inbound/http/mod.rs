//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod ingredients;
pub mod paging;
pub mod recipes;
pub mod schemas;
pub mod state;
pub mod tags;
#[cfg(test)]
pub mod test_utils;
pub mod tokens;
pub mod users;

pub use error::ApiResult;

use actix_web::web;

/// Mount every `/api` endpoint.
///
/// Static segments (`me`, `subscriptions`, `download_shopping_cart`) are
/// registered before their `{id}` siblings so they are matched first.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(tokens::login)
            .service(tokens::logout)
            .service(users::register)
            .service(users::current_user)
            .service(users::list_subscriptions)
            .service(users::subscribe)
            .service(users::unsubscribe)
            .service(users::retrieve_user)
            .service(users::list_users)
            .service(tags::list_tags)
            .service(tags::retrieve_tag)
            .service(ingredients::list_ingredients)
            .service(ingredients::retrieve_ingredient)
            .service(recipes::download_shopping_cart)
            .service(recipes::list_recipes)
            .service(recipes::create_recipe)
            .service(recipes::retrieve_recipe)
            .service(recipes::update_recipe)
            .service(recipes::delete_recipe)
            .service(recipes::add_favorite)
            .service(recipes::remove_favorite)
            .service(recipes::add_to_shopping_cart)
            .service(recipes::remove_from_shopping_cart),
    );
}
