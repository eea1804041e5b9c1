//! Shared fixtures for handler tests.

use std::sync::Arc;

use actix_web::{web, App};

use crate::domain::auth::{generate_salt, generate_token_key, password_digest, token_digest};
use crate::domain::ingredient::Ingredient;
use crate::domain::ports::{
    InMemoryFollowRepository, InMemoryIngredientRepository, InMemoryRecipeMarkRepository,
    InMemoryRecipeRepository, InMemoryTagRepository, InMemoryTokenRepository,
    InMemoryUserRepository, NewUserRecord, TokenRepository, UserRepository,
};
use crate::domain::tag::Tag;
use crate::domain::user::{Email, User, UserId, Username};
use crate::inbound::http::state::HttpState;

/// Handler-test state with direct handles to every in-memory fixture.
pub struct TestState {
    pub state: HttpState,
    pub users: Arc<InMemoryUserRepository>,
    pub tokens: Arc<InMemoryTokenRepository>,
    pub recipes: Arc<InMemoryRecipeRepository>,
    pub favorites: Arc<InMemoryRecipeMarkRepository>,
    pub cart: Arc<InMemoryRecipeMarkRepository>,
    pub follows: Arc<InMemoryFollowRepository>,
}

/// In-memory state with seeded tag and ingredient catalogues.
pub fn seeded_state() -> TestState {
    let users = Arc::new(InMemoryUserRepository::default());
    let tokens = Arc::new(InMemoryTokenRepository::default());
    let favorites = Arc::new(InMemoryRecipeMarkRepository::default());
    let cart = Arc::new(InMemoryRecipeMarkRepository::default());
    let recipes = Arc::new(InMemoryRecipeRepository::new(
        Arc::clone(&favorites),
        Arc::clone(&cart),
    ));
    let follows = Arc::new(InMemoryFollowRepository::default());

    let tags = Arc::new(InMemoryTagRepository::with_tags(vec![
        Tag::try_from_parts(1, "Breakfast", "#49B64E", "breakfast").expect("valid tag"),
        Tag::try_from_parts(2, "Dinner", "#3333FF", "dinner").expect("valid tag"),
    ]));
    let ingredients = Arc::new(InMemoryIngredientRepository::with_ingredients(vec![
        Ingredient {
            id: 1,
            name: "flour".into(),
            measurement_unit: "g".into(),
        },
        Ingredient {
            id: 2,
            name: "sugar".into(),
            measurement_unit: "g".into(),
        },
        Ingredient {
            id: 3,
            name: "milk".into(),
            measurement_unit: "ml".into(),
        },
    ]));

    let state = HttpState {
        users: users.clone(),
        tokens: tokens.clone(),
        tags,
        ingredients,
        recipes: recipes.clone(),
        favorites: favorites.clone(),
        cart: cart.clone(),
        follows: follows.clone(),
    };

    TestState {
        state,
        users,
        tokens,
        recipes,
        favorites,
        cart,
        follows,
    }
}

/// Create an account directly in the fixtures and issue a token for it.
///
/// Returns the user and the raw token key for `Authorization: Token <key>`.
pub async fn seed_user(fixtures: &TestState, email: &str, username: &str) -> (User, String) {
    let user = User {
        id: UserId::random(),
        email: Email::new(email).expect("valid email"),
        username: Username::new(username).expect("valid username"),
        first_name: "Test".into(),
        last_name: "User".into(),
    };
    let salt = generate_salt();
    fixtures
        .users
        .create(&NewUserRecord {
            user: user.clone(),
            password_digest: password_digest("password", &salt),
            password_salt: salt,
        })
        .await
        .expect("seed user");
    fixtures.follows.add_user(user.clone());

    let key = generate_token_key();
    fixtures
        .tokens
        .insert(user.id, &token_digest(&key))
        .await
        .expect("seed token");

    (user, key)
}

/// App wired with the full `/api` surface over the given state.
pub fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(crate::inbound::http::configure)
}

/// `Authorization` header tuple for a seeded token key.
pub fn auth_header(key: &str) -> (&'static str, String) {
    ("Authorization", format!("Token {key}"))
}
