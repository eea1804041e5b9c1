//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them
//! for compile-time query validation. Regenerate with `diesel
//! print-schema` after changing migrations.

diesel::table! {
    /// Registered user accounts.
    ///
    /// `email` and `username` carry unique indexes; credential material is
    /// stored as a salted digest, never in the clear.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        username -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        password_digest -> Varchar,
        password_salt -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Live authentication tokens, keyed by the digest of the client key.
    auth_tokens (digest) {
        digest -> Varchar,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recipe tag catalogue; `name`, `color`, and `slug` are each unique.
    tags (id) {
        id -> Int4,
        name -> Varchar,
        color -> Varchar,
        slug -> Varchar,
    }
}

diesel::table! {
    /// Ingredient catalogue; `(name, measurement_unit)` is unique.
    ingredients (id) {
        id -> Int4,
        name -> Varchar,
        measurement_unit -> Varchar,
    }
}

diesel::table! {
    /// Published recipes.
    recipes (id) {
        id -> Int4,
        author_id -> Uuid,
        name -> Varchar,
        image -> Text,
        text -> Text,
        cooking_time -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recipe-to-tag association rows.
    recipe_tags (recipe_id, tag_id) {
        recipe_id -> Int4,
        tag_id -> Int4,
    }
}

diesel::table! {
    /// Ingredient lines of a recipe; `amount` is checked positive.
    recipe_ingredients (recipe_id, ingredient_id) {
        recipe_id -> Int4,
        ingredient_id -> Int4,
        amount -> Int4,
    }
}

diesel::table! {
    /// Favorite marks; the composite key is the uniqueness guard.
    favorite_recipes (user_id, recipe_id) {
        user_id -> Uuid,
        recipe_id -> Int4,
    }
}

diesel::table! {
    /// Shopping-cart marks; same shape and guard as favorites.
    shopping_carts (user_id, recipe_id) {
        user_id -> Uuid,
        recipe_id -> Int4,
    }
}

diesel::table! {
    /// Subscription edges; a check constraint forbids self-follows.
    follows (follower_id, followed_id) {
        follower_id -> Uuid,
        followed_id -> Uuid,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));
diesel::joinable!(recipes -> users (author_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));
diesel::joinable!(favorite_recipes -> recipes (recipe_id));
diesel::joinable!(favorite_recipes -> users (user_id));
diesel::joinable!(shopping_carts -> recipes (recipe_id));
diesel::joinable!(shopping_carts -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    auth_tokens,
    tags,
    ingredients,
    recipes,
    recipe_tags,
    recipe_ingredients,
    favorite_recipes,
    shopping_carts,
    follows,
);
