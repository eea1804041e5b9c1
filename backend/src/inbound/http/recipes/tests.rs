//! Handler tests for publishing, listing, marking, and the shopping list.

use actix_web::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{json, Value};

use crate::inbound::http::test_utils::{auth_header, seed_user, seeded_state, test_app};

use super::{flag_is_set, tag_slugs_from_query};

fn recipe_payload(name: &str) -> Value {
    json!({
        "ingredients": [{ "id": 1, "amount": 200 }, { "id": 2, "amount": 100 }],
        "tags": [1],
        "image": "data:image/png;base64,iVBORw0KGgo=",
        "name": name,
        "text": "Mix everything and bake.",
        "cooking_time": 30
    })
}

async fn publish<S, B>(app: &S, key: &str, payload: Value) -> Value
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let request = actix_test::TestRequest::post()
        .uri("/api/recipes")
        .insert_header(auth_header(key))
        .set_json(payload)
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    actix_test::read_body_json(response).await
}

#[rstest]
#[case("", Vec::new())]
#[case("tags=breakfast", vec!["breakfast"])]
#[case("tags=breakfast&tags=dinner", vec!["breakfast", "dinner"])]
#[case("author=abc&tags=dinner&page=2", vec!["dinner"])]
fn tag_slugs_are_collected_from_the_query_string(
    #[case] query: &str,
    #[case] expected: Vec<&str>,
) {
    assert_eq!(tag_slugs_from_query(query), expected);
}

#[rstest]
#[case(Some("1"), true)]
#[case(Some("true"), true)]
#[case(Some("0"), false)]
#[case(Some("yes"), false)]
#[case(None, false)]
fn boolean_flags_accept_one_and_true(#[case] value: Option<&str>, #[case] expected: bool) {
    assert_eq!(flag_is_set(value), expected);
}

#[actix_web::test]
async fn create_recipe_returns_the_full_payload() {
    let fixtures = seeded_state();
    let (author, key) = seed_user(&fixtures, "ada@example.com", "ada").await;
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    let body = publish(&app, &key, recipe_payload("Pancakes")).await;
    assert_eq!(body["name"], "Pancakes");
    assert_eq!(body["author"]["username"], author.username.as_ref());
    assert_eq!(body["tags"][0]["slug"], "breakfast");
    assert_eq!(body["ingredients"][0]["name"], "flour");
    assert_eq!(body["ingredients"][0]["measurement_unit"], "g");
    assert_eq!(body["ingredients"][0]["amount"], 200);
    assert_eq!(body["is_favorited"], false);
    assert_eq!(body["is_in_shopping_cart"], false);
}

#[actix_web::test]
async fn create_recipe_requires_authentication() {
    let fixtures = seeded_state();
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/recipes")
        .set_json(recipe_payload("Pancakes"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_recipe_rejects_an_unknown_tag() {
    let fixtures = seeded_state();
    let (_, key) = seed_user(&fixtures, "ada@example.com", "ada").await;
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    let mut payload = recipe_payload("Pancakes");
    payload["tags"] = json!([99]);
    let request = actix_test::TestRequest::post()
        .uri("/api/recipes")
        .insert_header(auth_header(&key))
        .set_json(payload)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn create_recipe_reports_an_unknown_ingredient_as_missing() {
    let fixtures = seeded_state();
    let (_, key) = seed_user(&fixtures, "ada@example.com", "ada").await;
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    let mut payload = recipe_payload("Pancakes");
    payload["ingredients"] = json!([{ "id": 99, "amount": 10 }]);
    let request = actix_test::TestRequest::post()
        .uri("/api/recipes")
        .insert_header(auth_header(&key))
        .set_json(payload)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case::zero_cooking_time(json!({ "cooking_time": 0 }))]
#[case::duplicate_ingredients(json!({ "ingredients": [{ "id": 1, "amount": 1 }, { "id": 1, "amount": 2 }] }))]
#[case::zero_amount(json!({ "ingredients": [{ "id": 1, "amount": 0 }] }))]
#[case::no_tags(json!({ "tags": [] }))]
#[case::bad_image(json!({ "image": "not a data url" }))]
#[actix_web::test]
async fn create_recipe_rejects_invalid_drafts(#[case] overrides: Value) {
    let fixtures = seeded_state();
    let (_, key) = seed_user(&fixtures, "ada@example.com", "ada").await;
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    let mut payload = recipe_payload("Pancakes");
    for (field, value) in overrides.as_object().expect("override map") {
        payload[field] = value.clone();
    }
    let request = actix_test::TestRequest::post()
        .uri("/api/recipes")
        .insert_header(auth_header(&key))
        .set_json(payload)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn retrieve_recipe_reports_missing_recipes() {
    let fixtures = seeded_state();
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    let request = actix_test::TestRequest::get().uri("/api/recipes/42").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn list_recipes_is_newest_first_with_an_envelope() {
    let fixtures = seeded_state();
    let (_, key) = seed_user(&fixtures, "ada@example.com", "ada").await;
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    publish(&app, &key, recipe_payload("First")).await;
    publish(&app, &key, recipe_payload("Second")).await;

    let request = actix_test::TestRequest::get().uri("/api/recipes").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["count"], 2);
    let names: Vec<&str> = body["results"]
        .as_array()
        .expect("results")
        .iter()
        .map(|entry| entry["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[actix_web::test]
async fn list_recipes_filters_by_tag_slug() {
    let fixtures = seeded_state();
    let (_, key) = seed_user(&fixtures, "ada@example.com", "ada").await;
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    publish(&app, &key, recipe_payload("Porridge")).await;
    let mut dinner = recipe_payload("Stew");
    dinner["tags"] = json!([2]);
    publish(&app, &key, dinner).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/recipes?tags=dinner")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "Stew");
}

#[actix_web::test]
async fn list_recipes_filters_by_own_favorites() {
    let fixtures = seeded_state();
    let (_, key) = seed_user(&fixtures, "ada@example.com", "ada").await;
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    let kept = publish(&app, &key, recipe_payload("Kept")).await;
    publish(&app, &key, recipe_payload("Skipped")).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/recipes/{}/favorite", kept["id"]))
        .insert_header(auth_header(&key))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = actix_test::TestRequest::get()
        .uri("/api/recipes?is_favorited=1")
        .insert_header(auth_header(&key))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "Kept");
    assert_eq!(body["results"][0]["is_favorited"], true);
}

#[actix_web::test]
async fn update_by_someone_else_is_forbidden() {
    let fixtures = seeded_state();
    let (_, author_key) = seed_user(&fixtures, "ada@example.com", "ada").await;
    let (_, other_key) = seed_user(&fixtures, "grace@example.com", "grace").await;
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    let recipe = publish(&app, &author_key, recipe_payload("Pancakes")).await;

    let request = actix_test::TestRequest::patch()
        .uri(&format!("/api/recipes/{}", recipe["id"]))
        .insert_header(auth_header(&other_key))
        .set_json(recipe_payload("Hijacked"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn author_can_update_and_delete_their_recipe() {
    let fixtures = seeded_state();
    let (_, key) = seed_user(&fixtures, "ada@example.com", "ada").await;
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    let recipe = publish(&app, &key, recipe_payload("Pancakes")).await;
    let uri = format!("/api/recipes/{}", recipe["id"]);

    let mut updated = recipe_payload("Crepes");
    updated["cooking_time"] = json!(20);
    let request = actix_test::TestRequest::patch()
        .uri(&uri)
        .insert_header(auth_header(&key))
        .set_json(updated)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["name"], "Crepes");
    assert_eq!(body["cooking_time"], 20);

    let request = actix_test::TestRequest::delete()
        .uri(&uri)
        .insert_header(auth_header(&key))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = actix_test::TestRequest::get().uri(&uri).to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case::favorite("favorite")]
#[case::shopping_cart("shopping_cart")]
#[actix_web::test]
async fn mark_round_trip_rejects_duplicates_and_absent_removal(#[case] segment: &str) {
    let fixtures = seeded_state();
    let (_, key) = seed_user(&fixtures, "ada@example.com", "ada").await;
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    let recipe = publish(&app, &key, recipe_payload("Pancakes")).await;
    let uri = format!("/api/recipes/{}/{segment}", recipe["id"]);

    let request = actix_test::TestRequest::post()
        .uri(&uri)
        .insert_header(auth_header(&key))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["name"], "Pancakes");
    assert!(body.get("ingredients").is_none(), "short payload only");

    // Adding twice is a validation failure.
    let request = actix_test::TestRequest::post()
        .uri(&uri)
        .insert_header(auth_header(&key))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = actix_test::TestRequest::delete()
        .uri(&uri)
        .insert_header(auth_header(&key))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert!(body["status"].as_str().expect("status message").contains("removed"));

    // Removing a mark that is not set is a validation failure too.
    let request = actix_test::TestRequest::delete()
        .uri(&uri)
        .insert_header(auth_header(&key))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn marking_a_missing_recipe_is_not_found() {
    let fixtures = seeded_state();
    let (_, key) = seed_user(&fixtures, "ada@example.com", "ada").await;
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/recipes/42/favorite")
        .insert_header(auth_header(&key))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn shopping_cart_download_merges_shared_ingredients() {
    let fixtures = seeded_state();
    let (_, key) = seed_user(&fixtures, "ada@example.com", "ada").await;
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    // Both recipes use flour; the second adds milk.
    let pancakes = publish(&app, &key, recipe_payload("Pancakes")).await;
    let mut bread = recipe_payload("Bread");
    bread["ingredients"] = json!([{ "id": 1, "amount": 50 }, { "id": 3, "amount": 300 }]);
    let bread = publish(&app, &key, bread).await;

    for recipe in [&pancakes, &bread] {
        let request = actix_test::TestRequest::post()
            .uri(&format!("/api/recipes/{}/shopping_cart", recipe["id"]))
            .insert_header(auth_header(&key))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let request = actix_test::TestRequest::get()
        .uri("/api/recipes/download_shopping_cart")
        .insert_header(auth_header(&key))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .expect("content type");
    assert!(content_type.starts_with("text/plain"));
    let disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .expect("content disposition");
    assert!(disposition.contains("shopping_list.txt"));

    let body = actix_test::read_body(response).await;
    let document = std::str::from_utf8(&body).expect("utf-8 body");
    assert_eq!(
        document,
        "flour (g) - 250\nmilk (ml) - 300\nsugar (g) - 100"
    );
}

#[actix_web::test]
async fn downloading_an_empty_cart_fails() {
    let fixtures = seeded_state();
    let (_, key) = seed_user(&fixtures, "ada@example.com", "ada").await;
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/recipes/download_shopping_cart")
        .insert_header(auth_header(&key))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn download_requires_authentication() {
    let fixtures = seeded_state();
    let app = actix_test::init_service(test_app(fixtures.state.clone())).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/recipes/download_shopping_cart")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
