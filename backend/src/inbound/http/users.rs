//! User account and subscription HTTP handlers.
//!
//! ```text
//! POST /api/users                 Register a new account
//! GET  /api/users                 List users (paginated)
//! GET  /api/users/me              Authenticated user's own profile
//! GET  /api/users/{id}            Another user's profile
//! GET  /api/users/subscriptions   Followed authors with their recipes
//! POST /api/users/{id}/subscribe  Follow an author
//! DELETE /api/users/{id}/subscribe Unfollow an author
//! ```

use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use pagination::{Page, PageQuery};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::auth::{generate_salt, password_digest};
use crate::domain::ports::NewUserRecord;
use crate::domain::user::{Registration, User, UserId};
use crate::domain::Error;
use crate::inbound::http::auth::RequestIdentity;
use crate::inbound::http::paging::{envelope, page_params};
use crate::inbound::http::recipes::ShortRecipeResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Registration request body.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Registration response body; never echoes the password.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Public user profile as seen by the requesting user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserResponse {
    pub(crate) fn from_user(user: User, is_subscribed: bool) -> Self {
        Self {
            email: user.email.into(),
            id: *user.id.as_uuid(),
            username: user.username.into(),
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// Followed author with a preview of their recipes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<ShortRecipeResponse>,
    pub recipes_count: u64,
}

/// Optional cap on recipes embedded in subscription entries.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RecipesLimitQuery {
    pub recipes_limit: Option<u32>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn validation_error(err: crate::domain::user::UserValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

/// Register a new user account.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let registration = Registration::try_from_parts(
        &payload.email,
        &payload.username,
        &payload.first_name,
        &payload.last_name,
        &payload.password,
    )
    .map_err(validation_error)?;

    let salt = generate_salt();
    let digest = password_digest(&registration.password, &salt);
    let user = User {
        id: UserId::random(),
        email: registration.email,
        username: registration.username,
        first_name: registration.first_name,
        last_name: registration.last_name,
    };

    state
        .users
        .create(&NewUserRecord {
            user: user.clone(),
            password_digest: digest,
            password_salt: salt,
        })
        .await?;

    Ok(HttpResponse::Created().json(SignupResponse {
        email: user.email.into(),
        id: *user.id.as_uuid(),
        username: user.username.into(),
        first_name: user.first_name,
        last_name: user.last_name,
    }))
}

/// Flag each user with whether the viewer subscribes to them.
async fn subscription_flags(
    state: &HttpState,
    viewer: Option<UserId>,
    users: &[User],
) -> ApiResult<Vec<bool>> {
    let Some(viewer) = viewer else {
        return Ok(vec![false; users.len()]);
    };
    let ids: Vec<UserId> = users.iter().map(|user| user.id).collect();
    let followed = state.follows.followed_ids(viewer, &ids).await?;
    Ok(users
        .iter()
        .map(|user| followed.contains(&user.id))
        .collect())
}

/// List registered users.
#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "One page of users"),
        (status = 400, description = "Invalid pagination parameters", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    request: HttpRequest,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<UserResponse>>> {
    let params = page_params(query.into_inner())?;
    let (users, count) = state
        .users
        .list(params.offset(), i64::from(params.limit()))
        .await?;

    let flags = subscription_flags(&state, identity.optional(), &users).await?;
    let results = users
        .into_iter()
        .zip(flags)
        .map(|(user, is_subscribed)| UserResponse::from_user(user, is_subscribed))
        .collect();

    Ok(web::Json(envelope(params, &request, count, results)?))
}

/// The authenticated user's own profile.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Own profile", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
) -> ApiResult<web::Json<UserResponse>> {
    let user_id = identity.require()?;
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
    Ok(web::Json(UserResponse::from_user(user, false)))
}

/// Authors the user subscribes to, each with a recipe preview.
#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size"),
        ("recipes_limit" = Option<u32>, Query, description = "Cap on embedded recipes per author")
    ),
    responses(
        (status = 200, description = "One page of followed authors"),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "listSubscriptions"
)]
#[get("/users/subscriptions")]
pub async fn list_subscriptions(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    request: HttpRequest,
    query: web::Query<RecipesLimitQuery>,
) -> ApiResult<web::Json<Page<SubscriptionResponse>>> {
    let user_id = identity.require()?;
    let query = query.into_inner();
    let params = page_params(PageQuery {
        page: query.page,
        limit: query.limit,
    })?;

    let (authors, count) = state
        .follows
        .followed_authors(user_id, params.offset(), i64::from(params.limit()))
        .await?;

    let mut results = Vec::with_capacity(authors.len());
    for author in authors {
        results.push(subscription_entry(&state, author, true, query.recipes_limit).await?);
    }

    Ok(web::Json(envelope(params, &request, count, results)?))
}

/// Build one subscription entry with the author's recipe preview.
async fn subscription_entry(
    state: &HttpState,
    author: User,
    is_subscribed: bool,
    recipes_limit: Option<u32>,
) -> ApiResult<SubscriptionResponse> {
    let author_id = author.id;
    let recipes = state
        .recipes
        .list_by_author(author_id, recipes_limit.map(i64::from))
        .await?;
    let recipes_count = state.recipes.count_by_author(author_id).await?;
    Ok(SubscriptionResponse {
        user: UserResponse::from_user(author, is_subscribed),
        recipes: recipes
            .into_iter()
            .map(ShortRecipeResponse::from_view)
            .collect(),
        recipes_count,
    })
}

/// Another user's public profile.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "No such user", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "retrieveUser"
)]
#[get("/users/{id}")]
pub async fn retrieve_user(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<UserResponse>> {
    let target = UserId::from_uuid(path.into_inner());
    let user = state
        .users
        .find_by_id(target)
        .await?
        .ok_or_else(|| Error::not_found("user does not exist"))?;
    // Profiles are readable anonymously; the flag is viewer-dependent.
    let is_subscribed = match identity.optional() {
        Some(viewer) => state.follows.exists(viewer, target).await?,
        None => false,
    };
    Ok(web::Json(UserResponse::from_user(user, is_subscribed)))
}

/// Subscribe to an author.
#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    params(
        ("id" = Uuid, Path, description = "Author identifier"),
        ("recipes_limit" = Option<u32>, Query, description = "Cap on embedded recipes")
    ),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionResponse),
        (status = 400, description = "Already subscribed or self-subscription", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such user", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "subscribe"
)]
#[post("/users/{id}/subscribe")]
pub async fn subscribe(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    path: web::Path<Uuid>,
    query: web::Query<RecipesLimitQuery>,
) -> ApiResult<HttpResponse> {
    let follower = identity.require()?;
    let followed = UserId::from_uuid(path.into_inner());

    let author = state
        .users
        .find_by_id(followed)
        .await?
        .ok_or_else(|| Error::not_found("user does not exist"))?;
    if follower == followed {
        return Err(Error::invalid_request("you cannot subscribe to yourself")
            .with_details(json!({ "field": "id" })));
    }

    state.follows.create(follower, followed).await?;

    let entry = subscription_entry(&state, author, true, query.recipes_limit).await?;
    Ok(HttpResponse::Created().json(entry))
}

/// Unsubscribe from an author.
#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    params(("id" = Uuid, Path, description = "Author identifier")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such user or no such subscription", body = ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "unsubscribe"
)]
#[delete("/users/{id}/subscribe")]
pub async fn unsubscribe(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let follower = identity.require()?;
    let followed = UserId::from_uuid(path.into_inner());

    state
        .users
        .find_by_id(followed)
        .await?
        .ok_or_else(|| Error::not_found("user does not exist"))?;

    // A missing edge is a missing resource, unlike the mark removals.
    if !state.follows.delete(follower, followed).await? {
        return Err(Error::not_found("you are not subscribed to this author"));
    }
    Ok(HttpResponse::NoContent().finish())
}
