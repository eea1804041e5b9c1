//! Tag catalogue handlers.
//!
//! ```text
//! GET /api/tags       List all tags
//! GET /api/tags/{id}  Fetch one tag
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::tag::Tag;
use crate::domain::Error;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Tag payload returned by the catalogue endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
    /// Hex colour, e.g. `#49B64E`.
    pub color: String,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color.into(),
            slug: tag.slug.into(),
        }
    }
}

/// List every tag.
#[utoipa::path(
    get,
    path = "/api/tags",
    responses((status = 200, description = "All tags", body = [TagResponse])),
    tags = ["tags"],
    operation_id = "listTags"
)]
#[get("/tags")]
pub async fn list_tags(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<TagResponse>>> {
    let tags = state.tags.list().await?;
    Ok(web::Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// Fetch a single tag by id.
#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    params(("id" = i32, Path, description = "Tag identifier")),
    responses(
        (status = 200, description = "The tag", body = TagResponse),
        (status = 404, description = "No such tag", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "retrieveTag"
)]
#[get("/tags/{id}")]
pub async fn retrieve_tag(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<TagResponse>> {
    let tag = state
        .tags
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("tag does not exist"))?;
    Ok(web::Json(TagResponse::from(tag)))
}
