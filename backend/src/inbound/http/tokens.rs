//! Token login and logout handlers.
//!
//! ```text
//! POST /api/auth/token/login   Exchange email + password for a token
//! POST /api/auth/token/logout  Revoke the presented token
//! ```

use actix_web::{post, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::auth::{generate_token_key, token_digest, verify_password};
use crate::domain::Error;
use crate::inbound::http::auth::{token_key_from_request, RequestIdentity};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Login request body.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response carrying the client's token key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub auth_token: String,
}

fn bad_credentials() -> Error {
    Error::invalid_request("unable to log in with the provided credentials")
}

/// Exchange credentials for an authentication token.
#[utoipa::path(
    post,
    path = "/api/auth/token/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "tokenLogin"
)]
#[post("/auth/token/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let payload = payload.into_inner();

    let credentials = state
        .users
        .find_credentials_by_email(&payload.email)
        .await?
        .ok_or_else(bad_credentials)?;
    if !verify_password(
        &payload.password,
        &credentials.password_salt,
        &credentials.password_digest,
    ) {
        return Err(bad_credentials());
    }

    let key = generate_token_key();
    state
        .tokens
        .insert(credentials.user_id, &token_digest(&key))
        .await?;

    Ok(web::Json(TokenResponse { auth_token: key }))
}

/// Revoke the token presented on this request.
#[utoipa::path(
    post,
    path = "/api/auth/token/logout",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "tokenLogout"
)]
#[post("/auth/token/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    identity: RequestIdentity,
    request: HttpRequest,
) -> ApiResult<HttpResponse> {
    identity.require()?;
    // The identity resolved, so the header carries a live key.
    if let Some(key) = token_key_from_request(&request) {
        state.tokens.delete(&token_digest(&key)).await?;
    }
    Ok(HttpResponse::NoContent().finish())
}
