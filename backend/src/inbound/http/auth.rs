//! Token authentication extractor.
//!
//! Clients present `Authorization: Token <key>`. The extractor digests the
//! key and resolves it through the token repository; handlers then call
//! [`RequestIdentity::require`] or [`RequestIdentity::optional`] depending
//! on whether the endpoint allows anonymous access.

use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::auth::token_digest;
use crate::domain::user::UserId;
use crate::domain::Error;
use crate::inbound::http::state::HttpState;

/// Header scheme prefix for token credentials.
const TOKEN_SCHEME: &str = "Token ";

/// The caller's identity, as far as the token header establishes one.
///
/// A missing, malformed, or revoked token yields an anonymous identity
/// rather than an immediate error; endpoints that require authentication
/// reject anonymous callers with 401 via [`RequestIdentity::require`].
#[derive(Debug, Clone, Copy)]
pub struct RequestIdentity {
    user_id: Option<UserId>,
}

impl RequestIdentity {
    /// The authenticated user, or a 401 error for anonymous callers.
    pub fn require(&self) -> Result<UserId, Error> {
        self.user_id
            .ok_or_else(|| Error::unauthorized("authentication credentials were not provided"))
    }

    /// The authenticated user, if any.
    pub fn optional(&self) -> Option<UserId> {
        self.user_id
    }
}

/// The raw token key presented on a request, if any. Logout needs the key
/// itself to revoke the stored digest.
pub(crate) fn token_key_from_request(req: &HttpRequest) -> Option<String> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let key = header.strip_prefix(TOKEN_SCHEME)?.trim();
    if key.is_empty() {
        return None;
    }
    Some(key.to_owned())
}

impl FromRequest for RequestIdentity {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let key = token_key_from_request(req);

        Box::pin(async move {
            let Some(state) = state else {
                return Err(Error::internal("http state is not configured"));
            };
            let Some(key) = key else {
                return Ok(Self { user_id: None });
            };
            let user_id = state.tokens.find_user_id(&token_digest(&key)).await?;
            Ok(Self { user_id })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    fn require_rejects_anonymous_identity() {
        let identity = RequestIdentity { user_id: None };
        assert!(identity.require().is_err());
        assert!(identity.optional().is_none());
    }

    #[rstest]
    #[case("Token abc123", Some("abc123"))]
    #[case("Token   abc123  ", Some("abc123"))]
    #[case("Bearer abc123", None)]
    #[case("Token ", None)]
    fn token_keys_are_parsed_from_the_header(
        #[case] header_value: &str,
        #[case] expected: Option<&str>,
    ) {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, header_value))
            .to_http_request();
        assert_eq!(token_key_from_request(&req).as_deref(), expected);
    }

    #[rstest]
    fn absent_header_yields_no_key() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(token_key_from_request(&req), None);
    }
}
