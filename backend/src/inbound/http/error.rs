//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting Actix handlers
//! turn domain failures into consistent JSON responses and status codes.
//! Port errors convert into domain errors here so handlers can use `?`.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use tracing::error;

use crate::domain::ports::{
    FollowPersistenceError, IngredientPersistenceError, RecipeMarkError, RecipePersistenceError,
    TagPersistenceError, TokenPersistenceError, UserPersistenceError,
};
use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        Error::internal("Internal server error")
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

fn internal_from(err: impl std::fmt::Display) -> Error {
    error!(error = %err, "persistence failure surfaced to handler");
    Error::internal("Internal server error")
}

impl From<UserPersistenceError> for Error {
    fn from(err: UserPersistenceError) -> Self {
        match err {
            UserPersistenceError::DuplicateEmail => {
                Error::invalid_request("a user with this email already exists")
            }
            UserPersistenceError::DuplicateUsername => {
                Error::invalid_request("a user with this username already exists")
            }
            other => internal_from(other),
        }
    }
}

impl From<TokenPersistenceError> for Error {
    fn from(err: TokenPersistenceError) -> Self {
        internal_from(err)
    }
}

impl From<TagPersistenceError> for Error {
    fn from(err: TagPersistenceError) -> Self {
        internal_from(err)
    }
}

impl From<IngredientPersistenceError> for Error {
    fn from(err: IngredientPersistenceError) -> Self {
        internal_from(err)
    }
}

impl From<RecipePersistenceError> for Error {
    fn from(err: RecipePersistenceError) -> Self {
        internal_from(err)
    }
}

impl From<RecipeMarkError> for Error {
    fn from(err: RecipeMarkError) -> Self {
        match err {
            RecipeMarkError::AlreadyMarked => {
                Error::invalid_request("recipe was already added")
            }
            other => internal_from(other),
        }
    }
}

impl From<FollowPersistenceError> for Error {
    fn from(err: FollowPersistenceError) -> Self {
        match err {
            FollowPersistenceError::AlreadyFollowing => {
                Error::invalid_request("you are already subscribed to this author")
            }
            other => internal_from(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
    #[case(ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED)]
    #[case(ErrorCode::Forbidden, StatusCode::FORBIDDEN)]
    #[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
    #[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
    fn codes_map_to_expected_statuses(#[case] code: ErrorCode, #[case] status: StatusCode) {
        assert_eq!(status_for(code), status);
    }

    #[rstest]
    fn internal_errors_are_redacted_in_responses() {
        let err = Error::internal("pool exhausted on shard 7");
        let redacted = redact_if_internal(&err);
        assert_eq!(redacted.message(), "Internal server error");
    }

    #[rstest]
    fn duplicate_email_becomes_invalid_request() {
        let err: Error = UserPersistenceError::duplicate_email().into();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn query_failures_become_internal() {
        let err: Error = UserPersistenceError::query("boom").into();
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
