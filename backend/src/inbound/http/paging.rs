//! Pagination glue between the `pagination` crate and HTTP handlers.

use actix_web::HttpRequest;
use pagination::{Page, PageParams, PageQuery, PaginationError};

use crate::domain::Error;

fn map_pagination_error(err: PaginationError) -> Error {
    match err {
        PaginationError::ZeroPage | PaginationError::InvalidLimit { .. } => {
            Error::invalid_request(err.to_string())
        }
        PaginationError::InvalidRequestUrl { .. } => Error::internal(err.to_string()),
    }
}

/// Validate raw page parameters, surfacing a 400 on bad input.
pub fn page_params(query: PageQuery) -> Result<PageParams, Error> {
    PageParams::validate(query).map_err(map_pagination_error)
}

/// Absolute URL of the incoming request, for `next`/`previous` links.
pub fn request_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!(
        "{}://{}{}",
        info.scheme(),
        info.host(),
        req.uri()
    )
}

/// Build the pagination envelope for one page of results.
pub fn envelope<T>(
    params: PageParams,
    req: &HttpRequest,
    count: u64,
    results: Vec<T>,
) -> Result<Page<T>, Error> {
    Page::new(params, &request_url(req), count, results).map_err(map_pagination_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    fn zero_limit_surfaces_as_invalid_request() {
        let result = page_params(PageQuery {
            page: None,
            limit: Some(0),
        });
        assert_eq!(
            result.expect_err("zero limit").code(),
            crate::domain::ErrorCode::InvalidRequest
        );
    }

    #[rstest]
    fn request_url_is_absolute() {
        let req = TestRequest::get()
            .uri("/api/recipes?page=2")
            .insert_header(("Host", "api.example.com"))
            .to_http_request();
        assert_eq!(
            request_url(&req),
            "http://api.example.com/api/recipes?page=2"
        );
    }
}
