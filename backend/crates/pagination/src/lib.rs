//! Page-number pagination primitives shared by backend list endpoints.
//!
//! Endpoints accept `page` and `limit` query parameters and reply with an
//! envelope carrying the total row count plus absolute `next`/`previous`
//! links. The envelope shape is deliberately stable so every list endpoint
//! paginates the same way:
//!
//! ```json
//! {
//!   "count": 42,
//!   "next": "https://host/api/recipes?page=3&limit=10",
//!   "previous": "https://host/api/recipes?page=1&limit=10",
//!   "results": []
//! }
//! ```

use serde::{Deserialize, Serialize};
use url::Url;

/// Default number of items per page when `limit` is absent.
pub const DEFAULT_PAGE_SIZE: u32 = 6;
/// Upper bound for the caller-supplied `limit` parameter.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised while validating pagination input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// The `page` parameter is zero; pages are 1-based.
    #[error("page numbers start at 1")]
    ZeroPage,
    /// The `limit` parameter is zero or exceeds [`MAX_PAGE_SIZE`].
    #[error("limit must be between 1 and {max}")]
    InvalidLimit {
        /// Largest accepted page size.
        max: u32,
    },
    /// The request URL used for link building could not be parsed.
    #[error("request url is not absolute: {url}")]
    InvalidRequestUrl {
        /// The offending URL.
        url: String,
    },
}

/// Raw pagination query parameters as they arrive on the wire.
///
/// Both fields are optional; validation happens in [`PageParams::validate`]
/// so handlers can surface a domain error instead of a framework 400.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Requested page size.
    pub limit: Option<u32>,
}

/// Validated pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    page: u32,
    limit: u32,
}

impl PageParams {
    /// Validate raw query parameters, applying defaults.
    pub fn validate(query: PageQuery) -> Result<Self, PaginationError> {
        let page = query.page.unwrap_or(1);
        if page == 0 {
            return Err(PaginationError::ZeroPage);
        }
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(PaginationError::InvalidLimit { max: MAX_PAGE_SIZE });
        }
        Ok(Self { page, limit })
    }

    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Validated page size.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Row offset for the backing query.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Pagination envelope returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of rows across all pages.
    pub count: u64,
    /// Absolute URL of the next page, if any.
    pub next: Option<String>,
    /// Absolute URL of the previous page, if any.
    pub previous: Option<String>,
    /// Rows of the current page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build an envelope for one page of `results`.
    ///
    /// `request_url` must be the absolute URL of the incoming request; the
    /// `page` query parameter is rewritten (and `limit` pinned) to produce
    /// the neighbouring links.
    pub fn new(
        params: PageParams,
        request_url: &str,
        count: u64,
        results: Vec<T>,
    ) -> Result<Self, PaginationError> {
        let url = Url::parse(request_url).map_err(|_| PaginationError::InvalidRequestUrl {
            url: request_url.to_owned(),
        })?;

        let last_page = count.div_ceil(u64::from(params.limit())).max(1);
        let next = if u64::from(params.page()) < last_page {
            Some(link_for_page(&url, params, params.page() + 1))
        } else {
            None
        };
        let previous = if params.page() > 1 {
            Some(link_for_page(&url, params, params.page() - 1))
        } else {
            None
        };

        Ok(Self {
            count,
            next,
            previous,
            results,
        })
    }

    /// Map the page contents, preserving the envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

fn link_for_page(request_url: &Url, params: PageParams, page: u32) -> String {
    let mut url = request_url.clone();
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "page" && key != "limit")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (key, value) in &retained {
            query.append_pair(key, value);
        }
        query.append_pair("page", &page.to_string());
        query.append_pair("limit", &params.limit().to_string());
    }
    url.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_apply_when_query_is_empty() {
        let params = PageParams::validate(PageQuery::default()).expect("defaults are valid");
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(params.offset(), 0);
    }

    #[rstest]
    #[case(Some(0), None, PaginationError::ZeroPage)]
    #[case(None, Some(0), PaginationError::InvalidLimit { max: MAX_PAGE_SIZE })]
    #[case(None, Some(MAX_PAGE_SIZE + 1), PaginationError::InvalidLimit { max: MAX_PAGE_SIZE })]
    fn out_of_range_parameters_are_rejected(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected: PaginationError,
    ) {
        let result = PageParams::validate(PageQuery { page, limit });
        assert_eq!(result, Err(expected));
    }

    #[rstest]
    fn offset_advances_with_page_number() {
        let params = PageParams::validate(PageQuery {
            page: Some(3),
            limit: Some(10),
        })
        .expect("valid parameters");
        assert_eq!(params.offset(), 20);
    }

    #[rstest]
    fn middle_page_links_to_both_neighbours() {
        let params = PageParams::validate(PageQuery {
            page: Some(2),
            limit: Some(2),
        })
        .expect("valid parameters");
        let page = Page::new(params, "http://host/api/recipes?page=2&limit=2", 5, vec![1, 2])
            .expect("valid url");

        assert_eq!(page.count, 5);
        assert_eq!(
            page.next.as_deref(),
            Some("http://host/api/recipes?page=3&limit=2")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://host/api/recipes?page=1&limit=2")
        );
    }

    #[rstest]
    fn first_and_last_pages_omit_missing_links() {
        let params = PageParams::default();
        let page: Page<u8> =
            Page::new(params, "http://host/api/users", 3, vec![]).expect("valid url");
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }

    #[rstest]
    fn unrelated_query_parameters_survive_link_rewrites() {
        let params = PageParams::validate(PageQuery {
            page: Some(1),
            limit: Some(1),
        })
        .expect("valid parameters");
        let page = Page::new(
            params,
            "http://host/api/recipes?tags=breakfast&page=1&limit=1",
            2,
            vec![0],
        )
        .expect("valid url");
        assert_eq!(
            page.next.as_deref(),
            Some("http://host/api/recipes?tags=breakfast&page=2&limit=1")
        );
    }

    #[rstest]
    fn relative_urls_are_rejected() {
        let params = PageParams::default();
        let result: Result<Page<u8>, _> = Page::new(params, "/api/recipes", 0, vec![]);
        assert!(matches!(
            result,
            Err(PaginationError::InvalidRequestUrl { .. })
        ));
    }

    #[rstest]
    fn map_preserves_envelope_fields() {
        let params = PageParams::default();
        let page = Page::new(params, "http://host/api/tags", 2, vec![1, 2])
            .expect("valid url")
            .map(|n| n * 10);
        assert_eq!(page.results, vec![10, 20]);
        assert_eq!(page.count, 2);
    }
}
