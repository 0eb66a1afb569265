//! This modules defines the common functionality for paging data.

use axum::http::Uri;
use serde::Serialize;

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl PaginationConfig {
    /// Resolve the `page` and `page_size` query parameters against the config.
    ///
    /// Page sizes are clamped to `1..=max_page_size`.
    ///
    /// # Errors
    /// Returns [Error::InvalidPage] if `page` is zero.
    pub fn page_request(
        &self,
        page: Option<u64>,
        page_size: Option<u64>,
    ) -> Result<PageRequest, Error> {
        let page = page.unwrap_or(self.default_page);

        if page == 0 {
            return Err(Error::InvalidPage);
        }

        let page_size = page_size
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1));

        Ok(PageRequest { page, page_size })
    }
}

/// A validated request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The 1-based page number.
    pub page: u64,
    /// The maximum number of items on the page.
    pub page_size: u64,
}

impl PageRequest {
    /// The number of rows to skip, for SQL `OFFSET`.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    /// The number of rows to return, for SQL `LIMIT`.
    pub fn limit(&self) -> u64 {
        self.page_size
    }

    /// Check that the page exists given the total number of items.
    ///
    /// The first page always exists, even when there are no items.
    ///
    /// # Errors
    /// Returns [Error::InvalidPage] if the page is past the last page.
    pub fn check_in_range(&self, count: u64) -> Result<(), Error> {
        let page_count = count.div_ceil(self.page_size).max(1);

        if self.page > page_count {
            Err(Error::InvalidPage)
        } else {
            Ok(())
        }
    }
}

/// One page of results along with links to the neighbouring pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// The total number of items across all pages.
    pub count: u64,
    /// The link to the next page, if there is one.
    pub next: Option<String>,
    /// The link to the previous page, if there is one.
    pub previous: Option<String>,
    /// The items on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap `results` in a page, building the links from the request `uri`.
    ///
    /// Links keep every query parameter of the request except `page`.
    pub fn new(results: Vec<T>, count: u64, request: PageRequest, uri: &Uri) -> Self {
        let next = (request.page * request.page_size < count)
            .then(|| page_link(uri, Some(request.page + 1)));

        let previous = match request.page {
            1 => None,
            2 => Some(page_link(uri, None)),
            page => Some(page_link(uri, Some(page - 1))),
        };

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

fn page_link(uri: &Uri, page: Option<u64>) -> String {
    let mut params: Vec<(String, String)> =
        serde_urlencoded::from_str(uri.query().unwrap_or_default()).unwrap_or_default();
    params.retain(|(key, _)| key != "page");

    if let Some(page) = page {
        params.push(("page".to_owned(), page.to_string()));
    }

    let query = serde_urlencoded::to_string(&params).unwrap_or_default();

    if query.is_empty() {
        uri.path().to_owned()
    } else {
        format!("{}?{}", uri.path(), query)
    }
}
