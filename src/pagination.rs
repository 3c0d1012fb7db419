//! This modules defines the common functionality for paging data.

use serde::{Deserialize, Serialize};

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a client may request, larger requests are capped to this value.
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

/// A validated request for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The 1-based page number.
    pub page: u64,
    /// The maximum number of items on the page.
    pub per_page: u64,
}

impl PageRequest {
    /// Resolve the raw `page` and `perPage` query parameters against `config`.
    ///
    /// Missing parameters fall back to the config defaults and page sizes
    /// larger than [PaginationConfig::max_page_size] are capped.
    ///
    /// # Errors
    /// Returns [Error::InvalidPagination] if either parameter is not a
    /// positive integer.
    pub fn from_query(
        page: Option<&str>,
        per_page: Option<&str>,
        config: &PaginationConfig,
    ) -> Result<Self, Error> {
        let page = match page {
            Some(text) => parse_positive("page", text)?,
            None => config.default_page,
        };
        let per_page = match per_page {
            Some(text) => parse_positive("perPage", text)?,
            None => config.default_page_size,
        };

        Ok(Self {
            page,
            per_page: per_page.min(config.max_page_size),
        })
    }

    /// The number of rows to skip before this page starts.
    pub fn offset(self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

fn parse_positive(name: &str, text: &str) -> Result<u64, Error> {
    match text.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(Error::InvalidPagination(format!(
            "{name} must be a positive integer, got \"{text}\""
        ))),
    }
}

/// The pagination details sent alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// The 1-based page number.
    pub page: u64,
    /// The requested page size.
    pub per_page: u64,
    /// The number of items matching the filter across all pages.
    pub total: u64,
}
