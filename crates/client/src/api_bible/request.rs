//! API.Bible search request types and validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Upper bound API.Bible accepts for `limit`.
pub const MAX_LIMIT: u32 = 100;

/// Search request parameters for the API.Bible search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    /// Free-text query.
    pub query: String,

    /// Number of verses (1-100, default 20).
    pub limit: u32,

    /// Result offset (default 0).
    pub offset: u32,

    /// Result ordering (default canonical).
    pub sort: SearchSort,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self { query: String::new(), limit: 20, offset: 0, sort: SearchSort::Canonical }
    }
}

/// Result ordering supported by API.Bible.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SearchSort {
    #[default]
    Canonical,
    Relevance,
    ReverseCanonical,
}

impl SearchSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSort::Canonical => "canonical",
            SearchSort::Relevance => "relevance",
            SearchSort::ReverseCanonical => "reverse-canonical",
        }
    }
}

impl fmt::Display for SearchSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SearchSort {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "canonical" => Ok(SearchSort::Canonical),
            "relevance" => Ok(SearchSort::Relevance),
            "reverse-canonical" => Ok(SearchSort::ReverseCanonical),
            other => Err(ApiError::InvalidRequest(format!("unknown sort mode: {other}"))),
        }
    }
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Default::default() }
    }

    /// Key under which the result set is stored in the search cache.
    ///
    /// The raw query is used as-is, so `"love"` and `" love"` are distinct
    /// entries.
    pub fn cache_key(&self) -> String {
        format!("{}:{}:{}:{}", self.query, self.limit, self.offset, self.sort)
    }

    /// True when the query has no searchable content.
    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }

    /// Validate the request parameters.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.is_blank() {
            return Err(ApiError::InvalidRequest("query cannot be empty".to_string()));
        }

        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(ApiError::InvalidRequest(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {}",
                self.limit
            )));
        }

        Ok(())
    }
}
