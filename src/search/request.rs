//! Search request model and fluent builder

use crate::search::filter::{FilterOption, LogicOperator};
use crate::search::handlers::{FilterHandlerRegistry, SortHandlerRegistry};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How sort values are compared
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortType {
    #[default]
    String,
    Number,
    Date,
}

/// One ordering key; position in the request decides precedence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSort {
    pub field_name: String,
    pub sort_type: SortType,
    #[serde(default)]
    pub descending: bool,
}

impl SearchSort {
    pub fn new(field_name: impl Into<String>, sort_type: SortType, descending: bool) -> Self {
        Self {
            field_name: field_name.into(),
            sort_type,
            descending,
        }
    }
}

/// Everything the execution engine needs to run one query
///
/// Built per incoming query, handed to the engine once and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query, may be empty
    #[serde(default)]
    pub term: String,

    #[serde(default)]
    pub filters: Vec<FilterOption>,

    /// How the top-level filters combine
    #[serde(default)]
    pub filters_logic_operator: LogicOperator,

    #[serde(default)]
    pub sorts: Vec<SearchSort>,

    /// Zero-based page number
    #[serde(default)]
    pub page: usize,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Include unpublished content
    #[serde(default)]
    pub preview: bool,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new("")
    }
}

/// A request assembled from raw tokens, with the tokens no handler claimed
#[derive(Debug, Clone)]
pub struct CompiledRequest {
    pub request: SearchRequest,
    pub unrecognized_filters: Vec<String>,
    pub unrecognized_sorts: Vec<String>,
}

impl SearchRequest {
    /// Create a request for a free-text term
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            filters: Vec::new(),
            filters_logic_operator: LogicOperator::And,
            sorts: Vec::new(),
            page: 0,
            page_size: default_page_size(),
            preview: false,
        }
    }

    /// Parse filter and sort tokens into a request
    pub fn from_tokens<F, S>(
        term: impl Into<String>,
        filter_tokens: F,
        sort_tokens: S,
        filters: &FilterHandlerRegistry,
        sorts: &SortHandlerRegistry,
    ) -> CompiledRequest
    where
        F: IntoIterator,
        F::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let parsed_filters = filters.parse_all(filter_tokens);
        let parsed_sorts = sorts.parse_all(sort_tokens);

        let mut request = Self::new(term);
        request.filters = parsed_filters.filters;
        request.sorts = parsed_sorts.sorts;

        CompiledRequest {
            request,
            unrecognized_filters: parsed_filters.unrecognized,
            unrecognized_sorts: parsed_sorts.unrecognized,
        }
    }

    /// Append a top-level leaf filter
    pub fn create_filter(
        &mut self,
        field_name: impl Into<String>,
        values: Vec<String>,
        logic_operator: LogicOperator,
    ) -> &mut Self {
        let mut filter = FilterOption::is(field_name, values);
        filter.logic_operator = logic_operator;
        self.filters.push(filter);
        self
    }

    /// Append a filter built elsewhere, e.g. by a filter handler
    pub fn add_filter(&mut self, filter: FilterOption) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Append a sort; the same field may appear more than once
    pub fn sort_by(
        &mut self,
        field_name: impl Into<String>,
        sort_type: SortType,
        descending: bool,
    ) -> &mut Self {
        self.sorts
            .push(SearchSort::new(field_name, sort_type, descending));
        self
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_filters_logic_operator(mut self, logic_operator: LogicOperator) -> Self {
        self.filters_logic_operator = logic_operator;
        self
    }

    /// Number of results before the current page
    pub fn skip(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }

    /// Number of results on one page
    pub fn take(&self) -> usize {
        self.page_size
    }

    /// Set paging from a skip/take pair, as used by the HTTP API
    ///
    /// `skip` is rounded down to a whole page of `take` results.
    pub fn with_skip_take(self, skip: usize, take: usize) -> Self {
        let take = take.max(1);
        self.with_page(skip / take).with_page_size(take)
    }
}

fn default_page_size() -> usize {
    10
}
