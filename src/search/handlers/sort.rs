//! `<alias>:<asc|desc>` sort grammar

use super::strip_prefix_ignore_case;
use crate::search::fields;
use crate::search::request::{SearchSort, SortType};

/// Maps one sort alias to an index field and comparison type
#[derive(Debug, Clone)]
pub struct SortHandler {
    alias: String,
    field_name: String,
    sort_type: SortType,
}

impl SortHandler {
    pub fn new(alias: impl Into<String>, field_name: impl Into<String>, sort_type: SortType) -> Self {
        Self {
            alias: alias.into(),
            field_name: field_name.into(),
            sort_type,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    fn direction<'a>(&self, token: &'a str) -> Option<&'a str> {
        strip_prefix_ignore_case(token, &self.alias)?.strip_prefix(':')
    }

    pub fn can_handle(&self, token: &str) -> bool {
        self.direction(token).is_some()
    }

    /// Build the sort; anything but `desc` sorts ascending
    pub fn build_sort(&self, token: &str) -> SearchSort {
        let descending = self
            .direction(token)
            .map(|direction| direction.trim().eq_ignore_ascii_case("desc"))
            .unwrap_or(false);

        SearchSort::new(self.field_name.clone(), self.sort_type, descending)
    }
}

/// Sorts parsed from raw tokens
#[derive(Debug, Clone, Default)]
pub struct ParsedSorts {
    pub sorts: Vec<SearchSort>,
    pub unrecognized: Vec<String>,
}

/// Ordered set of sort handlers
#[derive(Debug, Clone)]
pub struct SortHandlerRegistry {
    handlers: Vec<SortHandler>,
}

impl Default for SortHandlerRegistry {
    fn default() -> Self {
        Self::new(vec![
            SortHandler::new(fields::NAME, fields::NAME, SortType::String),
            SortHandler::new(fields::CREATE_DATE, fields::CREATE_DATE, SortType::Date),
            SortHandler::new(fields::UPDATE_DATE, fields::UPDATE_DATE, SortType::Date),
            SortHandler::new(fields::SORT_ORDER, fields::SORT_ORDER, SortType::Number),
            SortHandler::new(fields::LEVEL, fields::LEVEL, SortType::Number),
        ])
    }
}

impl SortHandlerRegistry {
    pub fn new(handlers: Vec<SortHandler>) -> Self {
        Self { handlers }
    }

    pub fn with_handler(mut self, handler: SortHandler) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn parse(&self, token: &str) -> Option<SearchSort> {
        self.handlers
            .iter()
            .find(|handler| handler.can_handle(token))
            .map(|handler| handler.build_sort(token))
    }

    /// Parse tokens in order, keeping the ones no handler claims
    pub fn parse_all<I>(&self, tokens: I) -> ParsedSorts
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut parsed = ParsedSorts::default();

        for token in tokens {
            let token = token.as_ref();
            match self.parse(token) {
                Some(sort) => parsed.sorts.push(sort),
                None => {
                    tracing::debug!(token = %token, "No sort handler claimed token");
                    parsed.unrecognized.push(token.to_string());
                }
            }
        }

        parsed
    }
}
