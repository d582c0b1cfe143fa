//! Filter and sort token grammars
//!
//! Each handler owns one grammar fragment. [`FilterHandlerRegistry`] tries its
//! handlers in a fixed order and hands the token to the first one that claims
//! it:
//!
//! | Token | Handler | Operator |
//! |---|---|---|
//! | `contentType:<alias>` / `contentType:!<alias>` | [`ContentTypeFilter`] | is / is not |
//! | `name:<value>` / `name:!<value>` | [`NameFilter`] | is / is not |
//! | `createDate<op><value>` | [`RegexFilterHandler::create_date`] | operator table |
//! | `updateDate<op><value>` | [`RegexFilterHandler::update_date`] | operator table |
//!
//! Handlers never fail. A token a handler claims but cannot understand becomes
//! a filter that matches nothing.

mod content_type;
mod name;
mod pattern;
mod sort;

pub use content_type::ContentTypeFilter;
pub use name::NameFilter;
pub use pattern::{operation_for_token, OperatorMatch, RegexFilterHandler};
pub use sort::{ParsedSorts, SortHandler, SortHandlerRegistry};

use crate::metrics::FILTER_TOKENS_TOTAL;
use crate::search::filter::FilterOption;

/// Strip `prefix` from the start of `input`, ignoring ASCII case
pub(crate) fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        input.get(prefix.len()..)
    } else {
        None
    }
}

/// One filter grammar
#[derive(Debug, Clone)]
pub enum FilterHandler {
    ContentType(ContentTypeFilter),
    Name(NameFilter),
    Regex(RegexFilterHandler),
}

impl FilterHandler {
    pub fn name(&self) -> &str {
        match self {
            FilterHandler::ContentType(_) => "ContentTypeFilter",
            FilterHandler::Name(_) => "NameFilter",
            FilterHandler::Regex(handler) => handler.name(),
        }
    }

    /// Whether this grammar claims the token; does not parse it
    pub fn can_handle(&self, query: &str) -> bool {
        match self {
            FilterHandler::ContentType(handler) => handler.can_handle(query),
            FilterHandler::Name(handler) => handler.can_handle(query),
            FilterHandler::Regex(handler) => handler.can_handle(query),
        }
    }

    /// Parse a token this handler claims
    pub fn build_filter_option(&self, filter: &str) -> FilterOption {
        match self {
            FilterHandler::ContentType(handler) => handler.build_filter_option(filter),
            FilterHandler::Name(handler) => handler.build_filter_option(filter),
            FilterHandler::Regex(handler) => handler.build_filter_option(filter),
        }
    }
}

impl From<RegexFilterHandler> for FilterHandler {
    fn from(handler: RegexFilterHandler) -> Self {
        FilterHandler::Regex(handler)
    }
}

/// Filters parsed from raw tokens
#[derive(Debug, Clone, Default)]
pub struct ParsedFilters {
    pub filters: Vec<FilterOption>,

    /// Tokens no handler claimed, in input order
    pub unrecognized: Vec<String>,
}

/// Ordered list of filter handlers
///
/// The default order is content type, name, create date, update date.
#[derive(Debug, Clone)]
pub struct FilterHandlerRegistry {
    handlers: Vec<FilterHandler>,
}

impl Default for FilterHandlerRegistry {
    fn default() -> Self {
        Self::new(vec![
            FilterHandler::ContentType(ContentTypeFilter),
            FilterHandler::Name(NameFilter),
            FilterHandler::Regex(RegexFilterHandler::create_date()),
            FilterHandler::Regex(RegexFilterHandler::update_date()),
        ])
    }
}

impl FilterHandlerRegistry {
    pub fn new(handlers: Vec<FilterHandler>) -> Self {
        Self { handlers }
    }

    /// Append a handler after the existing ones
    pub fn with_handler(mut self, handler: impl Into<FilterHandler>) -> Self {
        self.handlers.push(handler.into());
        self
    }

    pub fn handlers(&self) -> &[FilterHandler] {
        &self.handlers
    }

    /// First handler claiming the token
    pub fn find(&self, token: &str) -> Option<&FilterHandler> {
        self.handlers.iter().find(|handler| handler.can_handle(token))
    }

    pub fn parse(&self, token: &str) -> Option<FilterOption> {
        self.find(token)
            .map(|handler| handler.build_filter_option(token))
    }

    /// Parse tokens in order, keeping the ones no handler claims
    pub fn parse_all<I>(&self, tokens: I) -> ParsedFilters
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut parsed = ParsedFilters::default();

        for token in tokens {
            let token = token.as_ref();
            match self.find(token) {
                Some(handler) => {
                    tracing::trace!(token = %token, handler = handler.name(), "Parsing filter token");
                    FILTER_TOKENS_TOTAL.with_label_values(&["parsed"]).inc();
                    parsed.filters.push(handler.build_filter_option(token));
                }
                None => {
                    tracing::debug!(token = %token, "No filter handler claimed token");
                    FILTER_TOKENS_TOTAL.with_label_values(&["unrecognized"]).inc();
                    parsed.unrecognized.push(token.to_string());
                }
            }
        }

        parsed
    }
}

impl From<NameFilter> for FilterHandler {
    fn from(handler: NameFilter) -> Self {
        FilterHandler::Name(handler)
    }
}

impl From<ContentTypeFilter> for FilterHandler {
    fn from(handler: ContentTypeFilter) -> Self {
        FilterHandler::ContentType(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::fields;
    use crate::search::filter::FilterOperation;

    #[test]
    fn test_strip_prefix_ignore_case() {
        assert_eq!(strip_prefix_ignore_case("Name:foo", "name:"), Some("foo"));
        assert_eq!(strip_prefix_ignore_case("nam", "name:"), None);
        assert_eq!(strip_prefix_ignore_case("näme:", "name:"), None);
    }

    #[test]
    fn test_registry_order_and_dispatch() {
        let registry = FilterHandlerRegistry::default();
        let names: Vec<&str> = registry.handlers().iter().map(FilterHandler::name).collect();
        assert_eq!(
            names,
            vec!["ContentTypeFilter", "NameFilter", "CreateDateFilter", "UpdateDateFilter"]
        );

        assert_eq!(registry.find("updateDate<2020").map(FilterHandler::name), Some("UpdateDateFilter"));
        assert!(registry.find("level:2").is_none());
    }

    #[test]
    fn test_parse_all_reports_unrecognized() {
        let registry = FilterHandlerRegistry::default();
        let parsed = registry.parse_all(["contentType:article", "colour:red", "createDate>2020-01-01"]);

        assert_eq!(parsed.filters.len(), 2);
        assert_eq!(parsed.filters[0].field_name, fields::NODE_TYPE_ALIAS);
        assert_eq!(parsed.filters[1].operator, FilterOperation::GreaterThan);
        assert_eq!(parsed.unrecognized, vec!["colour:red".to_string()]);
    }
}
