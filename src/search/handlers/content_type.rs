//! `contentType:<alias>` filter grammar

use super::strip_prefix_ignore_case;
use crate::search::fields;
use crate::search::filter::{FilterOperation, FilterOption};

const SPECIFIER: &str = "contentType:";

/// Filters on the content type alias, `contentType:!<alias>` negates
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentTypeFilter;

impl ContentTypeFilter {
    pub fn can_handle(&self, query: &str) -> bool {
        strip_prefix_ignore_case(query, SPECIFIER).is_some()
    }

    pub fn build_filter_option(&self, filter: &str) -> FilterOption {
        let alias = strip_prefix_ignore_case(filter, SPECIFIER).unwrap_or(filter);

        let (operator, alias) = match alias.strip_prefix('!') {
            Some(negated) => (FilterOperation::IsNot, negated),
            None => (FilterOperation::Is, alias),
        };

        FilterOption::new(fields::NODE_TYPE_ALIAS, operator, vec![alias.to_string()])
    }
}
