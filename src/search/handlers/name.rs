//! `name:<value>` filter grammar

use super::strip_prefix_ignore_case;
use crate::search::fields;
use crate::search::filter::{FilterOperation, FilterOption};

const SPECIFIER: &str = "name:";

/// Filters on the node name
///
/// A blank value yields no values at all, which the engine reads as "no
/// constraint". `name:!<value>` negates; a bare `name:!` negates the empty
/// name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameFilter;

impl NameFilter {
    pub fn can_handle(&self, query: &str) -> bool {
        strip_prefix_ignore_case(query, SPECIFIER).is_some()
    }

    pub fn build_filter_option(&self, filter: &str) -> FilterOption {
        let value = strip_prefix_ignore_case(filter, SPECIFIER)
            .unwrap_or(filter)
            .trim();

        if value.is_empty() {
            return FilterOption::new(fields::NAME, FilterOperation::Is, Vec::new());
        }

        let (operator, value) = match value.strip_prefix('!') {
            Some(negated) => (FilterOperation::IsNot, negated.trim()),
            None => (FilterOperation::Is, value),
        };

        FilterOption::new(fields::NAME, operator, vec![value.to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_has_no_values() {
        for token in ["name:", "name:   ", "NAME:"] {
            let option = NameFilter.build_filter_option(token);
            assert_eq!(option.operator, FilterOperation::Is);
            assert!(option.values.is_empty(), "token {:?}", token);
        }
    }

    #[test]
    fn test_negated_name() {
        let option = NameFilter.build_filter_option("name:!foo");
        assert_eq!(option.field_name, fields::NAME);
        assert_eq!(option.operator, FilterOperation::IsNot);
        assert_eq!(option.values, vec!["foo".to_string()]);
    }

    #[test]
    fn test_value_is_trimmed() {
        let option = NameFilter.build_filter_option("name:  Home Page ");
        assert_eq!(option.operator, FilterOperation::Is);
        assert_eq!(option.values, vec!["Home Page".to_string()]);
    }

    #[test]
    fn test_bare_bang() {
        let option = NameFilter.build_filter_option("name:!");
        assert_eq!(option.operator, FilterOperation::IsNot);
        assert_eq!(option.values, vec![String::new()]);

        let option = NameFilter.build_filter_option("name: ! ");
        assert_eq!(option.operator, FilterOperation::IsNot);
        assert_eq!(option.values, vec![String::new()]);
    }
}
