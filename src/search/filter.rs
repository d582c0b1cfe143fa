//! Engine-agnostic filter clauses

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Comparison applied between a field and the filter values
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterOperation {
    #[default]
    Is,
    IsNot,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl FilterOperation {
    /// Whether this operation orders values rather than testing equality
    pub fn is_range(&self) -> bool {
        !matches!(self, FilterOperation::Is | FilterOperation::IsNot)
    }
}

/// Boolean combinator between sibling filters
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogicOperator {
    #[default]
    And,
    Or,
}

/// One filter clause, optionally grouping nested clauses
///
/// A clause with a non-empty `sub_filters` list is a grouping node. Execution
/// engines evaluate only the sub-tree of a grouping node, combined with its
/// `logic_operator`; the node's own field, operator and values are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterOption {
    pub field_name: String,

    /// Values compared against the field; empty means "no constraint"
    #[serde(default)]
    pub values: Vec<String>,

    #[serde(default)]
    pub operator: FilterOperation,

    #[serde(default)]
    pub sub_filters: Vec<FilterOption>,

    /// How `sub_filters` combine
    #[serde(default)]
    pub logic_operator: LogicOperator,
}

impl FilterOption {
    /// Create a leaf filter
    pub fn new(
        field_name: impl Into<String>,
        operator: FilterOperation,
        values: Vec<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            values,
            operator,
            sub_filters: Vec::new(),
            logic_operator: LogicOperator::And,
        }
    }

    /// Create an `Is` leaf filter over the given values
    pub fn is(field_name: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(field_name, FilterOperation::Is, values)
    }

    /// Create an empty grouping node whose children combine with `logic_operator`
    pub fn group(logic_operator: LogicOperator) -> Self {
        Self {
            logic_operator,
            ..Default::default()
        }
    }

    /// Set the operator
    pub fn with_operator(mut self, operator: FilterOperation) -> Self {
        self.operator = operator;
        self
    }

    /// Set how the sub-filters combine
    pub fn with_logic_operator(mut self, logic_operator: LogicOperator) -> Self {
        self.logic_operator = logic_operator;
        self
    }

    /// Append a nested leaf filter and return the parent for chaining
    pub fn create_sub_filter(
        &mut self,
        field_name: impl Into<String>,
        values: Vec<String>,
        logic_operator: LogicOperator,
    ) -> &mut Self {
        let mut child = Self::is(field_name, values);
        child.logic_operator = logic_operator;
        self.sub_filters.push(child);
        self
    }

    /// Append an already built filter under this one
    pub fn add_sub_filter(&mut self, filter: FilterOption) -> &mut Self {
        self.sub_filters.push(filter);
        self
    }

    /// Whether this clause groups a non-empty sub-tree
    pub fn is_group(&self) -> bool {
        !self.sub_filters.is_empty()
    }

    /// Maximum nesting depth below and including this clause
    pub fn depth(&self) -> usize {
        1 + self
            .sub_filters
            .iter()
            .map(FilterOption::depth)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_filter_chaining_returns_parent() {
        let mut parent = FilterOption::group(LogicOperator::Or);
        parent
            .create_sub_filter("a", vec!["1".into()], LogicOperator::And)
            .create_sub_filter("b", vec!["2".into()], LogicOperator::And);

        assert!(parent.is_group());
        assert_eq!(parent.sub_filters.len(), 2);
        assert_eq!(parent.sub_filters[0].field_name, "a");
        assert_eq!(parent.sub_filters[1].field_name, "b");
        assert_eq!(parent.depth(), 2);
    }

    #[test]
    fn test_nesting_is_unbounded() {
        let mut root = FilterOption::group(LogicOperator::And);
        let mut cursor = &mut root;
        for i in 0..16 {
            cursor.create_sub_filter(format!("f{}", i), vec![], LogicOperator::And);
            cursor = &mut cursor.sub_filters[0];
        }

        assert_eq!(root.depth(), 17);
    }

    #[test]
    fn test_operation_strings() {
        assert_eq!(FilterOperation::GreaterThanOrEqual.to_string(), "greater_than_or_equal");
        assert_eq!("is_not".parse::<FilterOperation>().unwrap(), FilterOperation::IsNot);
        assert!(FilterOperation::LessThan.is_range());
        assert!(!FilterOperation::IsNot.is_range());
    }
}
