//! Regex driven filter grammar shared by the date filters

use super::strip_prefix_ignore_case;
use crate::search::error::{SearchError, SearchResult};
use crate::search::fields;
use crate::search::filter::{FilterOperation, FilterOption};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use uuid::Uuid;

const OPERATOR_GROUP: &str = "operator";
const VALUE_GROUP: &str = "value";

/// Whole match plus the two named groups
const EXPECTED_GROUPS: usize = 3;

static CREATE_DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| compile(r"(?s)^createDate(?P<operator>[><:!]{1,2})(?P<value>.*)$"));

static UPDATE_DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| compile(r"(?s)^updateDate(?P<operator>[><:!]{1,2})(?P<value>.*)$"));

fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("built-in filter pattern is valid")
}

/// Outcome of matching a token against a handler's pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorMatch {
    /// Both groups captured
    Parsed { operator: String, value: String },
    /// The token does not have the expected shape
    Unparseable,
}

/// Map an operator token to its operation
///
/// `":"` is, `":!"` is not, `">"`/`">:"` greater than (or equal), `"<"`/`"<:"`
/// less than (or equal). Anything else is unknown.
pub fn operation_for_token(token: &str) -> Option<FilterOperation> {
    match token {
        ":" => Some(FilterOperation::Is),
        ":!" => Some(FilterOperation::IsNot),
        ">" => Some(FilterOperation::GreaterThan),
        ">:" => Some(FilterOperation::GreaterThanOrEqual),
        "<" => Some(FilterOperation::LessThan),
        "<:" => Some(FilterOperation::LessThanOrEqual),
        _ => None,
    }
}

/// Filter handler whose grammar is `<prefix><operator><value>`
///
/// Tokens that carry the prefix but cannot be understood produce a filter on
/// this handler's field whose only value is a freshly generated UUID, so the
/// query matches nothing instead of everything. Range operators are passed
/// through without checking that the field is numeric or a date.
#[derive(Debug, Clone)]
pub struct RegexFilterHandler {
    name: String,
    prefix: String,
    field_name: String,
    pattern: Regex,
}

impl RegexFilterHandler {
    /// Create a handler from a pattern with `operator` and `value` groups
    ///
    /// The pattern is compiled case-insensitively.
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        field_name: impl Into<String>,
        pattern: &str,
    ) -> SearchResult<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| SearchError::InvalidPattern(e.to_string()))?;

        let names: Vec<&str> = pattern.capture_names().flatten().collect();
        for group in [OPERATOR_GROUP, VALUE_GROUP] {
            if !names.contains(&group) {
                return Err(SearchError::InvalidPattern(format!(
                    "pattern {} has no `{}` group",
                    pattern.as_str(),
                    group
                )));
            }
        }

        Ok(Self {
            name: name.into(),
            prefix: prefix.into(),
            field_name: field_name.into(),
            pattern,
        })
    }

    /// Handler for `createDate<op><value>` tokens
    pub fn create_date() -> Self {
        Self {
            name: "CreateDateFilter".to_string(),
            prefix: fields::CREATE_DATE.to_string(),
            field_name: fields::CREATE_DATE.to_string(),
            pattern: CREATE_DATE_PATTERN.clone(),
        }
    }

    /// Handler for `updateDate<op><value>` tokens
    pub fn update_date() -> Self {
        Self {
            name: "UpdateDateFilter".to_string(),
            prefix: fields::UPDATE_DATE.to_string(),
            field_name: fields::UPDATE_DATE.to_string(),
            pattern: UPDATE_DATE_PATTERN.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Case-insensitive prefix test
    pub fn can_handle(&self, query: &str) -> bool {
        strip_prefix_ignore_case(query, &self.prefix).is_some()
    }

    /// Match the token and extract the operator and value groups
    pub fn match_operator(&self, filter: &str) -> OperatorMatch {
        let Some(captures) = self.pattern.captures(filter) else {
            return OperatorMatch::Unparseable;
        };

        if captures.len() != EXPECTED_GROUPS {
            return OperatorMatch::Unparseable;
        }

        match (captures.name(OPERATOR_GROUP), captures.name(VALUE_GROUP)) {
            (Some(operator), Some(value)) => OperatorMatch::Parsed {
                operator: operator.as_str().to_string(),
                value: value.as_str().to_string(),
            },
            _ => OperatorMatch::Unparseable,
        }
    }

    pub fn build_filter_option(&self, filter: &str) -> FilterOption {
        let OperatorMatch::Parsed { operator, value } = self.match_operator(filter) else {
            return self.fail_closed();
        };

        match operation_for_token(&operator) {
            Some(operation) => FilterOption::new(self.field_name.clone(), operation, vec![value]),
            None => self.fail_closed(),
        }
    }

    fn fail_closed(&self) -> FilterOption {
        FilterOption::is(self.field_name.clone(), vec![Uuid::new_v4().to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_table() {
        let handler = RegexFilterHandler::create_date();
        let cases = [
            ("createDate:2020-01-01", FilterOperation::Is),
            ("createDate:!2020-01-01", FilterOperation::IsNot),
            ("createDate>2020-01-01", FilterOperation::GreaterThan),
            ("createDate>:2020-01-01", FilterOperation::GreaterThanOrEqual),
            ("createDate<2020-01-01", FilterOperation::LessThan),
            ("createDate<:2020-01-01", FilterOperation::LessThanOrEqual),
        ];

        for (token, expected) in cases {
            let option = handler.build_filter_option(token);
            assert_eq!(option.operator, expected, "token {}", token);
            assert_eq!(option.values, vec!["2020-01-01".to_string()]);
            assert_eq!(option.field_name, fields::CREATE_DATE);
        }
    }

    #[test]
    fn test_match_operator_variants() {
        let handler = RegexFilterHandler::update_date();

        assert_eq!(
            handler.match_operator("UPDATEDATE<:2021"),
            OperatorMatch::Parsed {
                operator: "<:".to_string(),
                value: "2021".to_string()
            }
        );
        assert_eq!(handler.match_operator("updateDate~2021"), OperatorMatch::Unparseable);
        assert_eq!(handler.match_operator("createDate:2021"), OperatorMatch::Unparseable);
    }

    #[test]
    fn test_value_spanning_lines_is_captured() {
        let option = RegexFilterHandler::create_date().build_filter_option("createDate:2020\n01");
        assert_eq!(option.operator, FilterOperation::Is);
        assert_eq!(option.values, vec!["2020\n01".to_string()]);
    }

    #[test]
    fn test_unknown_operator_token_fails_closed() {
        let handler = RegexFilterHandler::create_date();
        let option = handler.build_filter_option("createDate<<2020-01-01");

        assert_eq!(option.operator, FilterOperation::Is);
        assert_eq!(option.values.len(), 1);
        assert!(Uuid::parse_str(&option.values[0]).is_ok());
    }

    #[test]
    fn test_custom_pattern_requires_named_groups() {
        let missing = RegexFilterHandler::new("Bad", "size", "size", r"size(?P<op>[<>])(?P<value>\d+)");
        assert!(matches!(missing, Err(SearchError::InvalidPattern(_))));

        let invalid = RegexFilterHandler::new("Bad", "size", "size", r"size(");
        assert!(matches!(invalid, Err(SearchError::InvalidPattern(_))));

        let handler =
            RegexFilterHandler::new("Size", "size", "fileSize", r"^size(?P<operator>[><:!]{1,2})(?P<value>\d+)$")
                .unwrap();
        let option = handler.build_filter_option("size>1024");
        assert_eq!(option.field_name, "fileSize");
        assert_eq!(option.operator, FilterOperation::GreaterThan);
        assert_eq!(option.values, vec!["1024".to_string()]);
    }

    #[test]
    fn test_extra_capture_groups_fail_closed() {
        let handler = RegexFilterHandler::new(
            "Extra",
            "size",
            "fileSize",
            r"^size(?P<operator>[><:]{1,2})(?P<value>(\d+))$",
        )
        .unwrap();

        assert_eq!(handler.match_operator("size>10"), OperatorMatch::Unparseable);
    }
}
