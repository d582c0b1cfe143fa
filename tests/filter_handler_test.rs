//! Tests for filter token parsing

use content_index_manager::search::fields::{CREATE_DATE, NAME, NODE_TYPE_ALIAS, UPDATE_DATE};
use content_index_manager::search::*;
use uuid::Uuid;

fn assert_fail_closed(filter: &FilterOption, field_name: &str) {
    assert_eq!(filter.field_name, field_name);
    assert_eq!(filter.operator, FilterOperation::Is);
    assert_eq!(filter.values.len(), 1, "fail-closed filter carries one value");
    assert!(
        Uuid::parse_str(&filter.values[0]).is_ok(),
        "fail-closed value should be a generated id, got {}",
        filter.values[0]
    );
    assert!(filter.sub_filters.is_empty());
}

#[test]
fn test_content_type_negation() {
    let filter = ContentTypeFilter.build_filter_option("contentType:!article");

    assert_eq!(filter.field_name, NODE_TYPE_ALIAS);
    assert_eq!(filter.operator, FilterOperation::IsNot);
    assert_eq!(filter.values, vec!["article".to_string()]);
}

#[test]
fn test_content_type_plain_and_case_insensitive_prefix() {
    let handler = ContentTypeFilter;
    assert!(handler.can_handle("CONTENTTYPE:blogPost"));
    assert!(!handler.can_handle("type:blogPost"));

    let filter = handler.build_filter_option("ContentType:blogPost");
    assert_eq!(filter.operator, FilterOperation::Is);
    assert_eq!(filter.values, vec!["blogPost".to_string()]);
}

#[test]
fn test_name_blank_value_is_no_constraint() {
    let filter = NameFilter.build_filter_option("name:");

    assert_eq!(filter.field_name, NAME);
    assert_eq!(filter.operator, FilterOperation::Is);
    assert!(filter.values.is_empty());

    let filter = NameFilter.build_filter_option("name:   ");
    assert!(filter.values.is_empty());
}

#[test]
fn test_name_negation_strips_bang() {
    let filter = NameFilter.build_filter_option("name:!foo");

    assert_eq!(filter.operator, FilterOperation::IsNot);
    assert_eq!(filter.values, vec!["foo".to_string()]);
}

#[test]
fn test_name_bare_negation_keeps_empty_value() {
    let filter = NameFilter.build_filter_option("name:!");

    assert_eq!(filter.operator, FilterOperation::IsNot);
    assert_eq!(filter.values, vec![String::new()]);
}

#[test]
fn test_name_value_is_trimmed() {
    let filter = NameFilter.build_filter_option("name:  Release notes ");
    assert_eq!(filter.values, vec!["Release notes".to_string()]);
}

#[test]
fn test_create_date_greater_than_or_equal() {
    let filter = RegexFilterHandler::create_date().build_filter_option("createDate>:2020-01-01");

    assert_eq!(filter.field_name, CREATE_DATE);
    assert_eq!(filter.operator, FilterOperation::GreaterThanOrEqual);
    assert_eq!(filter.values, vec!["2020-01-01".to_string()]);
}

#[test]
fn test_every_operator_token() {
    let handler = RegexFilterHandler::update_date();
    let cases = [
        ("updateDate:2021-05-01", FilterOperation::Is),
        ("updateDate:!2021-05-01", FilterOperation::IsNot),
        ("updateDate>2021-05-01", FilterOperation::GreaterThan),
        ("updateDate>:2021-05-01", FilterOperation::GreaterThanOrEqual),
        ("updateDate<2021-05-01", FilterOperation::LessThan),
        ("updateDate<:2021-05-01", FilterOperation::LessThanOrEqual),
    ];

    for (token, expected) in cases {
        let filter = handler.build_filter_option(token);
        assert_eq!(filter.field_name, UPDATE_DATE, "{}", token);
        assert_eq!(filter.operator, expected, "{}", token);
        assert_eq!(filter.values, vec!["2021-05-01".to_string()], "{}", token);
    }
}

#[test]
fn test_captured_value_is_verbatim() {
    let filter = RegexFilterHandler::create_date().build_filter_option("createDate: 2020-01-01 ");
    assert_eq!(filter.values, vec![" 2020-01-01 ".to_string()]);
}

#[test]
fn test_multiline_value_is_verbatim() {
    let filter = RegexFilterHandler::update_date().build_filter_option("updateDate>:2020\n01");

    assert_eq!(filter.operator, FilterOperation::GreaterThanOrEqual);
    assert_eq!(filter.values, vec!["2020\n01".to_string()]);
}

#[test]
fn test_unknown_operator_fails_closed() {
    let handler = RegexFilterHandler::create_date();
    assert!(handler.can_handle("createDate~2020-01-01"));

    let filter = handler.build_filter_option("createDate~2020-01-01");
    assert_fail_closed(&filter, CREATE_DATE);
}

#[test]
fn test_operator_outside_table_fails_closed() {
    // Matches the pattern shape, but "><" is not a known operator
    let filter = RegexFilterHandler::create_date().build_filter_option("createDate><2020-01-01");
    assert_fail_closed(&filter, CREATE_DATE);

    let filter = RegexFilterHandler::create_date().build_filter_option("createDate!2020-01-01");
    assert_fail_closed(&filter, CREATE_DATE);
}

#[test]
fn test_fail_closed_is_not_idempotent() {
    let handler = RegexFilterHandler::create_date();

    let first = handler.build_filter_option("createDate~2020-01-01");
    let second = handler.build_filter_option("createDate~2020-01-01");

    assert_fail_closed(&first, CREATE_DATE);
    assert_fail_closed(&second, CREATE_DATE);
    assert_ne!(first.values, second.values);
}

#[test]
fn test_match_operator_typed_result() {
    let handler = RegexFilterHandler::create_date();

    assert_eq!(
        handler.match_operator("createDate<:2019-12-31"),
        OperatorMatch::Parsed {
            operator: "<:".to_string(),
            value: "2019-12-31".to_string(),
        }
    );
    assert_eq!(handler.match_operator("createDate"), OperatorMatch::Unparseable);
    assert_eq!(handler.match_operator("name:foo"), OperatorMatch::Unparseable);
}

#[test]
fn test_operation_table() {
    assert_eq!(operation_for_token(":"), Some(FilterOperation::Is));
    assert_eq!(operation_for_token(":!"), Some(FilterOperation::IsNot));
    assert_eq!(operation_for_token(">:"), Some(FilterOperation::GreaterThanOrEqual));
    assert_eq!(operation_for_token("<:"), Some(FilterOperation::LessThanOrEqual));
    assert_eq!(operation_for_token("~"), None);
    assert_eq!(operation_for_token(">="), None);
}

#[test]
fn test_custom_pattern_requires_named_groups() {
    let err = RegexFilterHandler::new("LevelFilter", "level", "level", r"^level(?P<op>[><:]{1,2})(?P<value>.*)$")
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidPattern(_)));

    let handler = RegexFilterHandler::new(
        "LevelFilter",
        "level",
        "level",
        r"^level(?P<operator>[><:!]{1,2})(?P<value>.*)$",
    )
    .unwrap();
    let filter = handler.build_filter_option("level<3");
    assert_eq!(filter.operator, FilterOperation::LessThan);
    assert_eq!(filter.values, vec!["3".to_string()]);
}

#[test]
fn test_registry_dispatch_order_and_unrecognized_tokens() {
    let registry = FilterHandlerRegistry::default();

    let parsed = registry.parse_all([
        "contentType:blogPost",
        "colour:red",
        "name:!Home",
        "updateDate<2024-01-01",
    ]);

    assert_eq!(parsed.unrecognized, vec!["colour:red".to_string()]);
    let fields: Vec<_> = parsed.filters.iter().map(|f| f.field_name.as_str()).collect();
    assert_eq!(fields, vec![NODE_TYPE_ALIAS, NAME, UPDATE_DATE]);
}

#[test]
fn test_registry_custom_handler() {
    let level = RegexFilterHandler::new(
        "LevelFilter",
        "level",
        "level",
        r"^level(?P<operator>[><:!]{1,2})(?P<value>.*)$",
    )
    .unwrap();
    let registry = FilterHandlerRegistry::default().with_handler(level);

    assert_eq!(registry.handlers().len(), 5);
    assert_eq!(registry.find("level>:2").map(|h| h.name()), Some("LevelFilter"));
    assert!(registry.parse("unknown:1").is_none());
}

#[test]
fn test_fail_closed_filter_matches_nothing() {
    let index = InMemoryIndex::new("ExternalIndex").with_documents(vec![
        IndexDocument::new("1").with_field(CREATE_DATE, "2020-01-01"),
        IndexDocument::new("2").with_field(CREATE_DATE, "2021-01-01"),
    ]);

    let mut request = SearchRequest::new("");
    request.add_filter(RegexFilterHandler::create_date().build_filter_option("createDate~2020-01-01"));

    let results = tokio_test::block_on(index.search(&request)).unwrap();
    assert_eq!(results.total, 0);
}
