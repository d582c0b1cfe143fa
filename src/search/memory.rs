//! In-memory index and reference execution engine

use crate::indexing::{IndexHealth, SearchIndex};
use crate::search::engine::{IndexDocument, SearchExecutor, SearchResults};
use crate::search::error::{SearchError, SearchResult};
use crate::search::filter::{FilterOperation, FilterOption, LogicOperator};
use crate::search::request::{SearchRequest, SearchSort, SortType};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

/// Index that keeps its documents in a vector
///
/// Documents are replaced by id. Intended for tests, demos and small data
/// sets; every query scans all documents.
pub struct InMemoryIndex {
    name: String,
    searcher_name: String,
    documents: RwLock<Vec<IndexDocument>>,
}

impl InMemoryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            searcher_name: format!("{}Searcher", name),
            name,
            documents: RwLock::new(Vec::new()),
        }
    }

    pub fn with_searcher_name(mut self, searcher_name: impl Into<String>) -> Self {
        self.searcher_name = searcher_name.into();
        self
    }

    /// Seed documents without going through a populator
    pub fn with_documents(self, documents: Vec<IndexDocument>) -> Self {
        Self {
            documents: RwLock::new(documents),
            ..self
        }
    }
}

#[async_trait]
impl SearchExecutor for InMemoryIndex {
    async fn search(&self, request: &SearchRequest) -> SearchResult<SearchResults> {
        if request.take() == 0 {
            return Err(SearchError::InvalidRequest(
                "page size must be at least 1".to_string(),
            ));
        }

        let documents = self.documents.read().await;
        let term = request.term.trim().to_lowercase();

        let mut matches: Vec<&IndexDocument> = documents
            .iter()
            .filter(|doc| request.preview || doc.published)
            .filter(|doc| matches_term(doc, &term))
            .filter(|doc| {
                combine(
                    request.filters_logic_operator,
                    request.filters.iter().map(|filter| matches_filter(doc, filter)),
                )
            })
            .collect();

        if !request.sorts.is_empty() {
            matches.sort_by(|a, b| compare_documents(a, b, &request.sorts));
        }

        let total = matches.len();
        let items = matches
            .into_iter()
            .skip(request.skip())
            .take(request.take())
            .cloned()
            .collect();

        Ok(SearchResults { total, items })
    }
}

#[async_trait]
impl SearchIndex for InMemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn searcher_name(&self) -> String {
        self.searcher_name.clone()
    }

    async fn health(&self) -> IndexHealth {
        IndexHealth::healthy()
    }

    async fn document_count(&self) -> SearchResult<u64> {
        Ok(self.documents.read().await.len() as u64)
    }

    async fn field_count(&self) -> SearchResult<usize> {
        let documents = self.documents.read().await;
        let fields: BTreeSet<&str> = documents
            .iter()
            .flat_map(|doc| doc.fields.keys().map(String::as_str))
            .collect();
        Ok(fields.len())
    }

    fn provider_properties(&self) -> BTreeMap<String, serde_json::Value> {
        BTreeMap::from([("provider".to_string(), serde_json::json!("memory"))])
    }

    async fn clear(&self) -> SearchResult<()> {
        self.documents.write().await.clear();
        Ok(())
    }

    async fn index_documents(&self, documents: Vec<IndexDocument>) -> SearchResult<usize> {
        let mut stored = self.documents.write().await;
        let count = documents.len();

        for document in documents {
            match stored.iter_mut().find(|existing| existing.id == document.id) {
                Some(existing) => *existing = document,
                None => stored.push(document),
            }
        }

        Ok(count)
    }
}

fn combine(operator: LogicOperator, mut results: impl Iterator<Item = bool>) -> bool {
    match operator {
        LogicOperator::And => results.all(|matched| matched),
        LogicOperator::Or => {
            let mut any_seen = false;
            for matched in results {
                if matched {
                    return true;
                }
                any_seen = true;
            }
            // an empty OR list places no constraint
            !any_seen
        }
    }
}

fn matches_term(doc: &IndexDocument, term: &str) -> bool {
    term.is_empty()
        || doc
            .fields
            .values()
            .flatten()
            .any(|value| value.to_lowercase().contains(term))
}

/// Evaluate one filter clause against a document
///
/// Grouping nodes evaluate only their sub-filters. Leaves with no values
/// place no constraint.
pub fn matches_filter(doc: &IndexDocument, filter: &FilterOption) -> bool {
    if filter.is_group() {
        return combine(
            filter.logic_operator,
            filter.sub_filters.iter().map(|sub| matches_filter(doc, sub)),
        );
    }

    if filter.values.is_empty() {
        return true;
    }

    let doc_values = doc.values(&filter.field_name);
    let equal = || {
        filter.values.iter().any(|wanted| {
            doc_values
                .iter()
                .any(|actual| actual.to_lowercase() == wanted.to_lowercase())
        })
    };

    match filter.operator {
        FilterOperation::Is => equal(),
        FilterOperation::IsNot => !equal(),
        range => filter.values.iter().any(|bound| {
            doc_values.iter().any(|actual| {
                let ordering = compare_loose(actual, bound);
                match range {
                    FilterOperation::GreaterThan => ordering == Ordering::Greater,
                    FilterOperation::GreaterThanOrEqual => ordering != Ordering::Less,
                    FilterOperation::LessThan => ordering == Ordering::Less,
                    FilterOperation::LessThanOrEqual => ordering != Ordering::Greater,
                    FilterOperation::Is | FilterOperation::IsNot => false,
                }
            })
        }),
    }
}

/// Compare as dates, then numbers, then case-insensitive text
fn compare_loose(a: &str, b: &str) -> Ordering {
    if let (Some(a), Some(b)) = (parse_date(a), parse_date(b)) {
        return a.cmp(&b);
    }
    if let (Ok(a), Ok(b)) = (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn compare_documents(a: &IndexDocument, b: &IndexDocument, sorts: &[SearchSort]) -> Ordering {
    for sort in sorts {
        let ordering = compare_sort_values(
            a.first(&sort.field_name),
            b.first(&sort.field_name),
            sort,
        );
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Values that are missing or do not parse as the sort type go last
fn compare_sort_values(a: Option<&str>, b: Option<&str>, sort: &SearchSort) -> Ordering {
    match sort.sort_type {
        SortType::String => directed(
            a.map(str::to_lowercase),
            b.map(str::to_lowercase),
            sort.descending,
        ),
        SortType::Number => {
            let key = |v: Option<&str>| v.and_then(|v| v.trim().parse::<f64>().ok());
            match (key(a), key(b)) {
                (Some(a), Some(b)) if sort.descending => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                (a, b) => missing_last(a.is_some(), b.is_some()),
            }
        }
        SortType::Date => directed(
            a.and_then(parse_date),
            b.and_then(parse_date),
            sort.descending,
        ),
    }
}

fn directed<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (a, b) => missing_last(a.is_some(), b.is_some()),
    }
}

fn missing_last(a_present: bool, b_present: bool) -> Ordering {
    match (a_present, b_present) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, alias: &str) -> IndexDocument {
        IndexDocument::new(id).with_field("__NodeTypeAlias", alias)
    }

    #[test]
    fn test_grouping_node_ignores_own_leaf() {
        let article = doc("1", "article");

        // The leaf part alone would exclude the document
        let mut group = FilterOption::new(
            "__NodeTypeAlias",
            FilterOperation::IsNot,
            vec!["article".to_string()],
        )
        .with_logic_operator(LogicOperator::Or);
        group.create_sub_filter("__NodeTypeAlias", vec!["article".to_string()], LogicOperator::And);

        assert!(matches_filter(&article, &group));
    }

    #[tokio::test]
    async fn test_zero_page_size_is_rejected() {
        let index = InMemoryIndex::new("ExternalIndex").with_documents(vec![doc("1", "page")]);
        let request = SearchRequest::new("").with_page_size(0);

        let err = index.search(&request).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidRequest(_)));
    }

    #[test]
    fn test_empty_values_place_no_constraint() {
        let filter = FilterOption::new("name", FilterOperation::IsNot, Vec::new());
        assert!(matches_filter(&doc("1", "page"), &filter));
    }

    #[test]
    fn test_compare_loose() {
        assert_eq!(compare_loose("2021-01-01", "2020-12-31T23:00:00Z"), Ordering::Greater);
        assert_eq!(compare_loose("9", "10"), Ordering::Less);
        assert_eq!(compare_loose("b", "A"), Ordering::Greater);
    }

    #[test]
    fn test_numeric_sort_puts_unparseable_last() {
        let sort = SearchSort::new("level", SortType::Number, true);
        assert_eq!(compare_sort_values(Some("x"), Some("1"), &sort), Ordering::Greater);
        assert_eq!(compare_sort_values(Some("2"), Some("10"), &sort), Ordering::Greater);
        assert_eq!(compare_sort_values(None, None, &sort), Ordering::Equal);
    }
}
