//! Registry of named indexes and their populators

use super::config::IndexDefinition;
use super::index::SearchIndex;
use super::populator::{ContentPopulator, IndexPopulator, JsonFileContentSource};
use crate::search::InMemoryIndex;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Indexes by name, plus the populators able to rebuild them
///
/// Registration normally happens once at startup. Lookups are lock-free for
/// indexes; populators sit behind a read-mostly lock to keep their order.
#[derive(Default)]
pub struct IndexRegistry {
    indexes: DashMap<String, Arc<dyn SearchIndex>>,
    populators: RwLock<Vec<Arc<dyn IndexPopulator>>>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory index per definition, plus one JSON file populator per
    /// distinct seed file shared by the indexes that name it
    pub fn from_definitions(definitions: &[IndexDefinition]) -> Self {
        let registry = Self::new();
        let mut seeds: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();

        for definition in definitions {
            let mut index = InMemoryIndex::new(definition.name.clone());
            if let Some(searcher_name) = &definition.searcher_name {
                index = index.with_searcher_name(searcher_name.clone());
            }
            registry.register_index(Arc::new(index));

            if let Some(seed_file) = &definition.seed_file {
                seeds
                    .entry(seed_file.clone())
                    .or_default()
                    .push(definition.name.clone());
            }
        }

        for (seed_file, index_names) in seeds {
            let source = Arc::new(JsonFileContentSource::new(seed_file.clone()));
            let populator = index_names.into_iter().fold(
                ContentPopulator::new(format!("file:{}", seed_file.display()), source),
                |populator, name| populator.for_index(name),
            );
            registry.register_populator(Arc::new(populator));
        }

        registry
    }

    /// Register an index, replacing any index with the same name
    pub fn register_index(&self, index: Arc<dyn SearchIndex>) {
        let name = index.name().to_string();
        info!(index = %name, "Registering index");
        self.indexes.insert(name, index);
    }

    pub fn register_populator(&self, populator: Arc<dyn IndexPopulator>) {
        info!(populator = populator.name(), "Registering index populator");
        self.populators.write().push(populator);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SearchIndex>> {
        self.indexes.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    /// Registered index names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indexes.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Populators registered for `index`, in registration order
    pub fn populators_for(&self, index: &dyn SearchIndex) -> Vec<Arc<dyn IndexPopulator>> {
        self.populators
            .read()
            .iter()
            .filter(|populator| populator.is_registered(index))
            .cloned()
            .collect()
    }

    pub fn has_populator(&self, index: &dyn SearchIndex) -> bool {
        self.populators
            .read()
            .iter()
            .any(|populator| populator.is_registered(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(name: &str, seed_file: Option<&str>) -> IndexDefinition {
        IndexDefinition {
            name: name.to_string(),
            searcher_name: None,
            seed_file: seed_file.map(PathBuf::from),
        }
    }

    #[test]
    fn test_from_definitions() {
        let registry = IndexRegistry::from_definitions(&[
            definition("InternalIndex", Some("content.json")),
            definition("ExternalIndex", Some("content.json")),
            definition("MembersIndex", None),
        ]);

        assert_eq!(registry.names(), vec!["ExternalIndex", "InternalIndex", "MembersIndex"]);

        let external = registry.get("ExternalIndex").unwrap();
        let members = registry.get("MembersIndex").unwrap();
        assert_eq!(registry.populators_for(external.as_ref()).len(), 1);
        assert!(!registry.has_populator(members.as_ref()));
        assert_eq!(external.searcher_name(), "ExternalIndexSearcher");
    }

    #[test]
    fn test_register_index_replaces_by_name() {
        let registry = IndexRegistry::new();
        registry.register_index(Arc::new(InMemoryIndex::new("ExternalIndex")));
        registry.register_index(Arc::new(
            InMemoryIndex::new("ExternalIndex").with_searcher_name("Custom"),
        ));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("ExternalIndex").unwrap().searcher_name(), "Custom");
    }
}
