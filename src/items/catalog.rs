//! Item catalog
//!
//! Owns every loaded `ItemDefinition` and hands out shared references.
//! Loaded once at startup (see `crate::data`); read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use super::definition::{DefId, ItemDefinition};

/// Definition lookup table
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    defs: HashMap<DefId, Arc<ItemDefinition>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            defs: HashMap::new(),
        }
    }

    /// Build a catalog from a list of definitions
    pub fn from_definitions(defs: Vec<ItemDefinition>) -> Self {
        let mut catalog = Self::new();
        for def in defs {
            catalog.insert(def);
        }
        catalog
    }

    /// Register a definition, replacing any previous entry with the same id
    pub fn insert(&mut self, def: ItemDefinition) -> Arc<ItemDefinition> {
        let arc = Arc::new(def);
        if self
            .defs
            .insert(arc.id.clone(), Arc::clone(&arc))
            .is_some()
        {
            log::warn!("Catalog entry {} replaced", arc.id);
        }
        arc
    }

    /// Look up a definition by id
    pub fn definition_by_id(&self, id: &DefId) -> Option<Arc<ItemDefinition>> {
        self.defs.get(id).map(Arc::clone)
    }

    /// Convenience lookup by string id
    pub fn get(&self, id: &str) -> Option<Arc<ItemDefinition>> {
        self.definition_by_id(&DefId::from(id))
    }

    /// Iterate over all definitions
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ItemDefinition>> {
        self.defs.values()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::definition::ItemCategory;

    #[test]
    fn test_insert_and_lookup() {
        let mut catalog = Catalog::new();
        catalog.insert(ItemDefinition::new(
            "bandage",
            "Bandage",
            ItemCategory::Medicine,
        ));

        assert_eq!(catalog.len(), 1);
        let def = catalog.get("bandage").expect("definition present");
        assert_eq!(def.name, "Bandage");
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_shared_handles() {
        let mut catalog = Catalog::new();
        catalog.insert(ItemDefinition::new("key", "Rusted Key", ItemCategory::Key));

        let a = catalog.get("key").unwrap();
        let b = catalog.get("key").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
