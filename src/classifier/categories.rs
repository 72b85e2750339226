//! Category registration
//!
//! Maps category names to stable indices and gives every category a fixed
//! block of ensemble slots.

use super::{ClassifierError, ClassifierResult};
use std::collections::HashMap;

/// Number of bootstrap replicates drawn per category.
pub const ENSEMBLE_SIZE: usize = 20;

/// Fixed set of category labels with their indices and ensemble slots
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    /// Category names, position = index
    names: Vec<String>,
    /// name -> index
    index: HashMap<String, usize>,
    /// Global slot indices per category, category i owns [i*E, i*E + E)
    slots: Vec<[usize; ENSEMBLE_SIZE]>,
}

impl CategoryRegistry {
    /// Register categories in the given order.
    ///
    /// Fails on an empty list or a repeated name, so indices always form a
    /// bijection onto `0..names.len()`.
    pub fn new<S: AsRef<str>>(names: &[S]) -> ClassifierResult<Self> {
        if names.is_empty() {
            return Err(ClassifierError::NoCategories);
        }

        let mut index = HashMap::with_capacity(names.len());
        let mut slots = Vec::with_capacity(names.len());
        let mut next = 0;

        for (i, name) in names.iter().enumerate() {
            let name = name.as_ref();
            if index.insert(name.to_string(), i).is_some() {
                return Err(ClassifierError::DuplicateCategory(name.to_string()));
            }

            let mut block = [0usize; ENSEMBLE_SIZE];
            for slot in block.iter_mut() {
                *slot = next;
                next += 1;
            }
            slots.push(block);
        }

        Ok(Self {
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            index,
            slots,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Category names in index order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The full name -> index map
    pub fn category_index(&self) -> &HashMap<String, usize> {
        &self.index
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Look up a category, failing with `UnknownCategory`
    pub fn resolve(&self, name: &str) -> ClassifierResult<usize> {
        self.index_of(name)
            .ok_or_else(|| ClassifierError::UnknownCategory(name.to_string()))
    }

    /// Ensemble slot indices owned by a category
    pub fn slots(&self, category: usize) -> &[usize; ENSEMBLE_SIZE] {
        &self.slots[category]
    }

    /// Total number of ensemble slots across all categories
    pub fn slot_count(&self) -> usize {
        self.names.len() * ENSEMBLE_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_bijection() {
        let registry = CategoryRegistry::new(&["a", "b", "c"]).unwrap();
        assert_eq!(registry.len(), 3);

        let mut seen: Vec<usize> = registry.category_index().values().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);

        for (i, name) in registry.names().iter().enumerate() {
            assert_eq!(registry.index_of(name), Some(i));
        }
    }

    #[test]
    fn test_slot_blocks_are_consecutive_and_distinct() {
        let registry = CategoryRegistry::new(&["x", "y"]).unwrap();
        assert_eq!(registry.slots(0)[0], 0);
        assert_eq!(registry.slots(0)[ENSEMBLE_SIZE - 1], ENSEMBLE_SIZE - 1);
        assert_eq!(registry.slots(1)[0], ENSEMBLE_SIZE);

        let mut all: Vec<usize> = (0..registry.len())
            .flat_map(|c| registry.slots(c).iter().copied())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), registry.slot_count());
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert!(matches!(
            CategoryRegistry::new(&["a", "b", "a"]),
            Err(ClassifierError::DuplicateCategory(name)) if name == "a"
        ));
        let empty: [&str; 0] = [];
        assert!(matches!(
            CategoryRegistry::new(&empty),
            Err(ClassifierError::NoCategories)
        ));
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = CategoryRegistry::new(&["a"]).unwrap();
        assert!(matches!(
            registry.resolve("zzz"),
            Err(ClassifierError::UnknownCategory(name)) if name == "zzz"
        ));
    }
}
