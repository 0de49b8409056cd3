//! In-memory concept store for the finished IS-A graph.
//!
//! Nodes are keyed by SCTID in a concurrent map. Parent and child arrays on
//! each node hold ids, so every navigation step is a map lookup. The store is
//! filled once (by the builder or the binary reader) and is read-only after
//! that; queries take `&self` and may run from several threads.

use dashmap::mapref::multiple::RefMulti;
use dashmap::mapref::one::{Ref, RefMut};
use dashmap::DashMap;
use snomed_types::{QueryConcept, SctId};

use crate::types::{SnomedError, SnomedResult};

/// Id-keyed store of [`QueryConcept`] nodes.
#[derive(Default)]
pub struct ConceptStore {
    concepts: DashMap<SctId, QueryConcept>,
}

impl std::fmt::Debug for ConceptStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConceptStore")
            .field("concepts", &self.concepts.len())
            .finish()
    }
}

impl ConceptStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store sized for `capacity` concepts.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            concepts: DashMap::with_capacity(capacity),
        }
    }

    /// Adds a concept. Fails if its id is already present.
    pub fn insert(&self, concept: QueryConcept) -> SnomedResult<()> {
        use dashmap::mapref::entry::Entry;

        match self.concepts.entry(concept.id) {
            Entry::Occupied(existing) => Err(SnomedError::DuplicateConcept {
                id: *existing.key(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(concept);
                Ok(())
            }
        }
    }

    /// Looks up a concept by id.
    pub fn get(&self, id: SctId) -> Option<Ref<'_, SctId, QueryConcept>> {
        self.concepts.get(&id)
    }

    /// Looks up a concept by id, failing with a lookup error if absent.
    pub fn concept(&self, id: SctId) -> SnomedResult<Ref<'_, SctId, QueryConcept>> {
        self.concepts
            .get(&id)
            .ok_or(SnomedError::ConceptNotFound { id })
    }

    pub(crate) fn concept_mut(&self, id: SctId) -> SnomedResult<RefMut<'_, SctId, QueryConcept>> {
        self.concepts
            .get_mut(&id)
            .ok_or(SnomedError::ConceptNotFound { id })
    }

    /// Returns true if a concept with this id exists.
    pub fn contains(&self, id: SctId) -> bool {
        self.concepts.contains_key(&id)
    }

    /// Number of concepts.
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Returns true if the store holds no concepts.
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Snapshot of all concept ids, in the store's iteration order.
    pub fn ids(&self) -> Vec<SctId> {
        self.concepts.iter().map(|entry| *entry.key()).collect()
    }

    /// Iterates over all concepts.
    ///
    /// Each item holds a shard read lock; do not write to the store while
    /// iterating.
    pub fn iter(&self) -> impl Iterator<Item = RefMulti<'_, SctId, QueryConcept>> {
        self.concepts.iter()
    }

    /// Direct IS-A parents of a concept.
    pub fn parents_of(&self, id: SctId) -> SnomedResult<Vec<SctId>> {
        Ok(self.concept(id)?.is_a_parents.ids().collect())
    }

    /// Direct IS-A children of a concept.
    pub fn children_of(&self, id: SctId) -> SnomedResult<Vec<SctId>> {
        Ok(self.concept(id)?.is_a_children.ids().collect())
    }

    /// Number of parent/child edges (counted from the child side).
    pub fn edge_count(&self) -> usize {
        self.concepts
            .iter()
            .map(|entry| entry.is_a_parents.len())
            .sum()
    }

    /// Checks that every parent lists each of its children as a child, and
    /// vice versa.
    pub fn verify_symmetry(&self) -> SnomedResult<()> {
        for id in self.ids() {
            let children = self.children_of(id)?;
            for child_id in children {
                if !self.concept(child_id)?.is_a_parents.contains(id) {
                    return Err(SnomedError::MissingReverseLink {
                        parent: id,
                        child: child_id,
                    });
                }
            }
            let parents = self.parents_of(id)?;
            for parent_id in parents {
                if !self.concept(parent_id)?.is_a_children.contains(id) {
                    return Err(SnomedError::MissingReverseLink {
                        parent: parent_id,
                        child: id,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use snomed_types::{EffectiveTime, IsALinks};

    fn node(id: SctId) -> QueryConcept {
        QueryConcept::new(
            id,
            format!("Concept {id}"),
            Vec::new(),
            "SNOMED CT core module".to_string(),
            "Primitive".to_string(),
            EffectiveTime::from_ymd(2002, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_insert_and_lookup() {
        let store = ConceptStore::new();
        store.insert(node(100)).unwrap();
        store.insert(node(200)).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.contains(100));
        assert!(!store.contains(300));
        assert_eq!(store.concept(200).unwrap().fully_specified_name, "Concept 200");
        assert!(store.get(300).is_none());
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let store = ConceptStore::new();
        store.insert(node(100)).unwrap();
        let err = store.insert(node(100)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_concept_is_lookup_error() {
        let store = ConceptStore::new();
        let err = store.parents_of(42).unwrap_err();
        assert!(matches!(err, SnomedError::ConceptNotFound { id: 42 }));
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn test_symmetry_check_flags_one_sided_edge() {
        let store = ConceptStore::new();
        let mut parent = node(1);
        parent.is_a_children = IsALinks::from_ids(vec![2]);
        store.insert(parent).unwrap();
        store.insert(node(2)).unwrap();

        let err = store.verify_symmetry().unwrap_err();
        assert!(matches!(
            err,
            SnomedError::MissingReverseLink { parent: 1, child: 2 }
        ));
        assert_eq!(err.kind(), ErrorKind::Integrity);

        store.concept_mut(2).unwrap().is_a_parents = IsALinks::from_ids(vec![1]);
        store.verify_symmetry().unwrap();
        assert_eq!(store.edge_count(), 1);
        assert_eq!(store.children_of(1).unwrap(), vec![2]);
        assert_eq!(store.parents_of(2).unwrap(), vec![1]);
    }
}
