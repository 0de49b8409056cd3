//! Reachability queries over the IS-A graph.
//!
//! Every query walks the store with its own visited set, so queries never
//! block each other and terminate on cyclic input. The start concept is
//! marked visited before the walk begins and is never part of a result.

use std::collections::HashSet;
use std::io::Write;

use snomed_types::SctId;
use tracing::info;

use crate::store::ConceptStore;
use crate::types::SnomedResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Children,
    Parents,
}

impl ConceptStore {
    /// Returns true if `child_id` is reachable from `parent_id` through
    /// IS-A children.
    ///
    /// A concept is not its own descendant. Fails if `parent_id` is unknown.
    pub fn is_descendant(&self, parent_id: SctId, child_id: SctId) -> SnomedResult<bool> {
        let mut visited = HashSet::from([parent_id]);
        let mut stack = self.children_of(parent_id)?;

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if id == child_id {
                return Ok(true);
            }
            stack.extend(self.children_of(id)?);
        }
        Ok(false)
    }

    /// All concepts reachable through IS-A children, excluding `id` itself.
    pub fn find_descendants(&self, id: SctId) -> SnomedResult<HashSet<SctId>> {
        self.reachable(id, Direction::Children)
    }

    /// All concepts reachable through IS-A parents, excluding `id` itself.
    pub fn find_ancestors(&self, id: SctId) -> SnomedResult<HashSet<SctId>> {
        self.reachable(id, Direction::Parents)
    }

    /// Writes one `source<TAB>descendant` row per transitive descendant of
    /// every concept, in store order. Returns the number of rows written.
    pub fn create_closure_table<W: Write>(&self, mut out: W) -> SnomedResult<usize> {
        let mut rows = 0usize;
        for id in self.ids() {
            for descendant in self.find_descendants(id)? {
                writeln!(out, "{id}\t{descendant}")?;
                rows += 1;
            }
        }
        out.flush()?;
        info!(concepts = self.len(), rows, "wrote closure table");
        Ok(rows)
    }

    fn reachable(&self, start: SctId, direction: Direction) -> SnomedResult<HashSet<SctId>> {
        let neighbours = |id: SctId| match direction {
            Direction::Children => self.children_of(id),
            Direction::Parents => self.parents_of(id),
        };

        let mut visited = HashSet::from([start]);
        let mut stack = neighbours(start)?;
        while let Some(id) = stack.pop() {
            if visited.insert(id) {
                stack.extend(neighbours(id)?);
            }
        }

        visited.remove(&start);
        Ok(visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixture;
    use crate::types::{ErrorKind, SnomedError};
    use snomed_types::{EffectiveTime, IsALinks, QueryConcept};

    fn set(ids: &[SctId]) -> HashSet<SctId> {
        ids.iter().copied().collect()
    }

    /// 1 -> 2 -> 3 -> 1, each arrow pointing from parent to child.
    fn cyclic_store() -> ConceptStore {
        let store = ConceptStore::new();
        for (id, parent, child) in [(1, 3, 2), (2, 1, 3), (3, 2, 1)] {
            let mut concept = QueryConcept::new(
                id,
                format!("Concept {id}"),
                Vec::new(),
                "Module".to_string(),
                "Primitive".to_string(),
                EffectiveTime::from_ymd(2002, 1, 31).unwrap(),
            );
            concept.is_a_parents = IsALinks::from_ids(vec![parent]);
            concept.is_a_children = IsALinks::from_ids(vec![child]);
            store.insert(concept).unwrap();
        }
        store
    }

    #[test]
    fn test_chain_scenario() {
        let graph = Fixture::standard().build().unwrap();
        let store = &graph.store;
        let (a, b, c) = (Fixture::A, Fixture::B, Fixture::C);

        assert_eq!(store.find_ancestors(a).unwrap(), set(&[b, c, Fixture::ROOT]));
        assert_eq!(store.find_descendants(c).unwrap(), set(&[a, b]));
        assert!(store.find_descendants(Fixture::D).unwrap().is_empty());
        assert!(store.is_descendant(c, a).unwrap());
        assert!(!store.is_descendant(a, c).unwrap());
    }

    #[test]
    fn test_leaf_has_empty_result_not_error() {
        let graph = Fixture::standard().build().unwrap();
        assert!(graph.store.find_descendants(Fixture::A).unwrap().is_empty());
        assert!(graph.store.find_ancestors(graph.root_id).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_id_is_lookup_error() {
        let graph = Fixture::standard().build().unwrap();
        let err = graph.store.find_descendants(999).unwrap_err();
        assert!(matches!(err, SnomedError::ConceptNotFound { id: 999 }));
        assert_eq!(
            graph.store.find_ancestors(999).unwrap_err().kind(),
            ErrorKind::Lookup
        );
        assert_eq!(
            graph.store.is_descendant(999, Fixture::A).unwrap_err().kind(),
            ErrorKind::Lookup
        );
    }

    #[test]
    fn test_ancestor_descendant_duality() {
        let graph = Fixture::standard().build().unwrap();
        let store = &graph.store;
        let ids = store.ids();

        for &x in &ids {
            let descendants = store.find_descendants(x).unwrap();
            for &y in &ids {
                let ancestors = store.find_ancestors(y).unwrap();
                assert_eq!(descendants.contains(&y), ancestors.contains(&x), "{x} / {y}");
                assert_eq!(store.is_descendant(x, y).unwrap(), descendants.contains(&y));
            }
        }
    }

    #[test]
    fn test_cycle_terminates_without_self_membership() {
        let store = cyclic_store();
        for id in [1, 2, 3] {
            let descendants = store.find_descendants(id).unwrap();
            let ancestors = store.find_ancestors(id).unwrap();
            assert!(!descendants.contains(&id));
            assert!(!ancestors.contains(&id));
            assert_eq!(descendants.len(), 2);
            assert_eq!(ancestors.len(), 2);
            assert!(!store.is_descendant(id, id).unwrap());
        }
        assert!(store.is_descendant(1, 3).unwrap());
    }

    #[test]
    fn test_closure_table_is_complete() {
        let graph = Fixture::standard().build().unwrap();
        let store = &graph.store;

        let mut out = Vec::new();
        let rows = store.create_closure_table(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        let expected: usize = store
            .ids()
            .into_iter()
            .map(|id| store.find_descendants(id).unwrap().len())
            .sum();
        assert_eq!(rows, expected);
        assert_eq!(lines.len(), expected);
        assert_eq!(lines.iter().collect::<HashSet<_>>().len(), lines.len());

        let a_row = format!("{}\t{}", Fixture::C, Fixture::A);
        assert!(lines.contains(&a_row.as_str()));
        assert!(lines.iter().all(|line| line.split('\t').count() == 2));
    }

    #[test]
    fn test_closure_table_on_cycle() {
        let store = cyclic_store();
        let mut out = Vec::new();
        assert_eq!(store.create_closure_table(&mut out).unwrap(), 6);
    }
}
