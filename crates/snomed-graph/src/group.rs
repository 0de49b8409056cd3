//! Version groups: every row of a release that shares one id.
//!
//! Release files list each component's versions in ascending effective-time
//! order, and all versions of one id sit on consecutive lines. Groups keep
//! that input order; nothing here re-sorts.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use snomed_types::{EffectiveTime, SctId};

use crate::types::SnomedResult;

/// A release row that belongs to a version history.
pub trait Versioned {
    /// Component id shared by all versions.
    fn id(&self) -> SctId;
    /// Date this version took effect.
    fn effective_time(&self) -> EffectiveTime;
    /// Active flag of this version.
    fn is_active(&self) -> bool;
}

/// Concurrent id-keyed map of version groups.
pub type GroupMap<T> = DashMap<SctId, VersionGroup<T>>;

/// All versions of one component, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGroup<T> {
    id: SctId,
    items: Vec<T>,
}

impl<T: Versioned> VersionGroup<T> {
    /// Starts a group with its first version.
    pub fn new(first: T) -> Self {
        Self {
            id: first.id(),
            items: vec![first],
        }
    }

    /// Component id of this group.
    pub fn id(&self) -> SctId {
        self.id
    }

    /// Appends a later version. The record must carry this group's id.
    pub fn push(&mut self, item: T) {
        debug_assert_eq!(item.id(), self.id);
        self.items.push(item);
    }

    /// All versions, oldest first.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of versions.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; a group is created with one version.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Last version whose effective time is on or before `now`.
    pub fn current_at(&self, now: EffectiveTime) -> Option<&T> {
        self.items
            .iter()
            .rev()
            .find(|item| item.effective_time() <= now)
    }

    /// Last version in effect today.
    pub fn current(&self) -> Option<&T> {
        self.current_at(EffectiveTime::today())
    }

    /// The current version at `now`, if it is active.
    ///
    /// `None` is a normal outcome: retired components have an inactive
    /// current version.
    pub fn active_at(&self, now: EffectiveTime) -> Option<&T> {
        self.current_at(now).filter(|item| item.is_active())
    }

    /// The current version today, if it is active.
    pub fn active(&self) -> Option<&T> {
        self.active_at(EffectiveTime::today())
    }

    fn absorb(&mut self, other: VersionGroup<T>) {
        self.items.extend(other.items);
    }
}

/// Feeds records into a [`GroupMap`], one consecutive id run at a time.
///
/// Rows with the same id as the previous row extend a local run without
/// touching the shared map. On an id change the run is flushed. If the id was
/// already in the map (its lines were not contiguous) the run is appended to
/// the existing group, in input order.
pub struct GroupCollector<'a, T: Versioned> {
    map: &'a GroupMap<T>,
    run: Option<VersionGroup<T>>,
    rows: usize,
    reopened: usize,
}

impl<'a, T: Versioned> GroupCollector<'a, T> {
    /// Creates a collector writing into `map`.
    pub fn new(map: &'a GroupMap<T>) -> Self {
        Self {
            map,
            run: None,
            rows: 0,
            reopened: 0,
        }
    }

    /// Adds one record.
    pub fn insert(&mut self, record: T) {
        self.rows += 1;
        match self.run.as_mut() {
            Some(run) if run.id() == record.id() => run.push(record),
            _ => {
                self.flush();
                self.run = Some(VersionGroup::new(record));
            }
        }
    }

    fn flush(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        match self.map.entry(run.id()) {
            Entry::Occupied(mut existing) => {
                self.reopened += 1;
                existing.get_mut().absorb(run);
            }
            Entry::Vacant(slot) => {
                slot.insert(run);
            }
        }
    }

    /// Flushes the last run and returns the number of rows seen.
    pub fn finish(mut self) -> usize {
        self.flush();
        if self.reopened > 0 {
            tracing::warn!(
                reopened = self.reopened,
                "version group rows were not contiguous; merged through map lookup"
            );
        }
        self.rows
    }
}

/// Drains a record stream into `map`, stopping at the first error.
pub fn collect_groups<T, I>(records: I, map: &GroupMap<T>) -> SnomedResult<usize>
where
    T: Versioned,
    I: IntoIterator<Item = SnomedResult<T>>,
{
    let mut collector = GroupCollector::new(map);
    for record in records {
        collector.insert(record?);
    }
    Ok(collector.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snomed_types::Rf2Concept;

    fn concept(id: SctId, date: &str, active: bool) -> Rf2Concept {
        Rf2Concept {
            id,
            effective_time: EffectiveTime::from_yyyymmdd(date).unwrap(),
            active,
            module_id: 900000000000207008,
            definition_status_id: 900000000000074008,
        }
    }

    fn date(value: &str) -> EffectiveTime {
        EffectiveTime::from_yyyymmdd(value).unwrap()
    }

    #[test]
    fn test_current_picks_latest_not_in_future() {
        let mut group = VersionGroup::new(concept(1, "20020131", true));
        group.push(concept(1, "20100131", false));
        group.push(concept(1, "20300131", true));

        let current = group.current_at(date("20160731")).unwrap();
        assert_eq!(current.effective_time, date("20100131"));
        assert!(group.active_at(date("20160731")).is_none());

        assert!(group.active_at(date("20300131")).is_some());
        assert!(group.current_at(date("20000101")).is_none());
    }

    #[test]
    fn test_current_uses_input_order() {
        // Out-of-order input is not re-sorted: the scan runs from the end.
        let mut group = VersionGroup::new(concept(1, "20100131", false));
        group.push(concept(1, "20020131", true));
        assert!(group.active_at(date("20160731")).is_some());
    }

    #[test]
    fn test_collector_groups_contiguous_runs() {
        let map = GroupMap::new();
        let rows = vec![
            Ok(concept(1, "20020131", true)),
            Ok(concept(1, "20100131", false)),
            Ok(concept(2, "20020131", true)),
        ];
        assert_eq!(collect_groups(rows, &map).unwrap(), 3);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1).unwrap().len(), 2);
    }

    #[test]
    fn test_collector_merges_non_contiguous_rows() {
        let map = GroupMap::new();
        let rows = vec![
            Ok(concept(1, "20020131", true)),
            Ok(concept(2, "20020131", true)),
            Ok(concept(1, "20100131", false)),
        ];
        collect_groups(rows, &map).unwrap();
        let group = map.get(&1).unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group.items()[1].effective_time, date("20100131"));
    }

    #[test]
    fn test_collector_propagates_error() {
        let map = GroupMap::new();
        let rows = vec![
            Ok(concept(1, "20020131", true)),
            Err(crate::types::SnomedError::InvalidBoolean {
                value: "x".to_string(),
            }),
        ];
        assert!(collect_groups(rows, &map).is_err());
    }
}
