//! Nodes of the IS-A query graph.
//!
//! A [`QueryConcept`] is created in two steps: its data fields first, then its
//! parent and child arrays once every node exists. The arrays hold concept ids
//! rather than references, so the parent/child cycle never becomes an
//! ownership cycle.

use crate::{EffectiveTime, SctId};

/// Fixed-length array of IS-A neighbour ids.
///
/// The length is fixed at allocation. Slots start unset when the array is
/// sized ahead of its contents (as the binary reader does) and are filled by
/// index. A fully built graph has every slot set.
///
/// # Examples
///
/// ```
/// use snomed_types::IsALinks;
///
/// let mut links = IsALinks::with_len(2);
/// assert!(!links.is_complete());
/// assert!(links.set(1, 404684003));
/// assert!(links.set(0, 138875005));
/// assert!(links.is_complete());
/// assert_eq!(links.position(404684003), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IsALinks {
    slots: Box<[Option<SctId>]>,
}

impl IsALinks {
    /// Allocates `len` unset slots.
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: vec![None; len].into_boxed_slice(),
        }
    }

    /// Builds a complete array from a list of ids.
    pub fn from_ids(ids: Vec<SctId>) -> Self {
        Self {
            slots: ids.into_iter().map(Some).collect(),
        }
    }

    /// Declared number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the id in slot `index`, if set.
    pub fn get(&self, index: usize) -> Option<SctId> {
        self.slots.get(index).copied().flatten()
    }

    /// Stores `id` in slot `index`. Returns false if the index is out of range.
    pub fn set(&mut self, index: usize, id: SctId) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = Some(id);
                true
            }
            None => false,
        }
    }

    /// Index of the first slot holding `id`.
    pub fn position(&self, id: SctId) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(id))
    }

    /// Returns true if some slot holds `id`.
    pub fn contains(&self, id: SctId) -> bool {
        self.position(id).is_some()
    }

    /// Index of the first unset slot.
    pub fn first_unset(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Returns true once every slot is set.
    pub fn is_complete(&self) -> bool {
        self.first_unset().is_none()
    }

    /// Iterates over the ids of set slots, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = SctId> + '_ {
        self.slots.iter().flatten().copied()
    }
}

/// A concept in the finished IS-A graph.
///
/// Identity fields are immutable once built; `is_a_parents` and
/// `is_a_children` are filled in a second pass. For every pair of concepts
/// `a`, `b`: `b` is in `a.is_a_children` exactly when `a` is in
/// `b.is_a_parents`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryConcept {
    /// Concept identifier.
    pub id: SctId,
    /// Resolved fully specified name (empty if the concept has none).
    pub fully_specified_name: String,
    /// Active synonym terms.
    pub synonyms: Vec<String>,
    /// Resolved name of the owning module concept.
    pub module: String,
    /// Resolved name of the definition status concept.
    pub definition_status: String,
    /// Effective time of the concept's active version.
    pub effective_time: EffectiveTime,
    /// Direct IS-A supertypes.
    pub is_a_parents: IsALinks,
    /// Direct IS-A subtypes.
    pub is_a_children: IsALinks,
}

impl QueryConcept {
    /// Creates a concept with empty parent and child arrays.
    pub fn new(
        id: SctId,
        fully_specified_name: String,
        synonyms: Vec<String>,
        module: String,
        definition_status: String,
        effective_time: EffectiveTime,
    ) -> Self {
        Self {
            id,
            fully_specified_name,
            synonyms,
            module,
            definition_status,
            effective_time,
            is_a_parents: IsALinks::default(),
            is_a_children: IsALinks::default(),
        }
    }
}

impl std::fmt::Display for QueryConcept {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.id, self.fully_specified_name)
    }
}
