//! RF2 Relationship row.
//!
//! One line of a `sct2_Relationship_*.txt` file. Only active IS-A rows end
//! up in the query graph; the rest are kept for cross-linking.

use crate::{EffectiveTime, SctId};

/// A single version of a SNOMED CT relationship.
///
/// # Examples
///
/// ```
/// use snomed_types::{well_known, EffectiveTime, Rf2Relationship};
///
/// let relationship = Rf2Relationship {
///     id: 100000028,
///     effective_time: EffectiveTime::from_yyyymmdd("20020131").unwrap(),
///     active: true,
///     module_id: 900000000000207008,
///     source_id: 73211009,        // Diabetes mellitus
///     destination_id: 362969004,  // Disorder of endocrine system
///     relationship_group: 0,
///     type_id: well_known::IS_A,
///     characteristic_type_id: 900000000000011006,
///     modifier_id: 900000000000451002,
/// };
///
/// assert_eq!(relationship.type_id, well_known::IS_A);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rf2Relationship {
    /// Relationship identifier.
    pub id: SctId,
    /// Date this version took effect.
    pub effective_time: EffectiveTime,
    /// Whether this version is active.
    pub active: bool,
    /// The module containing this relationship.
    pub module_id: SctId,
    /// Source concept (the subtype for IS-A).
    pub source_id: SctId,
    /// Destination concept (the supertype for IS-A).
    pub destination_id: SctId,
    /// Role group number (0 = ungrouped).
    pub relationship_group: u32,
    /// Relationship type (e.g., IS_A, Finding site).
    pub type_id: SctId,
    /// Stated, inferred or additional.
    pub characteristic_type_id: SctId,
    /// Existential or universal.
    pub modifier_id: SctId,
}
