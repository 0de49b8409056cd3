//! RF2 Concept row.
//!
//! One line of a `sct2_Concept_*.txt` file. A release may contain several
//! rows for the same id, one per effective time.

use crate::{EffectiveTime, SctId};

/// A single version of a SNOMED CT concept.
///
/// # Examples
///
/// ```
/// use snomed_types::{well_known, EffectiveTime, Rf2Concept};
///
/// let concept = Rf2Concept {
///     id: 73211009,
///     effective_time: EffectiveTime::from_yyyymmdd("20020131").unwrap(),
///     active: true,
///     module_id: 900000000000207008,
///     definition_status_id: well_known::PRIMITIVE,
/// };
///
/// assert!(concept.active);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rf2Concept {
    /// Concept identifier.
    pub id: SctId,
    /// Date this version took effect.
    pub effective_time: EffectiveTime,
    /// Whether this version is active.
    pub active: bool,
    /// The module containing this concept.
    pub module_id: SctId,
    /// Primitive or fully defined.
    pub definition_status_id: SctId,
}
