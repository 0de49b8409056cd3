//! SNOMED CT Identifier (SCTID) type.
//!
//! Every row of an RF2 release, and every node of the IS-A graph, is keyed by
//! an SCTID. The binary graph format stores it as a signed 64-bit integer; all
//! real SCTIDs fit well below `i64::MAX`.

/// A SNOMED CT identifier (SCTID).
///
/// # Examples
///
/// ```
/// use snomed_types::SctId;
///
/// let concept_id: SctId = 73211009; // Diabetes mellitus
/// let is_a_type: SctId = 116680003; // IS_A relationship type
/// ```
pub type SctId = u64;
