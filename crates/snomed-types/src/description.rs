//! RF2 Description row.
//!
//! One line of a `sct2_Description_*.txt` file.

use crate::{EffectiveTime, SctId};

/// A single version of a SNOMED CT description.
///
/// # Examples
///
/// ```
/// use snomed_types::{well_known, EffectiveTime, Rf2Description};
///
/// let description = Rf2Description {
///     id: 754786011,
///     effective_time: EffectiveTime::from_yyyymmdd("20020131").unwrap(),
///     active: true,
///     module_id: 900000000000207008,
///     concept_id: 73211009,
///     language_code: "en".to_string(),
///     type_id: well_known::FULLY_SPECIFIED_NAME,
///     term: "Diabetes mellitus (disorder)".to_string(),
///     case_significance_id: 900000000000448009,
/// };
///
/// assert!(description.is_language("en"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rf2Description {
    /// Description identifier.
    pub id: SctId,
    /// Date this version took effect.
    pub effective_time: EffectiveTime,
    /// Whether this version is active.
    pub active: bool,
    /// The module containing this description.
    pub module_id: SctId,
    /// The concept this description belongs to.
    pub concept_id: SctId,
    /// ISO language code (e.g., "en").
    pub language_code: String,
    /// Description type concept (FSN, Synonym, ...).
    pub type_id: SctId,
    /// The term text.
    pub term: String,
    /// Case significance concept.
    pub case_significance_id: SctId,
}

impl Rf2Description {
    /// Returns true if the language code matches exactly.
    pub fn is_language(&self, language_code: &str) -> bool {
        self.language_code == language_code
    }
}
