//! Well-known anchor constants.
//!
//! These ids and labels are fixed by the SNOMED CT release, not discovered at
//! load time. The graph builder uses them as defaults in its configuration.
//!
//! # Examples
//!
//! ```
//! use snomed_types::well_known;
//!
//! assert_eq!(well_known::IS_A, 116680003);
//! assert_eq!(well_known::SNOMED_CT_ROOT, 138875005);
//! ```

use crate::SctId;

/// SNOMED CT root concept (138875005).
pub const SNOMED_CT_ROOT: SctId = 138875005;

/// Fully specified name of the root concept.
///
/// Root discovery matches this label case-insensitively against every
/// concept's resolved name and expects exactly one hit.
pub const ROOT_CONCEPT_LABEL: &str = "SNOMED CT Concept (SNOMED RT+CTV3)";

/// IS_A relationship type (116680003).
pub const IS_A: SctId = 116680003;

/// Fully Specified Name description type.
pub const FULLY_SPECIFIED_NAME: SctId = 900000000000003001;

/// Synonym description type.
pub const SYNONYM: SctId = 900000000000013009;

/// Language code whose FSN wins during name resolution.
pub const PREFERRED_LANGUAGE: &str = "en";

/// SNOMED CT core module.
pub const SNOMED_CT_CORE_MODULE: SctId = 900000000000207008;

/// Primitive definition status.
pub const PRIMITIVE: SctId = 900000000000074008;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_label_is_trimmed() {
        assert_eq!(ROOT_CONCEPT_LABEL, ROOT_CONCEPT_LABEL.trim());
    }
}
