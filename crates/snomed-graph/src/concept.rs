//! SNOMED CT Concept file parser.
//!
//! Parses sct2_Concept_*.txt RF2 files.

use snomed_types::{EffectiveTime, Rf2Concept, SctId};

use crate::group::Versioned;
use crate::parser::{parse, Rf2Record};
use crate::types::SnomedResult;

/// Expected columns in a concept file.
const CONCEPT_COLUMNS: &[&str] = &[
    "id",
    "effectiveTime",
    "active",
    "moduleId",
    "definitionStatusId",
];

impl Rf2Record for Rf2Concept {
    const RECORD_NAME: &'static str = "Concept";
    const EXPECTED_COLUMNS: &'static [&'static str] = CONCEPT_COLUMNS;

    fn from_fields(fields: &[&str]) -> SnomedResult<Self> {
        Ok(Rf2Concept {
            id: parse::sctid(fields[0])?,
            effective_time: parse::effective_time(fields[1])?,
            active: parse::boolean(fields[2])?,
            module_id: parse::sctid(fields[3])?,
            definition_status_id: parse::sctid(fields[4])?,
        })
    }
}

impl Versioned for Rf2Concept {
    fn id(&self) -> SctId {
        self.id
    }

    fn effective_time(&self) -> EffectiveTime {
        self.effective_time
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SnomedError;
    use snomed_types::well_known;

    #[test]
    fn test_parse_concept_line() {
        let concept =
            Rf2Concept::parse_line("404684003\t20020131\t1\t900000000000207008\t900000000000074008")
                .unwrap();
        assert_eq!(concept.id, 404684003);
        assert_eq!(concept.effective_time.to_string(), "20020131");
        assert!(concept.active);
        assert_eq!(concept.module_id, 900000000000207008);
        assert_eq!(concept.definition_status_id, well_known::PRIMITIVE);
    }

    #[test]
    fn test_parse_inactive_concept() {
        let concept =
            Rf2Concept::parse_line("100005\t20020131\t0\t900000000000207008\t900000000000074008")
                .unwrap();
        assert!(!concept.active);
    }

    #[test]
    fn test_arity_must_be_exact() {
        let short = Rf2Concept::parse_line("100005\t20020131\t0\t900000000000207008");
        assert!(matches!(
            short,
            Err(SnomedError::FieldCount {
                record: "Concept",
                expected: 5,
                found: 4
            })
        ));

        let long = Rf2Concept::parse_line(
            "100005\t20020131\t0\t900000000000207008\t900000000000074008\textra",
        );
        assert!(matches!(long, Err(SnomedError::FieldCount { found: 6, .. })));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let result =
            Rf2Concept::parse_line("100005\t2002013\t1\t900000000000207008\t900000000000074008");
        assert!(matches!(result, Err(SnomedError::InvalidDate { .. })));
    }
}
