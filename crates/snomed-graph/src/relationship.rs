//! SNOMED CT Relationship file parser.
//!
//! Parses sct2_Relationship_*.txt RF2 files.

use snomed_types::{EffectiveTime, Rf2Relationship, SctId};

use crate::group::Versioned;
use crate::parser::{parse, Rf2Record};
use crate::types::SnomedResult;

/// Expected columns in a relationship file.
const RELATIONSHIP_COLUMNS: &[&str] = &[
    "id",
    "effectiveTime",
    "active",
    "moduleId",
    "sourceId",
    "destinationId",
    "relationshipGroup",
    "typeId",
    "characteristicTypeId",
    "modifierId",
];

impl Rf2Record for Rf2Relationship {
    const RECORD_NAME: &'static str = "Relationship";
    const EXPECTED_COLUMNS: &'static [&'static str] = RELATIONSHIP_COLUMNS;

    fn from_fields(fields: &[&str]) -> SnomedResult<Self> {
        Ok(Rf2Relationship {
            id: parse::sctid(fields[0])?,
            effective_time: parse::effective_time(fields[1])?,
            active: parse::boolean(fields[2])?,
            module_id: parse::sctid(fields[3])?,
            source_id: parse::sctid(fields[4])?,
            destination_id: parse::sctid(fields[5])?,
            relationship_group: parse::integer(fields[6])?,
            type_id: parse::sctid(fields[7])?,
            characteristic_type_id: parse::sctid(fields[8])?,
            modifier_id: parse::sctid(fields[9])?,
        })
    }
}

impl Versioned for Rf2Relationship {
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
    fn test_parse_relationship_line() {
        let rel = Rf2Relationship::parse_line(
            "100000028\t20020131\t1\t900000000000207008\t73211009\t362969004\t0\t116680003\t900000000000011006\t900000000000451002",
        )
        .unwrap();
        assert_eq!(rel.id, 100000028);
        assert_eq!(rel.source_id, 73211009);
        assert_eq!(rel.destination_id, 362969004);
        assert_eq!(rel.relationship_group, 0);
        assert_eq!(rel.type_id, well_known::IS_A);
    }

    #[test]
    fn test_bad_group_number() {
        let result = Rf2Relationship::parse_line(
            "100000028\t20020131\t1\t900000000000207008\t73211009\t362969004\tx\t116680003\t900000000000011006\t900000000000451002",
        );
        assert!(matches!(result, Err(SnomedError::InvalidInteger { .. })));
    }
}
