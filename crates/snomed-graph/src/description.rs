//! SNOMED CT Description file parser.
//!
//! Parses sct2_Description_*.txt RF2 files.

use snomed_types::{EffectiveTime, Rf2Description, SctId};

use crate::group::Versioned;
use crate::parser::{parse, Rf2Record};
use crate::types::SnomedResult;

/// Expected columns in a description file.
const DESCRIPTION_COLUMNS: &[&str] = &[
    "id",
    "effectiveTime",
    "active",
    "moduleId",
    "conceptId",
    "languageCode",
    "typeId",
    "term",
    "caseSignificanceId",
];

impl Rf2Record for Rf2Description {
    const RECORD_NAME: &'static str = "Description";
    const EXPECTED_COLUMNS: &'static [&'static str] = DESCRIPTION_COLUMNS;

    fn from_fields(fields: &[&str]) -> SnomedResult<Self> {
        Ok(Rf2Description {
            id: parse::sctid(fields[0])?,
            effective_time: parse::effective_time(fields[1])?,
            active: parse::boolean(fields[2])?,
            module_id: parse::sctid(fields[3])?,
            concept_id: parse::sctid(fields[4])?,
            language_code: fields[5].to_string(),
            type_id: parse::sctid(fields[6])?,
            term: fields[7].to_string(),
            case_significance_id: parse::sctid(fields[8])?,
        })
    }
}

impl Versioned for Rf2Description {
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
