//! A small synthetic release shared by the unit tests.
//!
//! Hierarchy (child IS-A parent): A -> B -> C -> root. D once was an A but
//! that relationship was retired in 2010. A also has a non-IS-A attribute
//! pointing at C.

use std::fs;
use std::path::Path;

use snomed_types::{well_known, EffectiveTime, Rf2Concept, Rf2Description, Rf2Relationship, SctId};

use crate::builder::{SnomedGraph, TerminologyBuilder};
use crate::parser::Rf2Record;
use crate::types::{BuildConfig, SnomedResult};

pub(crate) const CORE_MODULE: SctId = well_known::SNOMED_CT_CORE_MODULE;
pub(crate) const PRIMITIVE: SctId = well_known::PRIMITIVE;
pub(crate) const FSN: SctId = well_known::FULLY_SPECIFIED_NAME;
pub(crate) const SYNONYM: SctId = well_known::SYNONYM;
pub(crate) const IS_A: SctId = well_known::IS_A;
const FINDING_SITE: SctId = 363698007;
const CASE_INSENSITIVE: SctId = 900000000000448009;
const INFERRED: SctId = 900000000000011006;
const EXISTENTIAL: SctId = 900000000000451002;
const FIRST_RELEASE: &str = "20020131";

#[derive(Debug, Clone)]
pub(crate) struct Fixture {
    pub concepts: Vec<String>,
    pub descriptions: Vec<String>,
    pub relationships: Vec<String>,
}

impl Fixture {
    pub const ROOT: SctId = well_known::SNOMED_CT_ROOT;
    pub const A: SctId = 1001;
    pub const B: SctId = 1002;
    pub const C: SctId = 1003;
    pub const D: SctId = 1004;
    pub const RETIRED_IS_A: SctId = 3005;

    /// Headers only.
    pub fn empty() -> Self {
        Self {
            concepts: vec![Rf2Concept::EXPECTED_COLUMNS.join("\t")],
            descriptions: vec![Rf2Description::EXPECTED_COLUMNS.join("\t")],
            relationships: vec![Rf2Relationship::EXPECTED_COLUMNS.join("\t")],
        }
    }

    pub fn standard() -> Self {
        let mut fixture = Self::empty();

        let named = [
            (Self::ROOT, well_known::ROOT_CONCEPT_LABEL),
            (CORE_MODULE, "SNOMED CT core module (core metadata concept)"),
            (PRIMITIVE, "Primitive (core metadata concept)"),
            (FSN, "Fully specified name (core metadata concept)"),
            (SYNONYM, "Synonym (core metadata concept)"),
            (IS_A, "Is a (attribute)"),
            (Self::A, "Concept A (finding)"),
            (Self::B, "Concept B (finding)"),
            (Self::C, "Concept C (finding)"),
            (Self::D, "Concept D (finding)"),
        ];
        for (index, (id, name)) in named.into_iter().enumerate() {
            fixture.concept(id);
            fixture.description(2001 + index as SctId, id, "en", FSN, name);
        }

        fixture.description(2101, Self::ROOT, "en", SYNONYM, "SNOMED CT Concept");
        fixture.description(2102, Self::A, "en", SYNONYM, "Alpha");
        fixture.description(2103, Self::A, "en", SYNONYM, "A synonym");
        fixture.description_version(2104, Self::A, SYNONYM, "Old alpha", true, FIRST_RELEASE);
        fixture.description_version(2104, Self::A, SYNONYM, "Old alpha", false, "20080131");

        fixture.is_a(3001, Self::A, Self::B, true, FIRST_RELEASE);
        fixture.is_a(3002, Self::B, Self::C, true, FIRST_RELEASE);
        fixture.is_a(3003, Self::C, Self::ROOT, true, FIRST_RELEASE);
        fixture.relationship(3004, Self::A, Self::C, FINDING_SITE, true, FIRST_RELEASE);
        fixture.is_a(Self::RETIRED_IS_A, Self::D, Self::A, true, FIRST_RELEASE);
        fixture.is_a(Self::RETIRED_IS_A, Self::D, Self::A, false, "20100131");

        fixture
    }

    /// Evaluates versions as of mid 2016 so tests do not depend on today.
    pub fn config() -> BuildConfig {
        BuildConfig {
            evaluation_date: EffectiveTime::from_ymd(2016, 7, 31),
            ..BuildConfig::default()
        }
    }

    pub fn concept(&mut self, id: SctId) {
        self.concepts
            .push(format!("{id}\t{FIRST_RELEASE}\t1\t{CORE_MODULE}\t{PRIMITIVE}"));
    }

    pub fn description(
        &mut self,
        id: SctId,
        concept: SctId,
        language: &str,
        type_id: SctId,
        term: &str,
    ) {
        self.descriptions.push(format!(
            "{id}\t{FIRST_RELEASE}\t1\t{CORE_MODULE}\t{concept}\t{language}\t{type_id}\t{term}\t{CASE_INSENSITIVE}"
        ));
    }

    pub fn description_version(
        &mut self,
        id: SctId,
        concept: SctId,
        type_id: SctId,
        term: &str,
        active: bool,
        date: &str,
    ) {
        let active = u8::from(active);
        self.descriptions.push(format!(
            "{id}\t{date}\t{active}\t{CORE_MODULE}\t{concept}\ten\t{type_id}\t{term}\t{CASE_INSENSITIVE}"
        ));
    }

    pub fn is_a(&mut self, id: SctId, child: SctId, parent: SctId, active: bool, date: &str) {
        self.relationship(id, child, parent, IS_A, active, date);
    }

    pub fn relationship(
        &mut self,
        id: SctId,
        source: SctId,
        destination: SctId,
        type_id: SctId,
        active: bool,
        date: &str,
    ) {
        let active = u8::from(active);
        self.relationships.push(format!(
            "{id}\t{date}\t{active}\t{CORE_MODULE}\t{source}\t{destination}\t0\t{type_id}\t{INFERRED}\t{EXISTENTIAL}"
        ));
    }

    pub fn build(&self) -> SnomedResult<SnomedGraph> {
        self.build_with(Self::config())
    }

    pub fn build_with(&self, config: BuildConfig) -> SnomedResult<SnomedGraph> {
        TerminologyBuilder::new(config).load_lines(
            &self.concepts,
            &self.descriptions,
            &self.relationships,
        )
    }

    /// Writes the release as RF2 files under `{dir}/{flavour}/Terminology`.
    pub fn write_release(&self, dir: &Path, flavour: &str) -> std::io::Result<()> {
        let terminology = dir.join(flavour).join("Terminology");
        fs::create_dir_all(&terminology)?;

        let files = [
            (format!("sct2_Concept_{flavour}_INT_20160731.txt"), &self.concepts),
            (format!("sct2_Description_{flavour}-en_INT_20160731.txt"), &self.descriptions),
            (format!("sct2_Relationship_{flavour}_INT_20160731.txt"), &self.relationships),
        ];
        for (name, lines) in files {
            let mut text = lines.join("\r\n");
            text.push_str("\r\n");
            fs::write(terminology.join(name), text)?;
        }
        Ok(())
    }
}
