//! Errors, configuration and file-set types shared by the graph pipeline.

use std::path::{Path, PathBuf};

use snomed_types::{well_known, EffectiveTime, SctId};
use thiserror::Error;

/// Errors that can occur while loading, linking, persisting or querying.
#[derive(Error, Debug)]
pub enum SnomedError {
    /// I/O error on an input or output stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid SCTID format.
    #[error("Invalid SCTID format: {value}")]
    InvalidSctId {
        /// The invalid value that was encountered.
        value: String,
    },

    /// Effective time is not an 8-digit YYYYMMDD calendar date.
    #[error("Invalid date format: {value} (expected YYYYMMDD)")]
    InvalidDate {
        /// The invalid date value.
        value: String,
    },

    /// Invalid boolean value.
    #[error("Invalid boolean value: {value} (expected 0 or 1)")]
    InvalidBoolean {
        /// The invalid boolean value.
        value: String,
    },

    /// Invalid integer value.
    #[error("Invalid integer value: {value}")]
    InvalidInteger {
        /// The invalid integer value.
        value: String,
    },

    /// A data line has the wrong number of tab-separated fields.
    #[error("Invalid {record} line: expected {expected} fields, found {found}")]
    FieldCount {
        /// Record kind being parsed.
        record: &'static str,
        /// Expected field count.
        expected: usize,
        /// Found field count.
        found: usize,
    },

    /// Invalid header - column count mismatch.
    #[error("Invalid header: expected {expected} columns, found {found}")]
    InvalidHeader {
        /// Expected column count.
        expected: usize,
        /// Found column count.
        found: usize,
    },

    /// Unexpected column name.
    #[error("Unexpected column '{found}' at position {position}, expected '{expected}'")]
    UnexpectedColumn {
        /// The column position.
        position: usize,
        /// Expected column name.
        expected: String,
        /// Found column name.
        found: String,
    },

    /// A persisted string is not valid UTF-16.
    #[error("Invalid UTF-16 string in binary stream")]
    InvalidString,

    /// A persisted count or index is negative or out of range.
    #[error("Invalid {what} in binary stream: {value}")]
    InvalidLength {
        /// Which field was invalid.
        what: &'static str,
        /// The raw value read.
        value: i64,
    },

    /// A reverse index points past the end of the child's parent array.
    #[error("Reverse index {index} out of range for concept {child} with {len} parents")]
    SlotOutOfRange {
        /// The child concept.
        child: SctId,
        /// The offending index.
        index: usize,
        /// Declared parent count of the child.
        len: usize,
    },

    /// A parent slot was never filled by the relationship stream.
    #[error("Parent slot {slot} of concept {concept} was never linked")]
    UnresolvedSlot {
        /// The concept with the unfilled slot.
        concept: SctId,
        /// The unfilled slot index.
        slot: usize,
    },

    /// Referenced concept is not present.
    #[error("Concept {id} not found")]
    ConceptNotFound {
        /// The missing concept id.
        id: SctId,
    },

    /// A description references a type concept that is not present.
    #[error("Description type concept {type_id} of description {description_id} not found")]
    DescriptionTypeNotFound {
        /// The description referencing the type.
        description_id: SctId,
        /// The missing type concept.
        type_id: SctId,
    },

    /// Referenced relationship is not present.
    #[error("Relationship {id} not found")]
    RelationshipNotFound {
        /// The missing relationship id.
        id: SctId,
    },

    /// The same concept id was inserted twice.
    #[error("Concept {id} already present")]
    DuplicateConcept {
        /// The repeated id.
        id: SctId,
    },

    /// A child does not list its parent, so no reverse index exists.
    #[error("Concept {child} is a child of {parent} but does not list it as a parent")]
    MissingReverseLink {
        /// The parent being serialized.
        parent: SctId,
        /// The child lacking the back-reference.
        child: SctId,
    },

    /// No concept carries the root label.
    #[error("No concept named '{label}' found")]
    RootNotFound {
        /// The label searched for.
        label: String,
    },

    /// More than one concept carries the root label.
    #[error("{count} concepts named '{label}' found")]
    AmbiguousRoot {
        /// The label searched for.
        label: String,
        /// How many concepts matched.
        count: usize,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Directory not found.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Required file missing from RF2 directory.
    #[error("Required RF2 file not found: {file_type} in {directory}")]
    RequiredFileMissing {
        /// The type of file that was missing.
        file_type: String,
        /// The directory that was searched.
        directory: String,
    },
}

/// Coarse classification of [`SnomedError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed line, header, date, boolean or binary field.
    Format,
    /// A referenced id is absent.
    Lookup,
    /// An id was inserted twice.
    DuplicateKey,
    /// A symmetric back-reference is missing.
    Integrity,
    /// The root label matched zero or several concepts.
    Ambiguity,
    /// Underlying I/O or file discovery failure.
    Io,
}

impl SnomedError {
    /// Returns the taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Csv(_)
            | Self::InvalidSctId { .. }
            | Self::InvalidDate { .. }
            | Self::InvalidBoolean { .. }
            | Self::InvalidInteger { .. }
            | Self::FieldCount { .. }
            | Self::InvalidHeader { .. }
            | Self::UnexpectedColumn { .. }
            | Self::InvalidString
            | Self::InvalidLength { .. }
            | Self::SlotOutOfRange { .. }
            | Self::UnresolvedSlot { .. } => ErrorKind::Format,
            Self::ConceptNotFound { .. }
            | Self::DescriptionTypeNotFound { .. }
            | Self::RelationshipNotFound { .. } => ErrorKind::Lookup,
            Self::DuplicateConcept { .. } => ErrorKind::DuplicateKey,
            Self::MissingReverseLink { .. } => ErrorKind::Integrity,
            Self::RootNotFound { .. } | Self::AmbiguousRoot { .. } => ErrorKind::Ambiguity,
            Self::Io(_)
            | Self::FileNotFound { .. }
            | Self::DirectoryNotFound { .. }
            | Self::RequiredFileMissing { .. } => ErrorKind::Io,
        }
    }
}

/// Result type for graph operations.
pub type SnomedResult<T> = Result<T, SnomedError>;

/// Configuration for building the IS-A graph from a release.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Fully specified name of the single root concept.
    pub root_label: String,
    /// Relationship type that forms the hierarchy.
    pub is_a_type_id: SctId,
    /// Description type of fully specified names.
    pub fsn_type_id: SctId,
    /// Description type of synonyms.
    pub synonym_type_id: SctId,
    /// Language whose FSN is preferred during name resolution.
    pub language_code: String,
    /// Versions dated after this are ignored. `None` means today.
    pub evaluation_date: Option<EffectiveTime>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root_label: well_known::ROOT_CONCEPT_LABEL.to_string(),
            is_a_type_id: well_known::IS_A,
            fsn_type_id: well_known::FULLY_SPECIFIED_NAME,
            synonym_type_id: well_known::SYNONYM,
            language_code: well_known::PREFERRED_LANGUAGE.to_string(),
            evaluation_date: None,
        }
    }
}

impl BuildConfig {
    /// Evaluation date to resolve current versions against.
    pub fn effective_date(&self) -> EffectiveTime {
        self.evaluation_date.unwrap_or_else(EffectiveTime::today)
    }
}

/// On-disk layout of a data directory.
///
/// ```text
/// {base}/
///   RawData/         release files, only read when building
///   ParsedRecords/   the persisted binary pair
/// ```
#[derive(Debug, Clone)]
pub struct DataLayout {
    base_dir: PathBuf,
}

impl DataLayout {
    /// File name of the concept data stream.
    pub const DATA_FILE: &'static str = "SnomedQueryConcepts.Data.ser";
    /// File name of the IS-A relationship stream.
    pub const RELATIONSHIPS_FILE: &'static str = "SnomedQueryConcepts.IsARelationships.ser";

    /// Creates a layout rooted at `base_dir`.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the raw release.
    pub fn raw_data_dir(&self) -> PathBuf {
        self.base_dir.join("RawData")
    }

    /// Directory holding the persisted binary pair.
    pub fn parsed_records_dir(&self) -> PathBuf {
        self.base_dir.join("ParsedRecords")
    }

    /// Path of the concept data stream.
    pub fn data_path(&self) -> PathBuf {
        self.parsed_records_dir().join(Self::DATA_FILE)
    }

    /// Path of the IS-A relationship stream.
    pub fn relationships_path(&self) -> PathBuf {
        self.parsed_records_dir().join(Self::RELATIONSHIPS_FILE)
    }
}

/// Discovered RF2 files in a release directory.
#[derive(Debug, Clone, Default)]
pub struct Rf2Files {
    /// Path to concept file.
    pub concept_file: Option<PathBuf>,
    /// Path to description file.
    pub description_file: Option<PathBuf>,
    /// Path to relationship file.
    pub relationship_file: Option<PathBuf>,
    /// Release date extracted from filename (YYYYMMDD).
    pub release_date: Option<String>,
}

impl Rf2Files {
    /// Creates a new empty Rf2Files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if all required files (concept, description, relationship) are present.
    pub fn has_required_files(&self) -> bool {
        self.concept_file.is_some()
            && self.description_file.is_some()
            && self.relationship_file.is_some()
    }

    /// Returns a list of missing required files.
    pub fn missing_files(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.concept_file.is_none() {
            missing.push("Concept");
        }
        if self.description_file.is_none() {
            missing.push("Description");
        }
        if self.relationship_file.is_none() {
            missing.push("Relationship");
        }
        missing
    }
}

/// Counts gathered while ingesting a release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Concept rows read.
    pub concept_rows: usize,
    /// Distinct concept ids.
    pub concept_groups: usize,
    /// Description rows read.
    pub description_rows: usize,
    /// Distinct description ids.
    pub description_groups: usize,
    /// Relationship rows read.
    pub relationship_rows: usize,
    /// Distinct relationship ids.
    pub relationship_groups: usize,
}
