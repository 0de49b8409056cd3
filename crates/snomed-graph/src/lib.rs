//! # snomed-graph
//!
//! Builds an in-memory IS-A hierarchy from a SNOMED CT RF2 release, persists
//! it as a paired binary file set, and answers ancestor, descendant and
//! transitive-closure queries.
//!
//! ## Pipeline
//!
//! ```text
//! RF2 lines -> Rf2Parser -> version groups -> TerminologyBuilder
//!           -> ConceptStore -> (save / load) -> queries
//! ```
//!
//! ## Features
//!
//! - `parallel` (default): ingests the three release files and runs the
//!   cross-link passes on the rayon thread pool.
//!
//! ## Usage
//!
//! ```no_run
//! use snomed_graph::{
//!     discover_rf2_files, BuildConfig, ConceptStore, DataLayout, TerminologyBuilder,
//! };
//!
//! let layout = DataLayout::new("/data/snomed");
//! let files = discover_rf2_files(layout.raw_data_dir())?;
//! let graph = TerminologyBuilder::new(BuildConfig::default()).load_files(&files)?;
//! graph.store.save(&layout)?;
//!
//! let store = ConceptStore::load(&layout)?;
//! let ancestors = store.find_ancestors(22298006)?;
//! println!("{} ancestors", ancestors.len());
//! # Ok::<(), snomed_graph::SnomedError>(())
//! ```

#![warn(missing_docs)]

mod builder;
mod codec;
mod concept;
mod description;
mod group;
mod loader;
pub mod parser;
mod query;
mod relationship;
mod store;
mod types;

#[cfg(test)]
mod fixtures;

pub use builder::{IngestedRelease, LinkedRelease, SnomedGraph, TerminologyBuilder};
pub use codec::wire;
pub use group::{collect_groups, GroupCollector, GroupMap, VersionGroup, Versioned};
pub use loader::discover_rf2_files;
pub use parser::{parse_lines, Rf2Parser, Rf2Record};
pub use store::ConceptStore;
pub use types::{
    BuildConfig, DataLayout, ErrorKind, IngestStats, Rf2Files, SnomedError, SnomedResult,
};

// Re-export snomed-types for convenience
pub use snomed_types;
