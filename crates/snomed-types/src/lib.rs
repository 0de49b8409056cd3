//! # snomed-types
//!
//! Type definitions for SNOMED CT release rows and the IS-A query graph.
//!
//! Raw RF2 rows ([`Rf2Concept`], [`Rf2Description`], [`Rf2Relationship`]) are
//! what the release files contain, one row per version. [`QueryConcept`] is
//! what survives into the finished hierarchy graph.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!
//! ## Usage
//!
//! ```rust
//! use snomed_types::{well_known, EffectiveTime, Rf2Concept};
//!
//! let concept = Rf2Concept {
//!     id: well_known::SNOMED_CT_ROOT,
//!     effective_time: EffectiveTime::from_yyyymmdd("20020131").unwrap(),
//!     active: true,
//!     module_id: well_known::SNOMED_CT_CORE_MODULE,
//!     definition_status_id: well_known::PRIMITIVE,
//! };
//!
//! assert_eq!(concept.effective_time.to_string(), "20020131");
//! ```

#![warn(missing_docs)]

mod concept;
mod description;
mod effective_time;
mod query_concept;
mod relationship;
mod sctid;
pub mod well_known;

pub use concept::Rf2Concept;
pub use description::Rf2Description;
pub use effective_time::EffectiveTime;
pub use query_concept::{IsALinks, QueryConcept};
pub use relationship::Rf2Relationship;
pub use sctid::SctId;
