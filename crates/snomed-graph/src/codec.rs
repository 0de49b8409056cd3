//! Paired binary persistence for a [`ConceptStore`].
//!
//! Two streams are written side by side and only make sense together:
//!
//! - the data stream: a concept count, then per concept its id, name,
//!   synonyms, module name, definition-status name, effective time (as .NET
//!   ticks) and declared parent and child counts;
//! - the relationship stream: per concept (in data-stream order), per child,
//!   the child's id and the slot this concept occupies in the child's parent
//!   array.
//!
//! Parents are never written; the reader rebuilds them from the reverse
//! indices. All integers are little-endian. Strings are an `i32` count of
//! UTF-16 code units followed by the code units.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};

use snomed_types::{EffectiveTime, IsALinks, QueryConcept, SctId};
use tracing::{debug, info};

use crate::store::ConceptStore;
use crate::types::{DataLayout, SnomedError, SnomedResult};

impl ConceptStore {
    /// Writes the store to a data stream and a relationship stream.
    ///
    /// Fails with [`SnomedError::MissingReverseLink`] if some child does not
    /// list its parent, and [`SnomedError::UnresolvedSlot`] if a child slot
    /// was never filled.
    pub fn serialize<D: Write, R: Write>(
        &self,
        data: &mut D,
        relationships: &mut R,
    ) -> SnomedResult<()> {
        let ids = self.ids();
        wire::write_len(data, ids.len(), "concept count")?;

        let mut links = 0usize;
        for id in ids {
            let children = {
                let concept = self.concept(id)?;
                write_concept(data, &concept)?;
                child_ids(&concept)?
            };

            for child_id in children {
                let reverse_index = self
                    .concept(child_id)?
                    .is_a_parents
                    .position(id)
                    .ok_or(SnomedError::MissingReverseLink {
                        parent: id,
                        child: child_id,
                    })?;
                wire::write_id(relationships, child_id)?;
                wire::write_len(relationships, reverse_index, "reverse index")?;
                links += 1;
            }
        }

        data.flush()?;
        relationships.flush()?;
        debug!(concepts = self.len(), links, "serialized concept store");
        Ok(())
    }

    /// Reads a store back from the two streams written by
    /// [`ConceptStore::serialize`].
    ///
    /// The data stream is read completely before the relationship stream,
    /// which is sequenced by the data stream's concept order.
    pub fn deserialize<D: Read, R: Read>(mut data: D, mut relationships: R) -> SnomedResult<Self> {
        let count = wire::read_len(&mut data, "concept count")?;
        let store = ConceptStore::with_capacity(count.min(wire::PREALLOCATION_LIMIT));
        let mut order = Vec::with_capacity(count.min(wire::PREALLOCATION_LIMIT));

        for _ in 0..count {
            let concept = read_concept(&mut data)?;
            order.push(concept.id);
            store.insert(concept)?;
        }

        let mut links = 0usize;
        for &parent_id in &order {
            let child_count = store.concept(parent_id)?.is_a_children.len();
            for slot in 0..child_count {
                let child_id = wire::read_id(&mut relationships)?;
                let reverse_index = wire::read_len(&mut relationships, "reverse index")?;

                {
                    let mut child = store.concept_mut(child_id)?;
                    let len = child.is_a_parents.len();
                    if !child.is_a_parents.set(reverse_index, parent_id) {
                        return Err(SnomedError::SlotOutOfRange {
                            child: child_id,
                            index: reverse_index,
                            len,
                        });
                    }
                }
                store.concept_mut(parent_id)?.is_a_children.set(slot, child_id);
                links += 1;
            }
        }

        for id in &order {
            if let Some(slot) = store.concept(*id)?.is_a_parents.first_unset() {
                return Err(SnomedError::UnresolvedSlot { concept: *id, slot });
            }
        }

        debug!(concepts = store.len(), links, "deserialized concept store");
        Ok(store)
    }

    /// Writes the binary pair into the layout's `ParsedRecords` directory,
    /// creating it if needed.
    pub fn save(&self, layout: &DataLayout) -> SnomedResult<()> {
        fs::create_dir_all(layout.parsed_records_dir())?;
        let mut data = BufWriter::new(File::create(layout.data_path())?);
        let mut relationships = BufWriter::new(File::create(layout.relationships_path())?);
        self.serialize(&mut data, &mut relationships)?;
        info!(
            concepts = self.len(),
            path = %layout.parsed_records_dir().display(),
            "saved concept store"
        );
        Ok(())
    }

    /// Reads the binary pair from the layout's `ParsedRecords` directory.
    pub fn load(layout: &DataLayout) -> SnomedResult<Self> {
        let data = open(&layout.data_path())?;
        let relationships = open(&layout.relationships_path())?;
        let store = Self::deserialize(data, relationships)?;
        info!(
            concepts = store.len(),
            path = %layout.parsed_records_dir().display(),
            "loaded concept store"
        );
        Ok(store)
    }
}

fn open(path: &std::path::Path) -> SnomedResult<BufReader<File>> {
    if !path.exists() {
        return Err(SnomedError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(BufReader::new(File::open(path)?))
}

fn child_ids(concept: &QueryConcept) -> SnomedResult<Vec<SctId>> {
    (0..concept.is_a_children.len())
        .map(|slot| {
            concept
                .is_a_children
                .get(slot)
                .ok_or(SnomedError::UnresolvedSlot {
                    concept: concept.id,
                    slot,
                })
        })
        .collect()
}

fn write_concept<W: Write>(out: &mut W, concept: &QueryConcept) -> SnomedResult<()> {
    wire::write_id(out, concept.id)?;
    wire::write_string(out, &concept.fully_specified_name)?;
    wire::write_len(out, concept.synonyms.len(), "synonym count")?;
    for synonym in &concept.synonyms {
        wire::write_string(out, synonym)?;
    }
    wire::write_string(out, &concept.module)?;
    wire::write_string(out, &concept.definition_status)?;
    wire::write_i64(out, concept.effective_time.to_ticks())?;
    wire::write_len(out, concept.is_a_parents.len(), "parent count")?;
    wire::write_len(out, concept.is_a_children.len(), "child count")?;
    Ok(())
}

fn read_concept<R: Read>(input: &mut R) -> SnomedResult<QueryConcept> {
    let id = wire::read_id(input)?;
    let fully_specified_name = wire::read_string(input)?;
    let synonym_count = wire::read_len(input, "synonym count")?;
    let mut synonyms = Vec::with_capacity(synonym_count.min(wire::PREALLOCATION_LIMIT));
    for _ in 0..synonym_count {
        synonyms.push(wire::read_string(input)?);
    }
    let module = wire::read_string(input)?;
    let definition_status = wire::read_string(input)?;
    let ticks = wire::read_i64(input)?;
    let effective_time = EffectiveTime::from_ticks(ticks).ok_or_else(|| SnomedError::InvalidDate {
        value: ticks.to_string(),
    })?;
    let parent_count = wire::read_len(input, "parent count")?;
    let child_count = wire::read_len(input, "child count")?;

    let mut concept = QueryConcept::new(
        id,
        fully_specified_name,
        synonyms,
        module,
        definition_status,
        effective_time,
    );
    concept.is_a_parents = IsALinks::with_len(parent_count);
    concept.is_a_children = IsALinks::with_len(child_count);
    Ok(concept)
}

/// Primitive little-endian encoders and decoders.
pub mod wire {
    use std::io::{Read, Write};

    use snomed_types::SctId;

    use crate::types::{SnomedError, SnomedResult};

    /// Upper bound on speculative allocation from a length read off the wire.
    pub(crate) const PREALLOCATION_LIMIT: usize = 4096;

    /// Writes an `i32`.
    pub fn write_i32<W: Write>(out: &mut W, value: i32) -> SnomedResult<()> {
        out.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    /// Writes an `i64`.
    pub fn write_i64<W: Write>(out: &mut W, value: i64) -> SnomedResult<()> {
        out.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    /// Reads an `i32`.
    pub fn read_i32<R: Read>(input: &mut R) -> SnomedResult<i32> {
        let mut buf = [0u8; 4];
        input.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Reads an `i64`.
    pub fn read_i64<R: Read>(input: &mut R) -> SnomedResult<i64> {
        let mut buf = [0u8; 8];
        input.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Writes a count or index as a non-negative `i32`.
    pub fn write_len<W: Write>(out: &mut W, len: usize, what: &'static str) -> SnomedResult<()> {
        let value = i32::try_from(len).map_err(|_| SnomedError::InvalidLength {
            what,
            value: i64::try_from(len).unwrap_or(i64::MAX),
        })?;
        write_i32(out, value)
    }

    /// Reads a count or index, rejecting negative values.
    pub fn read_len<R: Read>(input: &mut R, what: &'static str) -> SnomedResult<usize> {
        let value = read_i32(input)?;
        usize::try_from(value).map_err(|_| SnomedError::InvalidLength {
            what,
            value: i64::from(value),
        })
    }

    /// Writes an SCTID as an `i64`.
    pub fn write_id<W: Write>(out: &mut W, id: SctId) -> SnomedResult<()> {
        let value = i64::try_from(id).map_err(|_| SnomedError::InvalidSctId {
            value: id.to_string(),
        })?;
        write_i64(out, value)
    }

    /// Reads an SCTID, rejecting negative values.
    pub fn read_id<R: Read>(input: &mut R) -> SnomedResult<SctId> {
        let value = read_i64(input)?;
        SctId::try_from(value).map_err(|_| SnomedError::InvalidSctId {
            value: value.to_string(),
        })
    }

    /// Writes a string as a UTF-16 code-unit count followed by the units.
    pub fn write_string<W: Write>(out: &mut W, value: &str) -> SnomedResult<()> {
        let units: Vec<u16> = value.encode_utf16().collect();
        write_len(out, units.len(), "string length")?;
        let bytes: Vec<u8> = units.iter().flat_map(|unit| unit.to_le_bytes()).collect();
        out.write_all(&bytes)?;
        Ok(())
    }

    /// Reads a string written by [`write_string`].
    pub fn read_string<R: Read>(input: &mut R) -> SnomedResult<String> {
        let len = read_len(input, "string length")?;
        let byte_len = len.checked_mul(2).ok_or(SnomedError::InvalidLength {
            what: "string length",
            value: len as i64,
        })?;

        let mut bytes = Vec::with_capacity(byte_len.min(PREALLOCATION_LIMIT));
        (&mut *input).take(byte_len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != byte_len {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }

        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).map_err(|_| SnomedError::InvalidString)
    }
}
