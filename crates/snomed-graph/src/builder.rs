//! Builds the IS-A query graph from the three release streams.
//!
//! The build runs in three phases, each a barrier for the next:
//!
//! 1. [`TerminologyBuilder::ingest`] drains the concept, description and
//!    relationship streams concurrently, each into its own map of version
//!    groups.
//! 2. [`IngestedRelease::cross_link`] resolves every active description and
//!    relationship against the concepts, concurrently, into frozen link
//!    tables, then finds the root concept by label.
//! 3. [`LinkedRelease::into_graph`] creates one [`QueryConcept`] per active
//!    concept and freezes the IS-A parent and child lists into each node.
//!
//! Any error aborts the build; no partial graph is returned.

use std::collections::HashMap;

use dashmap::mapref::one::Ref;
use dashmap::DashMap;
use snomed_types::{
    EffectiveTime, IsALinks, QueryConcept, Rf2Concept, Rf2Description, Rf2Relationship, SctId,
};
use tracing::{debug, info};

use crate::group::{collect_groups, GroupMap, VersionGroup};
use crate::parser::{parse_lines, Rf2Parser};
use crate::store::ConceptStore;
use crate::types::{BuildConfig, IngestStats, Rf2Files, SnomedError, SnomedResult};

/// Runs two closures, in parallel when the `parallel` feature is enabled.
#[cfg(feature = "parallel")]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    rayon::join(a, b)
}

#[cfg(not(feature = "parallel"))]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    (a(), b())
}

/// The finished graph: a populated store and the id of its root concept.
#[derive(Debug)]
pub struct SnomedGraph {
    /// All concept nodes.
    pub store: ConceptStore,
    /// The concept whose name matched the configured root label.
    pub root_id: SctId,
}

/// Entry point of the build pipeline.
///
/// # Example
///
/// ```no_run
/// use snomed_graph::{discover_rf2_files, BuildConfig, TerminologyBuilder};
///
/// let files = discover_rf2_files("/data/snomed/RawData")?;
/// let graph = TerminologyBuilder::new(BuildConfig::default()).load_files(&files)?;
/// println!("root {} with {} concepts", graph.root_id, graph.store.len());
/// # Ok::<(), snomed_graph::SnomedError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TerminologyBuilder {
    config: BuildConfig,
}

impl TerminologyBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Drains the three record streams into version groups.
    ///
    /// The streams are consumed concurrently. The first error from any of
    /// them fails the whole ingest.
    pub fn ingest<C, D, R>(
        &self,
        concepts: C,
        descriptions: D,
        relationships: R,
    ) -> SnomedResult<IngestedRelease>
    where
        C: IntoIterator<Item = SnomedResult<Rf2Concept>> + Send,
        D: IntoIterator<Item = SnomedResult<Rf2Description>> + Send,
        R: IntoIterator<Item = SnomedResult<Rf2Relationship>> + Send,
    {
        let concept_groups = GroupMap::new();
        let description_groups = GroupMap::new();
        let relationship_groups = GroupMap::new();

        let (concept_rows, (description_rows, relationship_rows)) = join(
            || collect_groups(concepts, &concept_groups),
            || {
                join(
                    || collect_groups(descriptions, &description_groups),
                    || collect_groups(relationships, &relationship_groups),
                )
            },
        );

        let stats = IngestStats {
            concept_rows: concept_rows?,
            concept_groups: concept_groups.len(),
            description_rows: description_rows?,
            description_groups: description_groups.len(),
            relationship_rows: relationship_rows?,
            relationship_groups: relationship_groups.len(),
        };

        info!(
            concepts = stats.concept_groups,
            descriptions = stats.description_groups,
            relationships = stats.relationship_groups,
            rows = stats.concept_rows + stats.description_rows + stats.relationship_rows,
            "ingested release"
        );

        Ok(IngestedRelease {
            now: self.config.effective_date(),
            config: self.config.clone(),
            concepts: concept_groups,
            descriptions: description_groups,
            relationships: relationship_groups,
            stats,
        })
    }

    /// Parses three sequences of text lines, each starting with its header,
    /// and builds the graph.
    pub fn load_lines<C, D, R>(
        &self,
        concepts: C,
        descriptions: D,
        relationships: R,
    ) -> SnomedResult<SnomedGraph>
    where
        C: IntoIterator + Send,
        C::Item: AsRef<str> + Send,
        C::IntoIter: Send,
        D: IntoIterator + Send,
        D::Item: AsRef<str> + Send,
        D::IntoIter: Send,
        R: IntoIterator + Send,
        R::Item: AsRef<str> + Send,
        R::IntoIter: Send,
    {
        self.ingest(
            parse_lines::<Rf2Concept, _>(concepts),
            parse_lines::<Rf2Description, _>(descriptions),
            parse_lines::<Rf2Relationship, _>(relationships),
        )?
        .cross_link()?
        .into_graph()
    }

    /// Opens the three release files and builds the graph.
    ///
    /// All headers are checked before any row is read.
    pub fn load_files(&self, files: &Rf2Files) -> SnomedResult<SnomedGraph> {
        let directory = || {
            files
                .concept_file
                .as_ref()
                .and_then(|path| path.parent())
                .map(|dir| dir.display().to_string())
                .unwrap_or_default()
        };
        let missing = |file_type: &str| SnomedError::RequiredFileMissing {
            file_type: file_type.to_string(),
            directory: directory(),
        };

        let concept_path = files.concept_file.as_ref().ok_or_else(|| missing("Concept"))?;
        let description_path = files
            .description_file
            .as_ref()
            .ok_or_else(|| missing("Description"))?;
        let relationship_path = files
            .relationship_file
            .as_ref()
            .ok_or_else(|| missing("Relationship"))?;

        info!(
            release = files.release_date.as_deref().unwrap_or("unknown"),
            "loading release files"
        );

        let concepts = Rf2Parser::<_, Rf2Concept>::from_path(concept_path)?;
        let descriptions = Rf2Parser::<_, Rf2Description>::from_path(description_path)?;
        let relationships = Rf2Parser::<_, Rf2Relationship>::from_path(relationship_path)?;

        self.ingest(concepts, descriptions, relationships)?
            .cross_link()?
            .into_graph()
    }
}

/// Version groups of all three streams, before cross-linking.
#[derive(Debug)]
pub struct IngestedRelease {
    config: BuildConfig,
    now: EffectiveTime,
    concepts: GroupMap<Rf2Concept>,
    descriptions: GroupMap<Rf2Description>,
    relationships: GroupMap<Rf2Relationship>,
    stats: IngestStats,
}

impl IngestedRelease {
    /// Row and group counts gathered during ingest.
    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Date versions are resolved against.
    pub fn evaluation_date(&self) -> EffectiveTime {
        self.now
    }

    /// Version group of a concept.
    pub fn concept_group(
        &self,
        id: SctId,
    ) -> Option<Ref<'_, SctId, VersionGroup<Rf2Concept>>> {
        self.concepts.get(&id)
    }

    /// Version group of a description.
    pub fn description_group(
        &self,
        id: SctId,
    ) -> Option<Ref<'_, SctId, VersionGroup<Rf2Description>>> {
        self.descriptions.get(&id)
    }

    /// Version group of a relationship.
    pub fn relationship_group(
        &self,
        id: SctId,
    ) -> Option<Ref<'_, SctId, VersionGroup<Rf2Relationship>>> {
        self.relationships.get(&id)
    }

    /// Attaches active relationships and descriptions to their concepts and
    /// resolves the root concept.
    ///
    /// The relationship, description and concept passes write disjoint link
    /// tables and run concurrently.
    pub fn cross_link(self) -> SnomedResult<LinkedRelease> {
        let outgoing = DashMap::new();
        let incoming = DashMap::new();
        let descriptions = DashMap::new();

        let (relationship_links, (description_links, concept_links)) = join(
            || self.link_relationships(&outgoing, &incoming),
            || {
                join(
                    || self.link_descriptions(&descriptions),
                    || self.link_concepts(),
                )
            },
        );
        relationship_links?;
        description_links?;
        concept_links?;

        debug!(
            sources = outgoing.len(),
            destinations = incoming.len(),
            described = descriptions.len(),
            "cross-linked release"
        );

        let mut linked = LinkedRelease {
            release: self,
            outgoing: outgoing.into_iter().collect(),
            incoming: incoming.into_iter().collect(),
            descriptions: descriptions.into_iter().collect(),
            root_id: 0,
        };
        linked.root_id = linked.find_root()?;
        info!(root = linked.root_id, "resolved root concept");
        Ok(linked)
    }

    fn link_relationships(
        &self,
        outgoing: &DashMap<SctId, Vec<SctId>>,
        incoming: &DashMap<SctId, Vec<SctId>>,
    ) -> SnomedResult<()> {
        for entry in self.relationships.iter() {
            let Some(relationship) = entry.value().active_at(self.now) else {
                continue;
            };
            self.require_concept(relationship.source_id)?;
            self.require_concept(relationship.destination_id)?;
            attach(outgoing, relationship.source_id, relationship.id);
            attach(incoming, relationship.destination_id, relationship.id);
        }
        Ok(())
    }

    fn link_descriptions(&self, attached: &DashMap<SctId, Vec<SctId>>) -> SnomedResult<()> {
        for entry in self.descriptions.iter() {
            let Some(description) = entry.value().active_at(self.now) else {
                continue;
            };
            self.require_concept(description.concept_id)?;
            if !self.concepts.contains_key(&description.type_id) {
                return Err(SnomedError::DescriptionTypeNotFound {
                    description_id: description.id,
                    type_id: description.type_id,
                });
            }
            attach(attached, description.concept_id, description.id);
        }
        Ok(())
    }

    /// Per-concept consistency pass. No rule is enforced yet.
    fn link_concepts(&self) -> SnomedResult<()> {
        Ok(())
    }

    fn require_concept(&self, id: SctId) -> SnomedResult<()> {
        if self.concepts.contains_key(&id) {
            Ok(())
        } else {
            Err(SnomedError::ConceptNotFound { id })
        }
    }
}

fn attach(links: &DashMap<SctId, Vec<SctId>>, owner: SctId, id: SctId) {
    let mut list = links.entry(owner).or_default();
    if !list.contains(&id) {
        list.push(id);
    }
}

/// A cross-linked release with a resolved root, ready to become a graph.
#[derive(Debug)]
pub struct LinkedRelease {
    release: IngestedRelease,
    outgoing: HashMap<SctId, Vec<SctId>>,
    incoming: HashMap<SctId, Vec<SctId>>,
    descriptions: HashMap<SctId, Vec<SctId>>,
    root_id: SctId,
}

impl LinkedRelease {
    /// Id of the concept whose name matched the root label.
    pub fn root_id(&self) -> SctId {
        self.root_id
    }

    /// The ingested release underneath the link tables.
    pub fn release(&self) -> &IngestedRelease {
        &self.release
    }

    /// Resolved name of a concept: its FSN in the configured language, else
    /// any FSN, else an empty string.
    pub fn resolve_name(&self, concept_id: SctId) -> String {
        let config = &self.release.config;
        let mut fallback = None;

        for description in self.active_descriptions(concept_id) {
            if description.type_id != config.fsn_type_id {
                continue;
            }
            if description.is_language(&config.language_code) {
                return description.term;
            }
            if fallback.is_none() {
                fallback = Some(description.term);
            }
        }
        fallback.unwrap_or_default()
    }

    /// Sorted active synonym terms of a concept.
    pub fn synonyms(&self, concept_id: SctId) -> Vec<String> {
        let config = &self.release.config;
        let mut synonyms = Vec::new();

        for description in self.active_descriptions(concept_id) {
            if description.type_id == config.synonym_type_id {
                synonyms.push(description.term);
            } else if description.type_id != config.fsn_type_id {
                debug!(
                    concept = concept_id,
                    description = description.id,
                    type_id = description.type_id,
                    "skipping description of unhandled type"
                );
            }
        }
        synonyms.sort();
        synonyms
    }

    /// Active relationships whose source is `concept_id`.
    pub fn outgoing_relationships(
        &self,
        concept_id: SctId,
    ) -> SnomedResult<Vec<Rf2Relationship>> {
        self.resolve_relationships(self.outgoing.get(&concept_id))
    }

    /// Active relationships whose destination is `concept_id`.
    pub fn incoming_relationships(
        &self,
        concept_id: SctId,
    ) -> SnomedResult<Vec<Rf2Relationship>> {
        self.resolve_relationships(self.incoming.get(&concept_id))
    }

    /// Creates the concept nodes and wires the IS-A hierarchy.
    pub fn into_graph(self) -> SnomedResult<SnomedGraph> {
        let now = self.release.now;
        let active: Vec<Rf2Concept> = self
            .release
            .concepts
            .iter()
            .filter_map(|entry| entry.value().active_at(now).cloned())
            .collect();

        let store = ConceptStore::with_capacity(active.len());
        for concept in &active {
            store.insert(self.create_node(concept)?)?;
        }

        let edges = self.link_hierarchy(&store)?;
        info!(
            concepts = store.len(),
            edges,
            root = self.root_id,
            "built IS-A graph"
        );

        Ok(SnomedGraph {
            store,
            root_id: self.root_id,
        })
    }

    fn create_node(&self, concept: &Rf2Concept) -> SnomedResult<QueryConcept> {
        Ok(QueryConcept::new(
            concept.id,
            self.resolve_name(concept.id),
            self.synonyms(concept.id),
            self.referenced_name(concept.module_id)?,
            self.referenced_name(concept.definition_status_id)?,
            concept.effective_time,
        ))
    }

    fn referenced_name(&self, concept_id: SctId) -> SnomedResult<String> {
        self.release.require_concept(concept_id)?;
        Ok(self.resolve_name(concept_id))
    }

    /// Collects active IS-A pairs into temporary lists, then freezes them into
    /// each node's fixed-size arrays. Returns the number of distinct edges.
    fn link_hierarchy(&self, store: &ConceptStore) -> SnomedResult<usize> {
        let is_a = self.release.config.is_a_type_id;
        let mut parents: HashMap<SctId, Vec<SctId>> = HashMap::new();
        let mut children: HashMap<SctId, Vec<SctId>> = HashMap::new();
        let mut edges = 0usize;

        for entry in self.release.relationships.iter() {
            let Some(relationship) = entry.value().active_at(self.release.now) else {
                continue;
            };
            if relationship.type_id != is_a {
                continue;
            }

            let (child, parent) = (relationship.source_id, relationship.destination_id);
            if !store.contains(child) {
                return Err(SnomedError::ConceptNotFound { id: child });
            }
            if !store.contains(parent) {
                return Err(SnomedError::ConceptNotFound { id: parent });
            }

            let child_parents = parents.entry(child).or_default();
            if child_parents.contains(&parent) {
                continue;
            }
            child_parents.push(parent);
            children.entry(parent).or_default().push(child);
            edges += 1;
        }

        for (id, mut ids) in parents {
            ids.sort_unstable();
            store.concept_mut(id)?.is_a_parents = IsALinks::from_ids(ids);
        }
        for (id, mut ids) in children {
            ids.sort_unstable();
            store.concept_mut(id)?.is_a_children = IsALinks::from_ids(ids);
        }
        Ok(edges)
    }

    fn find_root(&self) -> SnomedResult<SctId> {
        let label = self.release.config.root_label.trim().to_lowercase();
        let now = self.release.now;

        let matches: Vec<SctId> = self
            .release
            .concepts
            .iter()
            .filter(|entry| entry.value().active_at(now).is_some())
            .map(|entry| *entry.key())
            .filter(|&id| self.resolve_name(id).trim().to_lowercase() == label)
            .collect();

        match matches.as_slice() {
            [root] => Ok(*root),
            [] => Err(SnomedError::RootNotFound {
                label: self.release.config.root_label.clone(),
            }),
            _ => Err(SnomedError::AmbiguousRoot {
                label: self.release.config.root_label.clone(),
                count: matches.len(),
            }),
        }
    }

    fn active_descriptions(&self, concept_id: SctId) -> Vec<Rf2Description> {
        let Some(ids) = self.descriptions.get(&concept_id) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| {
                self.release
                    .descriptions
                    .get(id)
                    .and_then(|group| group.active_at(self.release.now).cloned())
            })
            .collect()
    }

    fn resolve_relationships(
        &self,
        ids: Option<&Vec<SctId>>,
    ) -> SnomedResult<Vec<Rf2Relationship>> {
        let Some(ids) = ids else {
            return Ok(Vec::new());
        };
        ids.iter()
            .map(|&id| {
                self.release
                    .relationships
                    .get(&id)
                    .and_then(|group| group.active_at(self.release.now).cloned())
                    .ok_or(SnomedError::RelationshipNotFound { id })
            })
            .collect()
    }
}
