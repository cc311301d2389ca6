//! LinkedProject: the cross-reference index built once per compiled snapshot.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;
use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use super::chain::{ChainKind, parse_chain, split_expressions};
use super::positions::offset_position;
use crate::base::Location;
use crate::core::text_utils::{collapse_whitespace, normalize_code, normalize_reference};
use crate::project::{
    BibEntry, CompiledProject, FieldKind, FieldOccurrence, ItemRecord, OntologyConcept,
    SourceRecord, WorkspaceOptions,
};

// ============================================================================
// INDEX ENTRIES
// ============================================================================

/// Address of an item: index of its source, index inside that source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemRef {
    pub source: u32,
    pub item: u32,
}

impl ItemRef {
    pub fn new(source: usize, item: usize) -> Self {
        Self {
            source: source as u32,
            item: item as u32,
        }
    }
}

/// Which kind of field a code was mentioned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceContext {
    Code,
    Chain,
}

/// A code mentioned by one field of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMention {
    pub code: SmolStr,
    pub item: ItemRef,
    /// Index into the item's `fields`.
    pub field: u32,
    pub context: OccurrenceContext,
    /// Char offset of each textual mention inside the field value, in order.
    pub offsets: Vec<u32>,
}

/// `(subject, relation, object)` extracted from a chain field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTriple {
    pub subject: SmolStr,
    pub relation: SmolStr,
    pub object: SmolStr,
    pub kind: ChainKind,
    pub qualifier: Option<SmolStr>,
    /// Position of the subject token, when field positions are known.
    pub location: Option<Location>,
    /// Start of the chain field value.
    pub chain_location: Option<Location>,
    pub item: ItemRef,
    pub field: SmolStr,
}

/// A field value skipped while building the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNote {
    pub item: ItemRef,
    pub field: SmolStr,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    pub source_count: usize,
    pub item_count: usize,
    pub ontology_count: usize,
    pub code_count: usize,
    pub chain_count: usize,
    pub triple_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldRole {
    Code,
    Chain,
}

/// Split a code field value into codes (`,`, `;` and line breaks).
///
/// Returns each code with inner whitespace collapsed and the char offset where it
/// starts in `value`.
pub fn split_codes(value: &str) -> Vec<(usize, String)> {
    let mut codes = Vec::new();
    let mut char_pos = 0;

    for raw in value.split([',', ';', '\n']) {
        let code = collapse_whitespace(raw);
        if !code.is_empty() {
            let leading = raw.chars().take_while(|c| c.is_whitespace()).count();
            codes.push((char_pos + leading, code));
        }
        char_pos += raw.chars().count() + 1;
    }

    codes
}

// ============================================================================
// LINKED PROJECT
// ============================================================================

/// Cross-referenced, immutable view over a [`CompiledProject`].
#[derive(Debug)]
pub struct LinkedProject {
    project: Arc<CompiledProject>,
    reference_prefix: char,
    /// normalized reference -> index into `project.sources`
    sources: IndexMap<String, usize>,
    code_usage: IndexMap<SmolStr, Vec<ItemRef>>,
    mentions: Vec<CodeMention>,
    /// normalized concept name -> index into `project.ontology`
    ontology: IndexMap<String, usize>,
    triples: Vec<RelationTriple>,
    topics: IndexMap<SmolStr, Vec<SmolStr>>,
    chain_count: usize,
    notes: Vec<IndexNote>,
}

impl LinkedProject {
    /// Build the index. Malformed field values are skipped and recorded as notes.
    pub fn build(project: Arc<CompiledProject>, options: &WorkspaceOptions) -> Self {
        let linked = Self {
            project: Arc::clone(&project),
            reference_prefix: options.reference_prefix,
            sources: IndexMap::new(),
            code_usage: IndexMap::new(),
            mentions: Vec::new(),
            ontology: IndexMap::new(),
            triples: Vec::new(),
            topics: IndexMap::new(),
            chain_count: 0,
            notes: Vec::new(),
        };

        let mut builder = IndexBuilder {
            options,
            linked,
            mention_slots: FxHashMap::default(),
        };
        builder.index_sources(&project);
        builder.index_ontology(&project);

        let linked = builder.linked;
        debug!(
            sources = linked.sources.len(),
            codes = linked.code_usage.len(),
            triples = linked.triples.len(),
            notes = linked.notes.len(),
            "linked project built"
        );
        linked
    }

    pub fn project(&self) -> &Arc<CompiledProject> {
        &self.project
    }

    pub fn reference_prefix(&self) -> char {
        self.reference_prefix
    }

    // ------------------------------------------------------------------
    // Sources and items
    // ------------------------------------------------------------------

    /// All registered sources, in project order.
    pub fn sources(&self) -> impl Iterator<Item = (usize, &SourceRecord)> {
        self.sources
            .values()
            .filter_map(|&index| self.project.sources.get(index).map(|s| (index, s)))
    }

    /// Index of the source with `reference`, given with or without its prefix.
    pub fn source_index(&self, reference: &str) -> Option<usize> {
        let key = normalize_reference(reference, self.reference_prefix);
        self.sources.get(&key).copied()
    }

    pub fn source(&self, reference: &str) -> Option<&SourceRecord> {
        self.source_index(reference)
            .and_then(|index| self.project.sources.get(index))
    }

    pub fn item(&self, item: ItemRef) -> Option<&ItemRecord> {
        self.project
            .sources
            .get(item.source as usize)
            .and_then(|s| s.items.get(item.item as usize))
    }

    pub fn source_of(&self, item: ItemRef) -> Option<&SourceRecord> {
        self.project.sources.get(item.source as usize)
    }

    pub fn field(&self, item: ItemRef, field: u32) -> Option<&FieldOccurrence> {
        self.item(item).and_then(|i| i.fields.get(field as usize))
    }

    /// Every item of the source with `reference`.
    pub fn items_of(&self, reference: &str) -> Vec<ItemRef> {
        match self.source_index(reference) {
            Some(index) => (0..self.project.sources[index].items.len())
                .map(|item| ItemRef::new(index, item))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Bibliography entry whose key matches `reference`.
    pub fn bib_entry(&self, reference: &str) -> Option<&BibEntry> {
        let key = normalize_reference(reference, self.reference_prefix);
        self.project
            .bibliography
            .iter()
            .find(|entry| normalize_reference(&entry.key, self.reference_prefix) == key)
    }

    // ------------------------------------------------------------------
    // Codes
    // ------------------------------------------------------------------

    /// Code (as written) -> distinct items using it, in first-use order.
    pub fn code_usage(&self) -> &IndexMap<SmolStr, Vec<ItemRef>> {
        &self.code_usage
    }

    pub fn usage(&self, code: &str) -> &[ItemRef] {
        self.code_usage.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every field mention, in index order.
    pub fn mentions(&self) -> &[CodeMention] {
        &self.mentions
    }

    pub fn mentions_of<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a CodeMention> {
        self.mentions.iter().filter(move |m| m.code == code)
    }

    // ------------------------------------------------------------------
    // Ontology
    // ------------------------------------------------------------------

    pub fn concepts(&self) -> impl Iterator<Item = &OntologyConcept> {
        self.ontology
            .values()
            .filter_map(|&index| self.project.ontology.get(index))
    }

    /// Concept named `name`, ignoring case and extra whitespace.
    pub fn concept(&self, name: &str) -> Option<&OntologyConcept> {
        self.ontology
            .get(&normalize_code(name))
            .and_then(|&index| self.project.ontology.get(index))
    }

    pub fn is_defined(&self, code: &str) -> bool {
        self.ontology.contains_key(&normalize_code(code))
    }

    /// Whether `name` is used as a code or defined in the ontology.
    pub fn is_known_code(&self, name: &str) -> bool {
        self.code_usage.contains_key(name) || self.is_defined(name)
    }

    /// Topic label -> concept names.
    pub fn topics(&self) -> &IndexMap<SmolStr, Vec<SmolStr>> {
        &self.topics
    }

    // ------------------------------------------------------------------
    // Relations and diagnostics
    // ------------------------------------------------------------------

    pub fn triples(&self) -> &[RelationTriple] {
        &self.triples
    }

    pub fn notes(&self) -> &[IndexNote] {
        &self.notes
    }

    pub fn stats(&self) -> ProjectStats {
        ProjectStats {
            source_count: self.sources.len(),
            item_count: self.project.item_count(),
            ontology_count: self.ontology.len(),
            code_count: self.code_usage.len(),
            chain_count: self.chain_count,
            triple_count: self.triples.len(),
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

struct IndexBuilder<'a> {
    options: &'a WorkspaceOptions,
    linked: LinkedProject,
    /// (code, item, field) -> index into `linked.mentions`
    mention_slots: FxHashMap<(SmolStr, ItemRef, u32), usize>,
}

impl IndexBuilder<'_> {
    fn index_sources(&mut self, project: &CompiledProject) {
        for (source_index, source) in project.sources.iter().enumerate() {
            let key = normalize_reference(&source.bibref, self.options.reference_prefix);
            if key.is_empty() {
                warn!(location = ?source.location, "source without reference id skipped");
                continue;
            }
            if self.linked.sources.contains_key(&key) {
                // Lookups keep resolving to the first record; its items are still indexed.
                warn!(bibref = %source.bibref, "duplicate source reference, keeping the first");
            } else {
                self.linked.sources.insert(key, source_index);
            }

            for (item_index, item) in source.items.iter().enumerate() {
                let item_ref = ItemRef::new(source_index, item_index);
                for (field_index, field) in item.fields.iter().enumerate() {
                    match self.role_of(project, &field.name) {
                        Some(FieldRole::Code) => {
                            self.index_code_field(item_ref, field_index as u32, field)
                        }
                        Some(FieldRole::Chain) => {
                            self.index_chain_field(item_ref, field_index as u32, field)
                        }
                        None => {}
                    }
                }
            }
        }
    }

    fn role_of(&self, project: &CompiledProject, field: &str) -> Option<FieldRole> {
        match project.template.kind_of(field) {
            Some(FieldKind::Code) => Some(FieldRole::Code),
            Some(FieldKind::Chain) => Some(FieldRole::Chain),
            Some(_) => None,
            None if self.options.is_code_field(field) => Some(FieldRole::Code),
            None if self.options.is_chain_field(field) => Some(FieldRole::Chain),
            None => None,
        }
    }

    fn index_code_field(&mut self, item: ItemRef, field_index: u32, field: &FieldOccurrence) {
        let codes = split_codes(&field.value);
        if codes.is_empty() {
            self.note(item, &field.name, "empty code field".to_string());
            return;
        }
        for (offset, code) in codes {
            self.record_code(
                SmolStr::new(code),
                item,
                field_index,
                offset,
                OccurrenceContext::Code,
            );
        }
    }

    fn index_chain_field(&mut self, item: ItemRef, field_index: u32, field: &FieldOccurrence) {
        let expressions = split_expressions(&field.value);
        if expressions.is_empty() {
            self.note(item, &field.name, "empty chain field".to_string());
            return;
        }

        for (offset, expr) in expressions {
            let chain = match parse_chain(expr, offset) {
                Ok(chain) => chain,
                Err(err) => {
                    self.note(item, &field.name, format!("{err}: '{}'", expr.trim()));
                    continue;
                }
            };
            self.linked.chain_count += 1;

            for concept in chain.concepts() {
                self.record_code(
                    concept.text.clone(),
                    item,
                    field_index,
                    concept.offset,
                    OccurrenceContext::Chain,
                );
            }

            for (subject, relation, object) in chain.triples() {
                let location = field.location.as_ref().map(|loc| {
                    loc.with_line_col(offset_position(loc.line_col(), &field.value, subject.offset))
                });
                trace!(
                    subject = %subject.text,
                    relation = %relation.text,
                    object = %object.text,
                    "triple"
                );
                self.linked.triples.push(RelationTriple {
                    subject: subject.text.clone(),
                    relation: relation.text.clone(),
                    object: object.text.clone(),
                    kind: chain.kind,
                    qualifier: chain.qualifier.clone(),
                    location,
                    chain_location: field.location.clone(),
                    item,
                    field: field.name.clone(),
                });
            }
        }
    }

    fn record_code(
        &mut self,
        code: SmolStr,
        item: ItemRef,
        field_index: u32,
        offset: usize,
        context: OccurrenceContext,
    ) {
        let users = self.linked.code_usage.entry(code.clone()).or_default();
        if !users.contains(&item) {
            users.push(item);
        }

        let slot = (code.clone(), item, field_index);
        match self.mention_slots.get(&slot) {
            Some(&index) => self.linked.mentions[index].offsets.push(offset as u32),
            None => {
                self.mention_slots.insert(slot, self.linked.mentions.len());
                self.linked.mentions.push(CodeMention {
                    code,
                    item,
                    field: field_index,
                    context,
                    offsets: vec![offset as u32],
                });
            }
        }
    }

    fn index_ontology(&mut self, project: &CompiledProject) {
        let topic_field = self.options.topic_field.as_str();

        for (index, concept) in project.ontology.iter().enumerate() {
            let key = normalize_code(&concept.name);
            if key.is_empty() {
                warn!(location = ?concept.location, "ontology concept without name skipped");
                continue;
            }
            if self.linked.ontology.contains_key(&key) {
                warn!(concept = %concept.name, "duplicate ontology concept, keeping the first");
                continue;
            }
            self.linked.ontology.insert(key, index);

            for topic in concept.fields.values(topic_field) {
                let topic = collapse_whitespace(topic);
                if topic.is_empty() {
                    continue;
                }
                self.linked
                    .topics
                    .entry(SmolStr::new(topic))
                    .or_default()
                    .push(concept.name.clone());
            }
        }
    }

    fn note(&mut self, item: ItemRef, field: &SmolStr, reason: String) {
        debug!(?item, field = %field, %reason, "field value skipped");
        self.linked.notes.push(IndexNote {
            item,
            field: field.clone(),
            reason,
        });
    }
}
