//! Typed project tree handed over by the compiler.
//!
//! Everything here is immutable once a [`CompiledProject`] is built. Builder-style
//! `with_*` methods exist so compilers (and tests) can assemble records fluently.

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use smol_str::SmolStr;

use crate::base::Location;

// ============================================================================
// FIELD VALUES
// ============================================================================

/// A field that appeared once, or was repeated into an implicit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    List(Vec<String>),
}

impl FieldValue {
    /// All values in order of appearance.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::List(values) => values.iter().map(String::as_str).collect(),
        }
    }

    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::List(values) => values.first().map(String::as_str),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(existing) => {
                let first = std::mem::take(existing);
                *self = Self::List(vec![first, value]);
            }
            Self::List(values) => values.push(value),
        }
    }
}

/// Ordered mapping from field name to [`FieldValue`].
///
/// The shape of each entry is decided by how often the name was observed: one
/// occurrence stays [`FieldValue::Single`], a repeat promotes it to a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMap(IndexMap<SmolStr, FieldValue>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<SmolStr>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (name, value) in pairs {
            map.insert(name, value);
        }
        map
    }

    /// Add one observed value for `name`.
    pub fn insert(&mut self, name: impl Into<SmolStr>, value: impl Into<String>) {
        let value = value.into();
        match self.0.entry(name.into()) {
            indexmap::map::Entry::Occupied(mut entry) => entry.get_mut().push(value),
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(FieldValue::Single(value));
            }
        }
    }

    /// Field lookup, ignoring ASCII case of the name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name).or_else(|| {
            self.0
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
    }

    /// Every value recorded for `name`; empty when absent.
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.get(name).map(FieldValue::values).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// One field as written inside an item, with the position where its value starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOccurrence {
    pub name: SmolStr,
    pub value: String,
    pub location: Option<Location>,
}

impl FieldOccurrence {
    pub fn new(name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// One annotated excerpt inside a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemRecord {
    pub fields: Vec<FieldOccurrence>,
    pub location: Option<Location>,
}

impl ItemRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_field(mut self, field: FieldOccurrence) -> Self {
        self.fields.push(field);
        self
    }

    /// The item's fields folded into a [`FieldMap`].
    pub fn field_map(&self) -> FieldMap {
        FieldMap::from_pairs(
            self.fields
                .iter()
                .map(|f| (f.name.clone(), f.value.clone())),
        )
    }
}

/// A cited work and its annotated excerpts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// Reference id as written (`@smith2019`).
    pub bibref: SmolStr,
    pub fields: FieldMap,
    pub items: Vec<ItemRecord>,
    pub location: Option<Location>,
}

impl SourceRecord {
    pub fn new(bibref: impl Into<SmolStr>) -> Self {
        Self {
            bibref: bibref.into(),
            fields: FieldMap::new(),
            items: Vec::new(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_field(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.fields.insert(name, value);
        self
    }

    pub fn with_item(mut self, item: ItemRecord) -> Self {
        self.items.push(item);
        self
    }
}

/// A formally defined code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyConcept {
    pub name: SmolStr,
    pub fields: FieldMap,
    pub location: Option<Location>,
}

impl OntologyConcept {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            fields: FieldMap::new(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_field(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.fields.insert(name, value);
        self
    }
}

/// An entry of the bibliography file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    pub key: SmolStr,
    pub entry_type: SmolStr,
    pub fields: FieldMap,
    pub location: Option<Location>,
}

impl BibEntry {
    pub fn new(key: impl Into<SmolStr>, entry_type: impl Into<SmolStr>) -> Self {
        Self {
            key: key.into(),
            entry_type: entry_type.into(),
            fields: FieldMap::new(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_field(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.fields.insert(name, value);
        self
    }
}

// ============================================================================
// TEMPLATE
// ============================================================================

/// Block a template field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldScope {
    Source,
    Item,
    Ontology,
}

impl FieldScope {
    /// The block keyword the scope corresponds to.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Source => "SOURCE",
            Self::Item => "ITEM",
            Self::Ontology => "ONTOLOGY",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "SOURCE" => Some(Self::Source),
            "ITEM" => Some(Self::Item),
            "ONTOLOGY" => Some(Self::Ontology),
            _ => None,
        }
    }
}

/// Declared type of a template field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    /// Single concepts, comma separated.
    Code,
    /// `concept - relation - concept` expressions.
    Chain,
    Topic,
    /// Paired values travelling together positionally. Indexed as plain text.
    Bundle,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Code => "CODE",
            Self::Chain => "CHAIN",
            Self::Topic => "TOPIC",
            Self::Bundle => "BUNDLE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: SmolStr,
    pub scope: FieldScope,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<SmolStr>, scope: FieldScope, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            scope,
            kind,
        }
    }
}

/// Field specifications of the project template, keyed by lowercased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSpec {
    fields: IndexMap<SmolStr, FieldSpec>,
}

impl TemplateSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, spec: FieldSpec) -> Self {
        self.fields
            .insert(SmolStr::new(spec.name.to_lowercase()), spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name.to_lowercase().as_str())
    }

    /// Declared kind of `name`, if the template knows it.
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.get(name).map(|spec| spec.kind)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }
}

// ============================================================================
// PROJECT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub name: Option<SmolStr>,
    pub fields: FieldMap,
}

/// Immutable result of one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledProject {
    pub metadata: ProjectMetadata,
    pub sources: Vec<SourceRecord>,
    pub ontology: Vec<OntologyConcept>,
    pub template: TemplateSpec,
    pub bibliography: Vec<BibEntry>,
}

impl CompiledProject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.metadata.name = Some(name.into());
        self
    }

    pub fn with_source(mut self, source: SourceRecord) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_concept(mut self, concept: OntologyConcept) -> Self {
        self.ontology.push(concept);
        self
    }

    pub fn with_template(mut self, template: TemplateSpec) -> Self {
        self.template = template;
        self
    }

    pub fn with_bib_entry(mut self, entry: BibEntry) -> Self {
        self.bibliography.push(entry);
        self
    }

    pub fn item_count(&self) -> usize {
        self.sources.iter().map(|s| s.items.len()).sum()
    }

    /// Rewrite every location to be relative to the workspace `root`.
    pub fn into_workspace_relative(mut self, root: &Path) -> Self {
        let relativize = |loc: &mut Option<Location>| {
            if let Some(l) = loc.as_mut() {
                *l = l.relative_to(root);
            }
        };

        for source in &mut self.sources {
            relativize(&mut source.location);
            for item in &mut source.items {
                relativize(&mut item.location);
                for field in &mut item.fields {
                    relativize(&mut field.location);
                }
            }
        }
        for concept in &mut self.ontology {
            relativize(&mut concept.location);
        }
        for entry in &mut self.bibliography {
            relativize(&mut entry.location);
        }
        self
    }
}
