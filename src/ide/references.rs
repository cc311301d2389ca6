//! Source listing and find-references.

use serde::Serialize;
use smol_str::SmolStr;

use super::codes::code_occurrences;
use crate::base::Location;
use crate::base::constants::KEYWORDS;
use crate::hir::LinkedProject;
use crate::project::FieldMap;

/// One source record as shown by the references explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceEntry {
    pub bibref: SmolStr,
    pub item_count: usize,
    pub fields: FieldMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Every registered source, in project order.
pub fn get_references(linked: &LinkedProject) -> Vec<ReferenceEntry> {
    linked
        .sources()
        .map(|(_, source)| ReferenceEntry {
            bibref: source.bibref.clone(),
            item_count: source.items.len(),
            fields: source.fields.clone(),
            location: source.location.clone(),
        })
        .collect()
}

/// What a find-references token resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Code,
    Reference,
}

/// A reference to a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub location: Location,
    /// Whether this is the definition (vs a use).
    pub is_definition: bool,
    pub kind: SymbolKind,
}

/// Result of a find-references request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceResult {
    pub references: Vec<Reference>,
    pub include_declaration: bool,
}

impl ReferenceResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }
}

/// Find every location of `token`.
///
/// A reference (`@r1` or a bare id naming a source) yields its bibliography entry
/// (the definition), the SOURCE block and each of its items. A code yields its
/// ontology definition and every occurrence in code and chain fields.
pub fn find_references(
    linked: &LinkedProject,
    token: &str,
    include_declaration: bool,
) -> ReferenceResult {
    let token = token.trim();
    if token.is_empty() || KEYWORDS.contains(&token) {
        return ReferenceResult::empty();
    }

    let mut references = Vec::new();
    let mut push = |location: Option<&Location>, is_definition: bool, kind: SymbolKind| {
        if is_definition && !include_declaration {
            return;
        }
        if let Some(location) = location {
            references.push(Reference {
                location: location.clone(),
                is_definition,
                kind,
            });
        }
    };

    // A bare id that is both a source key and a code resolves as the code.
    let prefixed = token.starts_with(linked.reference_prefix());
    let source = linked
        .source_index(token)
        .filter(|_| prefixed || !linked.is_known_code(token));

    if let Some(index) = source {
        let kind = SymbolKind::Reference;
        if let Some(entry) = linked.bib_entry(token) {
            push(entry.location.as_ref(), true, kind);
        }
        if let Some(source) = linked.project().sources.get(index) {
            push(source.location.as_ref(), false, kind);
            for item in &source.items {
                push(item.location.as_ref(), false, kind);
            }
        }
    } else if !prefixed && linked.is_known_code(token) {
        let kind = SymbolKind::Code;
        if let Some(concept) = linked.concept(token) {
            push(concept.location.as_ref(), true, kind);
        }
        for occurrence in code_occurrences(linked, token) {
            push(occurrence.location.as_ref(), false, kind);
        }
    }

    ReferenceResult {
        references,
        include_declaration,
    }
}
