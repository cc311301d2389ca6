//! Code listing with per-mention occurrences.

use serde::Serialize;
use smol_str::SmolStr;

use crate::base::Location;
use crate::hir::{LinkedProject, OccurrenceContext, offset_position};

/// One textual mention of a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeOccurrence {
    /// Exact position when the field position is known, else the item's location.
    /// `None` only when nothing is known.
    #[serde(flatten)]
    pub location: Option<Location>,
    pub field: SmolStr,
    pub context: OccurrenceContext,
    pub bibref: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeEntry {
    pub code: SmolStr,
    /// Distinct items using the code.
    pub usage_count: usize,
    pub ontology_defined: bool,
    pub occurrences: Vec<CodeOccurrence>,
}

/// Every code in first-use order.
pub fn get_codes(linked: &LinkedProject) -> Vec<CodeEntry> {
    linked
        .code_usage()
        .iter()
        .map(|(code, items)| CodeEntry {
            code: code.clone(),
            usage_count: items.len(),
            ontology_defined: linked.is_defined(code),
            occurrences: code_occurrences(linked, code),
        })
        .collect()
}

/// One occurrence per textual mention of `code` in its code and chain fields.
pub fn code_occurrences(linked: &LinkedProject, code: &str) -> Vec<CodeOccurrence> {
    let mut occurrences = Vec::new();

    for mention in linked.mentions_of(code) {
        let Some(field) = linked.field(mention.item, mention.field) else {
            continue;
        };
        let bibref = linked
            .source_of(mention.item)
            .map(|s| s.bibref.clone())
            .unwrap_or_default();
        let occurrence = |location: Option<Location>| CodeOccurrence {
            location,
            field: field.name.clone(),
            context: mention.context,
            bibref: bibref.clone(),
        };

        let item_location = || linked.item(mention.item).and_then(|i| i.location.clone());
        for &offset in &mention.offsets {
            let location = match &field.location {
                Some(start) => Some(start.with_line_col(offset_position(
                    start.line_col(),
                    &field.value,
                    offset as usize,
                ))),
                None => item_location(),
            };
            occurrences.push(occurrence(location));
        }
    }

    occurrences
}
