//! Relation listing.

use serde::Serialize;
use smol_str::SmolStr;

use crate::base::Location;
use crate::hir::{ChainKind, LinkedProject, RelationTriple};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationEntry {
    pub from: SmolStr,
    pub relation: SmolStr,
    pub to: SmolStr,
    #[serde(rename = "type")]
    pub kind: ChainKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<SmolStr>,
    pub bibref: SmolStr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Every triple, in extraction order.
pub fn get_relations(linked: &LinkedProject) -> Vec<RelationEntry> {
    linked
        .triples()
        .iter()
        .map(|triple| RelationEntry {
            from: triple.subject.clone(),
            relation: triple.relation.clone(),
            to: triple.object.clone(),
            kind: triple.kind,
            qualifier: triple.qualifier.clone(),
            bibref: linked
                .source_of(triple.item)
                .map(|s| s.bibref.clone())
                .unwrap_or_default(),
            location: triple_location(linked, triple),
        })
        .collect()
}

/// Best known location: the triple itself, then its chain field, then its item.
pub fn triple_location(linked: &LinkedProject, triple: &RelationTriple) -> Option<Location> {
    triple
        .location
        .clone()
        .or_else(|| triple.chain_location.clone())
        .or_else(|| linked.item(triple.item).and_then(|i| i.location.clone()))
}
