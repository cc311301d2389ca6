//! Ontology views: concepts grouped by topic, and concepts with their occurrences.

use serde::Serialize;
use smol_str::SmolStr;

use super::codes::{CodeOccurrence, code_occurrences};
use crate::base::Location;
use crate::core::text_utils::normalize_code;
use crate::hir::{ItemRef, LinkedProject};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicConcept {
    pub name: SmolStr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicEntry {
    pub topic: SmolStr,
    pub concepts: Vec<TopicConcept>,
}

/// The topic index, topics and concepts in declaration order.
pub fn ontology_topics(linked: &LinkedProject) -> Vec<TopicEntry> {
    linked
        .topics()
        .iter()
        .map(|(topic, names)| TopicEntry {
            topic: topic.clone(),
            concepts: names
                .iter()
                .map(|name| TopicConcept {
                    name: name.clone(),
                    location: linked.concept(name).and_then(|c| c.location.clone()),
                })
                .collect(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologyAnnotation {
    pub code: SmolStr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<Location>,
    /// Distinct items using the concept under any spelling.
    pub usage_count: usize,
    pub occurrences: Vec<CodeOccurrence>,
}

/// Distinct items using `concept` under any spelling, in first-use order.
pub(crate) fn concept_usage(linked: &LinkedProject, concept: &str) -> Vec<ItemRef> {
    let key = normalize_code(concept);
    let mut items: Vec<ItemRef> = Vec::new();
    for (code, users) in linked.code_usage() {
        if normalize_code(code) != key {
            continue;
        }
        for item in users {
            if !items.contains(item) {
                items.push(*item);
            }
        }
    }
    items
}

/// Every ontology concept with the places it is used.
///
/// Usage is matched ignoring case. With `active_file`, only occurrences inside
/// that file are kept and concepts without any are dropped.
pub fn ontology_annotations(
    linked: &LinkedProject,
    active_file: Option<&str>,
) -> Vec<OntologyAnnotation> {
    let mut annotations = Vec::new();

    for concept in linked.concepts() {
        let key = normalize_code(&concept.name);
        let mut occurrences: Vec<CodeOccurrence> = linked
            .code_usage()
            .keys()
            .filter(|code| normalize_code(code) == key)
            .flat_map(|code| code_occurrences(linked, code))
            .collect();

        if let Some(file) = active_file {
            occurrences.retain(|o: &CodeOccurrence| {
                o.location.as_ref().is_some_and(|l| l.is_in_file(file))
            });
            if occurrences.is_empty() {
                continue;
            }
        }

        annotations.push(OntologyAnnotation {
            code: concept.name.clone(),
            definition: concept.location.clone(),
            usage_count: concept_usage(linked, &concept.name).len(),
            occurrences,
        });
    }

    annotations
}
