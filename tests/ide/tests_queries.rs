//! Queries over a linked project: codes, relations, graph, references, ontology.

use synesis::Location;
use synesis::hir::{ChainKind, OccurrenceContext};
use synesis::ide::{
    SymbolKind, find_references, get_codes, get_references, get_relations, ontology_annotations,
    ontology_topics, relation_graph,
};

use crate::helpers::project_fixtures::*;

// ============================================================================
// CODES
// ============================================================================

#[test]
fn test_codes_list_code_and_chain_mentions() {
    let linked = link(minimal_project());
    let codes = get_codes(&linked);

    let alpha = codes.iter().find(|c| c.code == "alpha").unwrap();
    assert_eq!(alpha.usage_count, 1);
    assert!(!alpha.ontology_defined);
    let seen: Vec<_> = alpha
        .occurrences
        .iter()
        .map(|o| (o.context, o.location.clone()))
        .collect();
    assert_eq!(
        seen,
        vec![
            (OccurrenceContext::Code, Some(loc("a.syn", 3, 15))),
            (OccurrenceContext::Chain, Some(loc("a.syn", 4, 16))),
        ]
    );

    let beta = codes.iter().find(|c| c.code == "beta").unwrap();
    assert_eq!(beta.occurrences.len(), 1);
    assert_eq!(beta.occurrences[0].location, Some(loc("a.syn", 4, 29)));
    assert_eq!(beta.occurrences[0].bibref, "@r1");
}

#[test]
fn test_codes_report_ontology_definition() {
    let linked = link(two_source_project());
    let codes = get_codes(&linked);
    let defined: Vec<_> = codes
        .iter()
        .map(|c| (c.code.as_str(), c.ontology_defined))
        .collect();
    assert_eq!(
        defined,
        vec![
            ("alpha", true),
            ("beta", false),
            ("gamma", false),
            ("delta", true),
        ]
    );
}

#[test]
fn test_code_entry_serializes_flat_location() {
    let linked = link(minimal_project());
    let codes = get_codes(&linked);
    let json = serde_json::to_value(&codes[0]).unwrap();
    assert_eq!(json["usageCount"], 1);
    assert_eq!(json["occurrences"][0]["file"], "a.syn");
    assert_eq!(json["occurrences"][0]["line"], 3);
    assert_eq!(json["occurrences"][0]["context"], "code");
}

// ============================================================================
// RELATIONS
// ============================================================================

#[test]
fn test_relation_located_at_subject() {
    let linked = link(minimal_project());
    let relations = get_relations(&linked);
    assert_eq!(relations.len(), 1);

    let relation = &relations[0];
    assert_eq!(
        (relation.from.as_str(), relation.relation.as_str(), relation.to.as_str()),
        ("alpha", "causes", "beta")
    );
    assert_eq!(relation.kind, ChainKind::Simple);
    assert_eq!(relation.bibref, "@r1");
    assert_eq!(relation.location, Some(loc("a.syn", 4, 16)));
}

#[test]
fn test_relation_falls_back_to_item_location() {
    let linked = link(item_located_project());
    let relations = get_relations(&linked);
    assert_eq!(relations[0].location, Some(loc("a.syn", 2, 5)));
}

#[test]
fn test_relation_serializes_type_field() {
    let linked = link(two_source_project());
    let relations = get_relations(&linked);
    let json = serde_json::to_value(&relations[1]).unwrap();
    assert_eq!(json["type"], "qualified");
    assert_eq!(json["qualifier"], "CAUSAL");
    assert_eq!(json["from"], "beta");
}

// ============================================================================
// GRAPH
// ============================================================================

#[test]
fn test_full_graph_is_deduplicated() {
    let linked = link(two_source_project());
    let graph = relation_graph(&linked, None);
    assert_eq!(graph.edges.len(), 2);
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(
        graph.to_mermaid(),
        "graph LR\n    alpha[alpha] -->|causes| beta[beta]\n    beta[beta] -->|enables| gamma[gamma]"
    );
}

#[test]
fn test_graph_for_reference_without_relations_is_empty() {
    let linked = link(two_source_project());
    let graph = relation_graph(&linked, Some("@r2"));
    assert!(graph.is_empty());
    assert_eq!(graph.to_mermaid(), "graph LR\n    empty[No relations]");
}

#[test]
fn test_graph_for_unknown_reference_is_empty() {
    let linked = link(two_source_project());
    assert!(relation_graph(&linked, Some("@nope")).is_empty());
}

#[test]
fn test_graph_filtered_by_reference() {
    let linked = link(two_source_project());
    let graph = relation_graph(&linked, Some("r1"));
    assert_eq!(graph.edges.len(), 2);
}

// ============================================================================
// REFERENCES
// ============================================================================

#[test]
fn test_references_list_sources() {
    let linked = link(two_source_project());
    let references = get_references(&linked);
    let summary: Vec<_> = references
        .iter()
        .map(|r| (r.bibref.as_str(), r.item_count))
        .collect();
    assert_eq!(summary, vec![("@r1", 2), ("@r2", 1)]);
    assert_eq!(references[0].fields.values("title"), vec!["Entrevista 1"]);
}

#[test]
fn test_find_references_of_source() {
    let linked = link(two_source_project());
    let result = find_references(&linked, "@r1", true);
    let locations: Vec<_> = result.references.iter().map(|r| r.location.clone()).collect();
    assert_eq!(
        locations,
        vec![loc("a.syn", 1, 1), loc("a.syn", 2, 5), loc("a.syn", 6, 5)]
    );
    assert!(result.references.iter().all(|r| r.kind == SymbolKind::Reference));
    assert!(result.references.iter().all(|r| !r.is_definition));
}

#[test]
fn test_find_references_of_code() {
    let linked = link(two_source_project());

    let with_declaration = find_references(&linked, "alpha", true);
    assert_eq!(with_declaration.len(), 3);
    assert!(with_declaration.references[0].is_definition);
    assert_eq!(with_declaration.references[0].location, loc("onto.syno", 1, 10));
    assert_eq!(with_declaration.references[2].location, loc("a.syn", 8, 16));

    let without = find_references(&linked, "alpha", false);
    assert_eq!(without.len(), 2);
    assert!(without.references.iter().all(|r| !r.is_definition));
}

#[test]
fn test_find_references_ignores_keywords_and_unknowns() {
    let linked = link(two_source_project());
    assert!(find_references(&linked, "SOURCE", true).is_empty());
    assert!(find_references(&linked, "missing", true).is_empty());
    assert!(find_references(&linked, "", true).is_empty());
}

// ============================================================================
// ONTOLOGY
// ============================================================================

#[test]
fn test_topics_carry_concept_locations() {
    let linked = link(two_source_project());
    let topics = ontology_topics(&linked);
    assert_eq!(topics.len(), 2);
    assert_eq!(topics[0].topic, "Causas");
    let causas: Vec<_> = topics[0]
        .concepts
        .iter()
        .map(|c| (c.name.as_str(), c.location.clone()))
        .collect();
    assert_eq!(
        causas,
        vec![
            ("alpha", Some(loc("onto.syno", 1, 10))),
            ("unused", Some(loc("onto.syno", 9, 10))),
        ]
    );
}

#[test]
fn test_annotations_match_usage_ignoring_case() {
    let linked = link(two_source_project());
    let annotations = ontology_annotations(&linked, None);
    let summary: Vec<_> = annotations
        .iter()
        .map(|a| (a.code.as_str(), a.usage_count, a.occurrences.len()))
        .collect();
    assert_eq!(
        summary,
        vec![("alpha", 2, 2), ("Delta", 1, 1), ("unused", 0, 0)]
    );
    assert_eq!(annotations[1].definition, Some(loc("onto.syno", 5, 10)));
}

#[test]
fn test_annotations_filtered_by_active_file() {
    let linked = link(two_source_project());

    let in_b = ontology_annotations(&linked, Some("b.syn"));
    assert_eq!(in_b.len(), 1);
    assert_eq!(in_b[0].code, "Delta");
    assert_eq!(
        in_b[0].occurrences[0].location,
        Some(Location::new("b.syn", 3, 15))
    );

    let in_a = ontology_annotations(&linked, Some("a.syn"));
    assert_eq!(in_a.len(), 1);
    assert_eq!(in_a[0].code, "alpha");
}
