//! One occurrence per textual mention, each with its own position.

use synesis::{LineCol, Location};
use synesis::hir::{resolve_token_position, token_positions};
use synesis::ide::code_occurrences;
use synesis::project::{CompiledProject, FieldOccurrence, ItemRecord, SourceRecord};

use crate::helpers::project_fixtures::*;

fn repeated_mentions() -> CompiledProject {
    CompiledProject::new().with_source(
        SourceRecord::new("@r1").with_item(
            ItemRecord::new()
                .with_location(loc("a.syn", 9, 5))
                .with_field(
                    FieldOccurrence::new("code", "alpha, alpha\n  alpha")
                        .at(loc("a.syn", 10, 9)),
                ),
        ),
    )
}

#[test]
fn test_each_mention_resolves_separately() {
    let linked = link(repeated_mentions());
    assert_eq!(linked.usage("alpha").len(), 1);
    assert_eq!(linked.mentions_of("alpha").count(), 1);

    let locations: Vec<_> = code_occurrences(&linked, "alpha")
        .into_iter()
        .map(|o| o.location)
        .collect();
    assert_eq!(
        locations,
        vec![
            Some(Location::new("a.syn", 10, 9)),
            Some(Location::new("a.syn", 10, 16)),
            Some(Location::new("a.syn", 11, 3)),
        ]
    );
}

#[test]
fn test_mentions_without_field_position_fall_back_to_item() {
    let linked = link(
        CompiledProject::new().with_source(
            SourceRecord::new("@r1").with_item(
                ItemRecord::new()
                    .with_location(loc("a.syn", 9, 5))
                    .with_field(FieldOccurrence::new("code", "alpha, alpha")),
            ),
        ),
    );
    let occurrences = code_occurrences(&linked, "alpha");
    assert_eq!(occurrences.len(), 2);
    assert!(
        occurrences
            .iter()
            .all(|o| o.location == Some(Location::new("a.syn", 9, 5)))
    );
}

fn single_field(value: &str) -> CompiledProject {
    CompiledProject::new().with_source(
        SourceRecord::new("@r1").with_item(
            ItemRecord::new()
                .with_location(loc("a.syn", 2, 5))
                .with_field(FieldOccurrence::new("code", value).at(loc("a.syn", 3, 9))),
        ),
    )
}

#[test]
fn test_code_inside_longer_code_is_not_a_mention() {
    let linked = link(single_field("alpha, alpha beta"));

    let alpha: Vec<_> = code_occurrences(&linked, "alpha")
        .into_iter()
        .map(|o| o.location)
        .collect();
    assert_eq!(alpha, vec![Some(Location::new("a.syn", 3, 9))]);

    let alpha_beta: Vec<_> = code_occurrences(&linked, "alpha beta")
        .into_iter()
        .map(|o| o.location)
        .collect();
    assert_eq!(alpha_beta, vec![Some(Location::new("a.syn", 3, 16))]);
}

#[test]
fn test_code_with_inner_whitespace_resolves_exactly() {
    let linked = link(single_field("x, meu   conceito"));
    assert_eq!(linked.usage("meu conceito").len(), 1);

    let locations: Vec<_> = code_occurrences(&linked, "meu conceito")
        .into_iter()
        .map(|o| o.location)
        .collect();
    assert_eq!(locations, vec![Some(Location::new("a.syn", 3, 12))]);
}

#[test]
fn test_token_positions_skip_partial_words() {
    let start = LineCol::new(3, 15);
    assert_eq!(
        token_positions(start, "alphabet, alpha", "alpha"),
        vec![LineCol::new(3, 25)]
    );
    assert_eq!(resolve_token_position(start, "alphabet", "alpha", 0), None);
}
