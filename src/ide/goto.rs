//! Go-to-definition for references and codes.

use serde::Serialize;
use smol_str::SmolStr;

use super::references::SymbolKind;
use crate::base::Location;
use crate::base::constants::KEYWORDS;
use crate::core::text_utils::extract_symbol_at_cursor;
use crate::hir::LinkedProject;

/// Result of a go-to-definition request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GotoResult {
    pub targets: Vec<GotoTarget>,
}

impl GotoResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(target: GotoTarget) -> Self {
        Self {
            targets: vec![target],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Where a symbol is declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GotoTarget {
    #[serde(flatten)]
    pub location: Location,
    pub kind: SymbolKind,
    /// Name as declared.
    pub name: SmolStr,
}

/// Declaration of the symbol at `column` (1-indexed) of `line_text`.
///
/// A prefixed reference goes to its SOURCE block, or to its bibliography entry
/// when the block has no position. Any other word goes to the ONTOLOGY block
/// defining it, matched ignoring case.
pub fn goto_definition(linked: &LinkedProject, line_text: &str, column: u32) -> GotoResult {
    let prefix = linked.reference_prefix();
    let Some(position) = (column as usize).checked_sub(1) else {
        return GotoResult::empty();
    };
    let Some((symbol, _, _)) = extract_symbol_at_cursor(line_text, position, prefix) else {
        return GotoResult::empty();
    };

    let target = if symbol.starts_with(prefix) {
        reference_target(linked, &symbol)
    } else if KEYWORDS.contains(&symbol.as_str()) {
        None
    } else {
        linked.concept(&symbol).and_then(|concept| {
            Some(GotoTarget {
                location: concept.location.clone()?,
                kind: SymbolKind::Code,
                name: concept.name.clone(),
            })
        })
    };

    target.map_or_else(GotoResult::empty, GotoResult::single)
}

fn reference_target(linked: &LinkedProject, reference: &str) -> Option<GotoTarget> {
    let source = linked.source(reference);
    let location = source
        .and_then(|s| s.location.clone())
        .or_else(|| linked.bib_entry(reference).and_then(|e| e.location.clone()))?;
    let name = match source {
        Some(source) => source.bibref.clone(),
        None => SmolStr::new(reference),
    };
    Some(GotoTarget {
        location,
        kind: SymbolKind::Reference,
        name,
    })
}
