//! Hover information for references, template fields, block keywords and codes.

use serde::Serialize;

use super::ontology::concept_usage;
use crate::core::text_utils::extract_symbol_at_cursor;
use crate::hir::LinkedProject;
use crate::project::{FieldMap, FieldScope, FieldSpec, SourceRecord};

const MISSING: &str = "N/A";
const FIELD_PREVIEW_CHARS: usize = 80;
const BLOCK_PREVIEW_FIELDS: usize = 10;

/// Result of a hover request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverResult {
    /// The hover content (markdown).
    pub contents: String,
    /// Columns of the hovered word (1-indexed, end exclusive).
    pub start_column: u32,
    pub end_column: u32,
}

/// Hover for the word at `column` (1-indexed) of `line_text`.
///
/// - `@ref`: its bibliography entry, else the SOURCE fields
/// - a label followed by `:`: the template specification of that field
/// - `SOURCE`, `ITEM`, `ONTOLOGY`: the template fields declared for the block
/// - anything else: the ontology concept it names, with its usage count
pub fn hover(linked: &LinkedProject, line_text: &str, column: u32) -> Option<HoverResult> {
    let prefix = linked.reference_prefix();
    let position = (column as usize).checked_sub(1)?;
    let (symbol, start, end) = extract_symbol_at_cursor(line_text, position, prefix)?;

    let contents = if symbol.starts_with(prefix) {
        reference_hover(linked, &symbol)?
    } else if is_field_label(line_text, start, end) {
        field_hover(linked.project().template.get(&symbol)?)
    } else if let Some(scope) = FieldScope::from_keyword(&symbol) {
        block_hover(linked, scope)?
    } else {
        code_hover(linked, &symbol)?
    };

    Some(HoverResult {
        contents,
        start_column: start as u32 + 1,
        end_column: end as u32 + 1,
    })
}

/// `name:` at the start of the line, but not a `QUALIFIER::` prefix.
fn is_field_label(line: &str, start: usize, end: usize) -> bool {
    let chars: Vec<char> = line.chars().collect();
    let leading_blank = chars[..start].iter().all(|c| c.is_whitespace());
    let mut rest = chars[end..].iter().skip_while(|c| c.is_whitespace());
    leading_blank && rest.next() == Some(&':') && rest.next() != Some(&':')
}

fn reference_hover(linked: &LinkedProject, reference: &str) -> Option<String> {
    if let Some(entry) = linked.bib_entry(reference) {
        let entry_type = if entry.entry_type.is_empty() {
            MISSING
        } else {
            entry.entry_type.as_str()
        };
        return Some(format!(
            "**{}**\n\n*{}* ({})\n\nType: `{}`",
            first_or_missing(&entry.fields, "title"),
            first_or_missing(&entry.fields, "author"),
            first_or_missing(&entry.fields, "year"),
            entry_type
        ));
    }

    linked.source(reference).map(source_hover)
}

fn first_or_missing<'a>(fields: &'a FieldMap, name: &str) -> &'a str {
    fields.values(name).first().copied().unwrap_or(MISSING)
}

fn source_hover(source: &SourceRecord) -> String {
    let mut md = format!("**{}**\n\n", source.bibref);
    for (name, value) in source.fields.iter() {
        md.push_str(&format!("- {}: {}\n", name, preview(&value.values().join("; "))));
    }
    md.push_str(&format!("\nItems: **{}**", source.items.len()));
    md
}

fn field_hover(spec: &FieldSpec) -> String {
    format!(
        "**Field: `{}`**\n\n- Type: `{}`\n- Scope: `{}`\n",
        spec.name,
        spec.kind.as_str(),
        spec.scope.keyword()
    )
}

fn block_hover(linked: &LinkedProject, scope: FieldScope) -> Option<String> {
    let mut fields: Vec<&FieldSpec> = linked
        .project()
        .template
        .fields()
        .filter(|spec| spec.scope == scope)
        .collect();
    if fields.is_empty() {
        return None;
    }
    fields.sort_by_key(|spec| spec.name.to_lowercase());

    let mut md = format!("**Block {}**\n\nDefined fields ({}):\n", scope.keyword(), fields.len());
    for spec in fields.iter().take(BLOCK_PREVIEW_FIELDS) {
        md.push_str(&format!("- `{}` ({})\n", spec.name, spec.kind.as_str()));
    }
    if fields.len() > BLOCK_PREVIEW_FIELDS {
        md.push_str(&format!("... and {} more fields", fields.len() - BLOCK_PREVIEW_FIELDS));
    }
    Some(md)
}

fn code_hover(linked: &LinkedProject, code: &str) -> Option<String> {
    let concept = linked.concept(code)?;

    let mut md = format!("**Ontology: `{}`**\n\n", concept.name);
    if let Some(description) = concept.fields.values("description").first() {
        md.push_str(description);
        md.push_str("\n\n");
    }
    for (name, value) in concept.fields.iter() {
        if name.eq_ignore_ascii_case("description") {
            continue;
        }
        md.push_str(&format!("- {}: {}\n", name, preview(&value.values().join("; "))));
    }
    md.push_str(&format!(
        "\nUsed in **{}** items",
        concept_usage(linked, &concept.name).len()
    ));
    Some(md)
}

fn preview(value: &str) -> String {
    value.chars().take(FIELD_PREVIEW_CHARS).collect()
}
