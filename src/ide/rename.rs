//! Rename of codes and bibliographic references across the workspace.
//!
//! The index decides which symbol is being renamed and which files must be
//! touched. The edits themselves come from a word-boundary textual scan of those
//! files plus every annotation file under the root, so mentions the compiler does
//! not expose (free text, `.bib` keys) are rewritten too.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use super::error::RenameError;
use crate::base::LineCol;
use crate::base::constants::KEYWORDS;
use crate::core::text_utils::{extract_symbol_at_cursor, find_word_matches, is_word_character};
use crate::hir::LinkedProject;
use crate::project::WorkspaceOptions;
use crate::project::file_loader::collect_file_paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameKind {
    Code,
    Reference,
}

/// Half-open range, 1-indexed, columns in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Range {
    pub start: LineCol,
    pub end: LineCol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

/// Edits per workspace-relative file, each list ordered and non-overlapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkspaceEdit {
    pub changes: BTreeMap<String, Vec<TextEdit>>,
}

impl WorkspaceEdit {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.changes.len()
    }

    pub fn edit_count(&self) -> usize {
        self.changes.values().map(Vec::len).sum()
    }

    pub fn edits_for(&self, file: &str) -> &[TextEdit] {
        self.changes.get(file).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Symbol under the cursor that a rename would act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareRename {
    pub kind: RenameKind,
    /// Name as written, without the reference prefix.
    pub name: String,
    /// Columns of `name` in the line (1-indexed, end exclusive).
    pub start_column: u32,
    pub end_column: u32,
}

/// Whether `token` names a known code or reference. Never scans files.
pub fn is_renameable(linked: &LinkedProject, token: &str) -> bool {
    let token = token.trim();
    if token.is_empty() || KEYWORDS.contains(&token) {
        return false;
    }
    if token.starts_with(linked.reference_prefix()) {
        return linked.source(token).is_some();
    }
    linked.is_known_code(token) || linked.source(token).is_some()
}

/// Resolve the renameable symbol at `column` (1-indexed) of `line_text`.
pub fn prepare_rename(
    linked: &LinkedProject,
    line_text: &str,
    column: u32,
) -> Option<PrepareRename> {
    let prefix = linked.reference_prefix();
    let position = (column as usize).checked_sub(1)?;
    let (symbol, start, end) = extract_symbol_at_cursor(line_text, position, prefix)?;

    let (kind, name, start) = if let Some(bare) = symbol.strip_prefix(prefix) {
        (RenameKind::Reference, bare.to_string(), start + 1)
    } else if KEYWORDS.contains(&symbol.as_str()) {
        return None;
    } else if linked.is_known_code(&symbol) {
        (RenameKind::Code, symbol, start)
    } else if linked.source(&symbol).is_some() {
        (RenameKind::Reference, symbol, start)
    } else {
        return None;
    };

    if kind == RenameKind::Reference && linked.source(&name).is_none() {
        return None;
    }

    Some(PrepareRename {
        kind,
        name,
        start_column: start as u32 + 1,
        end_column: end as u32 + 1,
    })
}

/// Compute the edits renaming `old_name` to `new_name`.
pub fn compute_rename(
    linked: &LinkedProject,
    root: &Path,
    options: &WorkspaceOptions,
    kind: RenameKind,
    old_name: &str,
    new_name: &str,
) -> Result<WorkspaceEdit, RenameError> {
    let target = match kind {
        RenameKind::Code => code_target(linked, old_name, new_name)?,
        RenameKind::Reference => reference_target(linked, old_name, new_name)?,
    };
    if target.tokens.iter().all(|t| *t == target.new_text) {
        return Err(RenameError::NoChanges);
    }
    if let Some(variant) = target.tokens.iter().find(|t| **t != target.tokens[0]) {
        return Err(RenameError::SpellingMismatch {
            name: target.tokens[0].clone(),
            variant: variant.clone(),
        });
    }

    let mut files: BTreeSet<PathBuf> = target.files.iter().map(|f| root.join(f)).collect();
    match collect_file_paths(root, &options.annotation_extensions, &options.ignored_dirs) {
        Ok(paths) => files.extend(paths),
        Err(err) => warn!(root = %root.display(), error = %err, "workspace scan failed"),
    }

    let scanned: Vec<(String, Vec<TextEdit>, bool)> = files
        .into_par_iter()
        .filter_map(|path| {
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "skipping unreadable file");
                    return None;
                }
            };
            let in_use = contains_word(&text, &target.new_text);
            let edits = scan_text(&text, &target.tokens, &target.new_text);
            Some((relative_path(&path, root), edits, in_use))
        })
        .collect();

    // Renaming onto existing text would merge it into the symbol.
    if let Some((file, _, _)) = scanned.iter().find(|(_, _, in_use)| *in_use) {
        warn!(new = %target.new_text, %file, "new name already present");
        return Err(RenameError::NameInUse(target.new_text));
    }

    let changes: BTreeMap<String, Vec<TextEdit>> = scanned
        .into_iter()
        .filter(|(_, edits, _)| !edits.is_empty())
        .map(|(file, edits, _)| (file, edits))
        .collect();

    let edit = WorkspaceEdit { changes };
    if edit.is_empty() {
        return Err(RenameError::NoChanges);
    }

    info!(
        kind = ?kind,
        old = old_name,
        new = %target.new_text,
        files = edit.file_count(),
        edits = edit.edit_count(),
        "rename computed"
    );
    Ok(edit)
}

/// Apply one file's edits to its text.
///
/// Edits must be non-overlapping; ranges that fall outside `text` are ignored.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect();

    let mut resolved: Vec<(usize, usize, &str)> = edits
        .iter()
        .filter_map(|edit| {
            let start = byte_offset(text, &line_starts, edit.range.start)?;
            let end = byte_offset(text, &line_starts, edit.range.end)?;
            (start <= end).then_some((start, end, edit.new_text.as_str()))
        })
        .collect();
    resolved.sort_by(|a, b| b.0.cmp(&a.0));

    let mut result = text.to_string();
    for (start, end, new_text) in resolved {
        result.replace_range(start..end, new_text);
    }
    result
}

// ============================================================================
// TARGETS
// ============================================================================

struct RenameTarget {
    /// Exact spellings to replace.
    tokens: Vec<String>,
    new_text: String,
    /// Workspace-relative files known from the index.
    files: BTreeSet<String>,
}

fn code_target(
    linked: &LinkedProject,
    old_name: &str,
    new_name: &str,
) -> Result<RenameTarget, RenameError> {
    let old_name = old_name.trim();
    if !linked.is_known_code(old_name) {
        return Err(RenameError::UnknownSymbol(old_name.to_string()));
    }

    let new_name = new_name.trim();
    if !is_valid_code_name(new_name) {
        return Err(RenameError::InvalidName(new_name.to_string()));
    }
    if new_name != old_name && linked.is_known_code(new_name) {
        return Err(RenameError::NameConflict(new_name.to_string()));
    }

    let mut tokens = vec![old_name.to_string()];
    let mut files = BTreeSet::new();

    if let Some(concept) = linked.concept(old_name) {
        if concept.name != old_name {
            tokens.push(concept.name.to_string());
        }
        files.extend(concept.location.iter().map(|l| l.file.to_string()));
    }
    for mention in linked.mentions_of(old_name) {
        let field = linked.field(mention.item, mention.field);
        let item = linked.item(mention.item);
        let location = field
            .and_then(|f| f.location.as_ref())
            .or_else(|| item.and_then(|i| i.location.as_ref()));
        files.extend(location.map(|l| l.file.to_string()));
    }

    Ok(RenameTarget {
        tokens,
        new_text: new_name.to_string(),
        files,
    })
}

fn reference_target(
    linked: &LinkedProject,
    old_name: &str,
    new_name: &str,
) -> Result<RenameTarget, RenameError> {
    let prefix = linked.reference_prefix();
    let Some(source) = linked.source(old_name) else {
        return Err(RenameError::UnknownSymbol(old_name.trim().to_string()));
    };

    let new_bare = new_name.trim().trim_start_matches(prefix);
    if new_bare.is_empty() || !new_bare.chars().all(is_word_character) {
        return Err(RenameError::InvalidName(new_name.trim().to_string()));
    }
    if linked
        .source(new_bare)
        .is_some_and(|other| !std::ptr::eq(other, source))
    {
        return Err(RenameError::NameConflict(new_bare.to_string()));
    }

    let mut tokens = vec![source.bibref.trim_start_matches(prefix).to_string()];
    let mut files = BTreeSet::new();
    files.extend(source.location.iter().map(|l| l.file.to_string()));
    for item in &source.items {
        files.extend(item.location.iter().map(|l| l.file.to_string()));
    }
    if let Some(entry) = linked.bib_entry(old_name) {
        let key = entry.key.trim_start_matches(prefix).to_string();
        if !tokens.contains(&key) {
            tokens.push(key);
        }
        files.extend(entry.location.iter().map(|l| l.file.to_string()));
    }

    Ok(RenameTarget {
        tokens,
        new_text: new_bare.to_string(),
        files,
    })
}

/// Codes live inside comma lists and chains, so their separators are not allowed.
fn is_valid_code_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().any(is_word_character)
        && !name.contains([',', ';', '\n', '\r', '-', ':', '@'])
        && !KEYWORDS.contains(&name)
}

// ============================================================================
// SCANNING
// ============================================================================

/// Word-boundary matches of any token, as ordered non-overlapping edits.
fn scan_text(text: &str, tokens: &[String], new_text: &str) -> Vec<TextEdit> {
    let mut edits = Vec::new();

    for (line_index, line) in text.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let line_no = line_index as u32 + 1;
        let mut line_edits: Vec<TextEdit> = Vec::new();

        for token in tokens {
            let width = token.chars().count() as u32;
            for offset in find_word_matches(line, token) {
                let start = offset as u32 + 1;
                let range = Range {
                    start: LineCol::new(line_no, start),
                    end: LineCol::new(line_no, start + width),
                };
                let overlaps = line_edits
                    .iter()
                    .any(|e| range.start < e.range.end && e.range.start < range.end);
                if !overlaps {
                    line_edits.push(TextEdit {
                        range,
                        new_text: new_text.to_string(),
                    });
                }
            }
        }

        line_edits.sort_by_key(|e| e.range.start);
        edits.extend(line_edits);
    }

    edits
}

fn contains_word(text: &str, word: &str) -> bool {
    text.split('\n')
        .any(|line| !find_word_matches(line.strip_suffix('\r').unwrap_or(line), word).is_empty())
}

fn relative_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

fn byte_offset(text: &str, line_starts: &[usize], pos: LineCol) -> Option<usize> {
    let line_start = *line_starts.get((pos.line as usize).checked_sub(1)?)?;
    let line_end = text[line_start..]
        .find('\n')
        .map_or(text.len(), |i| line_start + i);
    let line = &text[line_start..line_end];
    let column = (pos.column as usize).checked_sub(1)?;

    if column == line.chars().count() {
        return Some(line_end);
    }
    line.char_indices()
        .nth(column)
        .map(|(byte, _)| line_start + byte)
}
