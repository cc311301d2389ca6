//! Chain expressions: `[qualifier::]concept - relation - concept [- relation - concept ...]`.

use serde::Serialize;
use smol_str::SmolStr;
use thiserror::Error;

use crate::base::constants::{CHAIN_SEPARATOR, QUALIFIER_SEPARATOR};
use crate::core::text_utils::collapse_whitespace;

/// Whether a chain carries an explicit relation-type qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainKind {
    Qualified,
    Simple,
}

impl ChainKind {
    /// Classify chain text by the presence of the qualifier separator.
    pub fn classify(text: &str) -> Self {
        if text.contains(QUALIFIER_SEPARATOR) {
            Self::Qualified
        } else {
            Self::Simple
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Qualified => "qualified",
            Self::Simple => "simple",
        }
    }
}

/// One concept or relation label, with the char offset where it starts in the field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPart {
    pub text: SmolStr,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChain {
    pub qualifier: Option<SmolStr>,
    pub kind: ChainKind,
    /// Alternating concept, relation, concept, ...
    pub parts: Vec<ChainPart>,
}

impl ParsedChain {
    /// Consecutive `(subject, relation, object)` windows.
    pub fn triples(&self) -> impl Iterator<Item = (&ChainPart, &ChainPart, &ChainPart)> {
        self.parts
            .windows(3)
            .step_by(2)
            .map(|w| (&w[0], &w[1], &w[2]))
    }

    /// Concept parts only (even positions).
    pub fn concepts(&self) -> impl Iterator<Item = &ChainPart> {
        self.parts.iter().step_by(2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("empty chain expression")]
    Empty,

    #[error("chain has {0} part(s), expected concept - relation - concept")]
    TooShort(usize),

    #[error("chain ends with relation '{0}' and no target concept")]
    DanglingRelation(SmolStr),

    #[error("empty segment at position {0}")]
    EmptySegment(usize),
}

/// Split a chain field value into expressions (line breaks and `;`).
///
/// Returns each non-blank expression with the char offset where it starts.
pub fn split_expressions(value: &str) -> Vec<(usize, &str)> {
    let mut expressions = Vec::new();
    let mut start_byte = 0;
    let mut start_char = 0;

    for (char_index, (byte, c)) in value.char_indices().enumerate() {
        if c == '\n' || c == ';' {
            let segment = &value[start_byte..byte];
            if !segment.trim().is_empty() {
                expressions.push((start_char, segment));
            }
            start_byte = byte + c.len_utf8();
            start_char = char_index + 1;
        }
    }

    let tail = &value[start_byte..];
    if !tail.trim().is_empty() {
        expressions.push((start_char, tail));
    }

    expressions
}

/// Parse one chain expression that starts at char `offset` of its field value.
pub fn parse_chain(expr: &str, offset: usize) -> Result<ParsedChain, ChainError> {
    let kind = ChainKind::classify(expr);

    let (qualifier, body, body_offset) = match expr.find(QUALIFIER_SEPARATOR) {
        Some(byte) => {
            let qualifier = expr[..byte].trim();
            let body_byte = byte + QUALIFIER_SEPARATOR.len();
            (
                (!qualifier.is_empty()).then(|| SmolStr::new(qualifier)),
                &expr[body_byte..],
                offset + expr[..body_byte].chars().count(),
            )
        }
        None => (None, expr, offset),
    };

    if body.trim().is_empty() {
        return Err(ChainError::Empty);
    }

    let mut parts = Vec::new();
    let mut char_pos = body_offset;

    for (index, raw) in body.split(CHAIN_SEPARATOR).enumerate() {
        let leading = raw.chars().take_while(|c| c.is_whitespace()).count();
        let text = collapse_whitespace(raw);
        if text.is_empty() {
            return Err(ChainError::EmptySegment(index));
        }
        parts.push(ChainPart {
            text: SmolStr::new(text),
            offset: char_pos + leading,
        });
        char_pos += raw.chars().count() + 1;
    }

    if parts.len() < 3 {
        return Err(ChainError::TooShort(parts.len()));
    }
    if parts.len() % 2 == 0 {
        let relation = parts.last().map(|p| p.text.clone()).unwrap_or_default();
        return Err(ChainError::DanglingRelation(relation));
    }

    Ok(ParsedChain {
        qualifier,
        kind,
        parts,
    })
}
