//! High-level index (HIR): the cross-referenced view of one compiled project.
//!
//! ## Key Types
//!
//! - [`LinkedProject`]: source registry, code usage, ontology registry, triples, topics
//! - [`RelationTriple`]: `(subject, relation, object)` extracted from a chain field
//! - [`ParsedChain`]: a chain expression split into concepts and relations
//!
//! ## Build Layers
//!
//! ```text
//! CompiledProject           ← INPUT: typed tree from the external compiler
//!     │
//!     ▼
//! field roles               ← template kind, else configured field names
//!     │
//!     ▼
//! split_codes / parse_chain ← per-field extraction (malformed values become notes)
//!     │
//!     ▼
//! LinkedProject             ← immutable, shared behind Arc
//! ```
//!
//! Positions of tokens inside field values are computed by the helpers in
//! [`positions`], which the query layer calls lazily.

mod chain;
mod linked;
pub mod positions;

pub use chain::{ChainError, ChainKind, ChainPart, ParsedChain, parse_chain, split_expressions};
pub use linked::{
    CodeMention, IndexNote, ItemRef, LinkedProject, OccurrenceContext, ProjectStats,
    RelationTriple, split_codes,
};
pub use positions::{offset_position, resolve_token_position, token_positions};
