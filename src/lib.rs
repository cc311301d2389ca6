//! # synesis-base
//!
//! Workspace semantic cache, cross-file linked index and query/rename engine for
//! Synesis annotation projects.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → AnalysisHost (cache + reload), queries, rename
//!   ↓
//! hir       → LinkedProject index, chain parsing, position resolution
//!   ↓
//! project   → Compiled project model, Compiler trait, options
//!   ↓
//! core      → Text utilities (word boundaries, normalization)
//!   ↓
//! base      → Primitives (Location, LineCol, constants)
//! ```
//!
//! The text-to-structure compiler is an external collaborator: it is plugged in
//! through [`project::Compiler`] and hands back a [`project::CompiledProject`].

// ============================================================================
// MODULES (dependency order: base → core → project → hir → ide)
// ============================================================================

/// Foundation types: Location, LineCol, constants
pub mod base;

/// Text utilities shared by the index and the rename engine
pub mod core;

/// Compiled project model and the compiler seam
pub mod project;

/// Linked index: source registry, code usage, triples, topics
pub mod hir;

/// Editor-facing features: cache, reload, queries, rename
pub mod ide;

// Re-export foundation types
pub use base::{LineCol, Location};
