//! IDE features: high-level APIs for the editor-protocol layer.
//!
//! This module sits between the linked index (HIR) and the request handlers.
//! Each query corresponds to one editor request.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: queries take a `LinkedProject` in and return data out
//! 2. **No protocol types**: payloads are our own serde structs
//! 3. **Failures as values**: the boundary answers `{ success: false, error }`
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```ignore
//! use synesis::ide::AnalysisHost;
//!
//! let host = AnalysisHost::new(compiler);
//! host.reload("/ws/thesis").await?;
//!
//! let analysis = host.analysis("/ws/thesis").unwrap();
//! let relations = analysis.relations();
//! ```

mod analysis;
mod cache;
mod codes;
mod error;
mod goto;
mod graph;
mod hover;
mod ontology;
mod references;
mod relations;
mod rename;
mod response;
mod workspace;

pub use analysis::{Analysis, AnalysisHost, ReloadState};
pub use cache::{Snapshot, WorkspaceCache};
pub use codes::{CodeEntry, CodeOccurrence, code_occurrences, get_codes};
pub use error::{ReloadError, RenameError};
pub use goto::{GotoResult, GotoTarget, goto_definition};
pub use graph::{GraphEdge, GraphNode, RelationGraph, relation_graph};
pub use hover::{HoverResult, hover};
pub use ontology::{
    OntologyAnnotation, TopicConcept, TopicEntry, ontology_annotations, ontology_topics,
};
pub use references::{
    Reference, ReferenceEntry, ReferenceResult, SymbolKind, find_references, get_references,
};
pub use relations::{RelationEntry, get_relations, triple_location};
pub use rename::{
    PrepareRename, Range, RenameKind, TextEdit, WorkspaceEdit, apply_edits, compute_rename,
    is_renameable, prepare_rename,
};
pub use response::{
    AnnotationsPayload, CodesPayload, GraphPayload, NOT_LOADED, ReferencesPayload,
    RelationsPayload, ReloadResponse, RenameablePayload, Response, StatsPayload, TopicsPayload,
};
pub use workspace::{workspace_key, workspace_path};
