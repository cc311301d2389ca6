//! Compiled-project model and the seams around the external compiler.
//!
//! The compiler itself lives outside this crate. This module defines what it hands
//! back ([`CompiledProject`]), how it is invoked ([`Compiler`]), how it fails
//! ([`CompileError`]) and the options shared by everything downstream.

mod compiler;
mod config;
mod error;
pub mod file_loader;
mod model;

pub use compiler::Compiler;
pub use config::WorkspaceOptions;
pub use error::CompileError;
pub use model::{
    BibEntry, CompiledProject, FieldKind, FieldMap, FieldOccurrence, FieldScope, FieldSpec,
    FieldValue, ItemRecord, OntologyConcept, ProjectMetadata, SourceRecord, TemplateSpec,
};
