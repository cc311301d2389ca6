//! Boundary payloads. Failures travel as values: `{ success: false, error }`.

use serde::Serialize;

use super::codes::CodeEntry;
use super::error::ReloadError;
use super::graph::RelationGraph;
use super::ontology::{OntologyAnnotation, TopicEntry};
use super::references::ReferenceEntry;
use super::relations::RelationEntry;
use crate::base::Location;
use crate::hir::ProjectStats;

/// Error text of every query issued before a successful reload.
pub const NOT_LOADED: &str = "workspace not loaded";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Response<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn unavailable() -> Self {
        Self::failure(NOT_LOADED)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsPayload {
    pub stats: ProjectStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferencesPayload {
    pub references: Vec<ReferenceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodesPayload {
    pub codes: Vec<CodeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationsPayload {
    pub relations: Vec<RelationEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    #[serde(flatten)]
    pub graph: RelationGraph,
    pub mermaid_code: String,
}

impl From<RelationGraph> for GraphPayload {
    fn from(graph: RelationGraph) -> Self {
        let mermaid_code = graph.to_mermaid();
        Self {
            graph,
            mermaid_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameablePayload {
    pub renameable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicsPayload {
    pub topics: Vec<TopicEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationsPayload {
    pub annotations: Vec<OntologyAnnotation>,
}

/// Outcome of a reload: stats on success, error text and location otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReloadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ProjectStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ReloadResponse {
    pub fn ok(stats: ProjectStats) -> Self {
        Self {
            success: true,
            stats: Some(stats),
            error: None,
            location: None,
        }
    }

    pub fn failed(err: &ReloadError) -> Self {
        Self {
            success: false,
            stats: None,
            error: Some(err.to_string()),
            location: err.location().cloned(),
        }
    }
}
