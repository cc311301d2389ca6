//! Relation graph built from triples.
//!
//! Nodes and edges are flat lists keyed by sanitized string ids; concept data is
//! found by looking the id up, so cycles in the relations never become ownership
//! cycles.

use std::fmt::Write as _;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Serialize;
use smol_str::SmolStr;
use tracing::debug;

use crate::core::text_utils::sanitize_id;
use crate::hir::{LinkedProject, RelationTriple};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub relation: SmolStr,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl RelationGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Outgoing edges of `id`.
    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> {
        self.edges.iter().filter(move |e| e.from == id)
    }

    /// Render as a left-to-right Mermaid flowchart.
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph LR\n");
        if self.edges.is_empty() {
            out.push_str("    empty[No relations]");
            return out;
        }

        let label = |id: &str| {
            self.node(id)
                .map(|n| mermaid_label(&n.label))
                .unwrap_or_else(|| id.to_string())
        };
        for (index, edge) in self.edges.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            let _ = write!(
                out,
                "    {}[{}] -->|{}| {}[{}]",
                edge.from,
                label(&edge.from),
                mermaid_label(&edge.relation),
                edge.to,
                label(&edge.to)
            );
        }
        out
    }
}

/// Brackets and pipes would end a Mermaid label early.
fn mermaid_label(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '[' | ']' | '|' | '"' => ' ',
            c => c,
        })
        .collect()
}

/// Build the deduplicated graph, optionally restricted to one source's items.
///
/// An unknown `reference`, or one without relations, yields an empty graph.
pub fn relation_graph(linked: &LinkedProject, reference: Option<&str>) -> RelationGraph {
    let source = match reference.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reference) => match linked.source_index(reference) {
            Some(index) => Some(index as u32),
            None => {
                debug!(reference, "graph filter names no source");
                return RelationGraph::default();
            }
        },
        None => None,
    };

    let triples = linked
        .triples()
        .iter()
        .filter(|t| source.is_none_or(|s| t.item.source == s));
    build_graph(triples)
}

fn build_graph<'a>(triples: impl Iterator<Item = &'a RelationTriple>) -> RelationGraph {
    let mut ids: IndexMap<SmolStr, String> = IndexMap::new();
    let mut used: FxHashSet<String> = FxHashSet::default();
    let mut seen: FxHashSet<(SmolStr, SmolStr, SmolStr)> = FxHashSet::default();
    let mut edges = Vec::new();

    let mut node_id = |label: &SmolStr| -> String {
        if let Some(id) = ids.get(label) {
            return id.clone();
        }
        let base = match sanitize_id(label) {
            id if id.is_empty() => "node".to_string(),
            id => id,
        };
        let mut id = base.clone();
        let mut suffix = 2;
        while used.contains(&id) {
            id = format!("{base}_{suffix}");
            suffix += 1;
        }
        used.insert(id.clone());
        ids.insert(label.clone(), id.clone());
        id
    };

    for triple in triples {
        let key = (
            triple.subject.clone(),
            triple.relation.clone(),
            triple.object.clone(),
        );
        if !seen.insert(key) {
            continue;
        }
        let from = node_id(&triple.subject);
        let to = node_id(&triple.object);
        edges.push(GraphEdge {
            from,
            to,
            relation: triple.relation.clone(),
        });
    }

    let nodes = ids
        .into_iter()
        .map(|(label, id)| GraphNode { id, label })
        .collect();
    RelationGraph { nodes, edges }
}
