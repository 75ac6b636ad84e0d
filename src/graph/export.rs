//! Serializable snapshot of a finished graph.
//!
//! This is the handoff surface for downstream visualization/serialization
//! consumers: a flat list of vertices and edges (edges reference vertices by
//! their stable store ids) plus the summary counts.

use serde::{Deserialize, Serialize};

use super::store::GraphStore;
use super::types::{EdgeKind, GraphSummary, VertexKind};

/// A vertex as it appears in a dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexDump {
    pub id: usize,
    pub kind: VertexKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_abstract: bool,
}

/// An edge as it appears in a dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDump {
    pub kind: EdgeKind,
    pub from: usize,
    pub to: usize,
}

/// Complete snapshot of a graph store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDump {
    pub summary: GraphSummary,
    pub vertices: Vec<VertexDump>,
    pub edges: Vec<EdgeDump>,
}

impl GraphDump {
    /// Snapshot a store.
    pub fn from_store(store: &GraphStore) -> Self {
        let vertices = store
            .vertices()
            .map(|(id, v)| VertexDump {
                id: id.index(),
                kind: v.kind,
                name: v.name.clone(),
                is_abstract: v.is_abstract,
            })
            .collect();
        let edges = store
            .edges()
            .map(|(kind, from, to)| EdgeDump {
                kind,
                from: from.index(),
                to: to.index(),
            })
            .collect();
        Self {
            summary: store.summary(),
            vertices,
            edges,
        }
    }
}
