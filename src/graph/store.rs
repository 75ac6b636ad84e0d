//! The typed vertex/edge store backing a scan.
//!
//! Wraps petgraph with per-kind uniqueness on vertex names and idempotent
//! edge creation: asking for a vertex or edge that already exists returns
//! the existing one. The store performs no I/O and is mutated by exactly
//! one scan at a time.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use std::collections::{HashMap, HashSet};

use super::types::{EdgeData, EdgeKind, GraphSummary, VertexData, VertexKind};

/// Identifier of a vertex in the store. Stable for the store's lifetime.
pub type VertexId = NodeIndex;

/// The structure graph: vertices, edges, and the uniqueness indexes.
pub struct GraphStore {
    /// The directed graph holding all structure relationships.
    graph: DiGraph<VertexData, EdgeData>,
    /// Index: (kind, name) -> vertex, enforcing the per-kind name constraint.
    vertex_index: HashMap<(VertexKind, String), VertexId>,
    /// Index: (kind, from, to) -> present, making edge creation idempotent.
    edge_index: HashSet<(EdgeKind, VertexId, VertexId)>,
}

impl GraphStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            vertex_index: HashMap::new(),
            edge_index: HashSet::new(),
        }
    }

    // ─── Vertex Operations ──────────────────────────────────────

    /// Return the vertex of `(kind, name)`, creating it if absent.
    pub fn get_or_create_vertex(&mut self, kind: VertexKind, name: &str) -> VertexId {
        if let Some(&id) = self.vertex_index.get(&(kind, name.to_string())) {
            return id;
        }
        let id = self.graph.add_node(VertexData::new(kind, name));
        self.vertex_index.insert((kind, name.to_string()), id);
        id
    }

    /// Like [`get_or_create_vertex`](Self::get_or_create_vertex), but also
    /// sets the abstract flag. Repeated calls are last-write-wins on the
    /// flag; the vertex itself is never duplicated.
    pub fn get_or_create_vertex_with(
        &mut self,
        kind: VertexKind,
        name: &str,
        is_abstract: bool,
    ) -> VertexId {
        let id = self.get_or_create_vertex(kind, name);
        self.graph[id].is_abstract = is_abstract;
        id
    }

    /// Look up a vertex without creating it.
    pub fn find_vertex(&self, kind: VertexKind, name: &str) -> Option<VertexId> {
        self.vertex_index.get(&(kind, name.to_string())).copied()
    }

    /// Data of an existing vertex. Ids only ever come from this store, so an
    /// invalid id is a programming error and panics.
    pub fn vertex(&self, id: VertexId) -> &VertexData {
        &self.graph[id]
    }

    // ─── Edge Operations ────────────────────────────────────────

    /// Return the edge `(kind, from, to)`, creating it if absent. Calling
    /// twice with identical arguments never grows the edge count.
    pub fn get_or_create_edge(
        &mut self,
        kind: EdgeKind,
        from: VertexId,
        to: VertexId,
    ) -> EdgeIndex {
        use petgraph::visit::EdgeRef;
        if self.edge_index.contains(&(kind, from, to)) {
            // the index only holds created edges, so this find cannot miss
            if let Some(existing) = self
                .graph
                .edges_connecting(from, to)
                .find(|e| e.weight().kind == kind)
            {
                return existing.id();
            }
        }
        self.edge_index.insert((kind, from, to));
        self.graph.add_edge(from, to, EdgeData::new(kind))
    }

    // ─── Enumeration ────────────────────────────────────────────

    /// All vertices, in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.graph
            .node_indices()
            .map(move |id| (id, &self.graph[id]))
    }

    /// Vertices of one kind.
    pub fn vertices_of(&self, kind: VertexKind) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices().filter(move |(_, v)| v.kind == kind)
    }

    /// All edges as `(kind, from, to)` triples.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKind, VertexId, VertexId)> + '_ {
        use petgraph::visit::EdgeRef;
        self.graph
            .edge_references()
            .map(|e| (e.weight().kind, e.source(), e.target()))
    }

    /// Edges of one kind.
    pub fn edges_of(
        &self,
        kind: EdgeKind,
    ) -> impl Iterator<Item = (EdgeKind, VertexId, VertexId)> + '_ {
        self.edges().filter(move |(k, _, _)| *k == kind)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    // ─── Stats ──────────────────────────────────────────────────

    /// Per-kind counts plus totals.
    pub fn summary(&self) -> GraphSummary {
        let mut summary = GraphSummary {
            vertices: self.vertex_count(),
            edges: self.edge_count(),
            ..GraphSummary::default()
        };
        for v in self.graph.node_weights() {
            match v.kind {
                VertexKind::Module => summary.modules += 1,
                VertexKind::Package => summary.packages += 1,
                VertexKind::Class => summary.classes += 1,
                VertexKind::Method => summary.methods += 1,
                VertexKind::Function => summary.functions += 1,
                VertexKind::File => summary.files += 1,
            }
        }
        summary
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
