//! Core types for the structure graph.
//!
//! Defines vertex kinds, edge kinds, and the data carried on each: the
//! vocabulary the traversal speaks and the dump format exposes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a vertex in the structure graph.
///
/// Uniqueness is enforced per kind on the vertex name: asking the store for a
/// `(kind, name)` pair that already exists returns the existing vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexKind {
    /// A module, named by its fully qualified dotted path (`pkg.sub.mod`).
    Module,
    /// A package. Declared for completeness; the scan keys packages as
    /// `Module` vertices and distinguishes them by their `contains` edges.
    Package,
    /// A class, named by its simple name as exposed by introspection.
    Class,
    /// A free function.
    Function,
    /// A method bound to a class.
    Method,
    /// A source file, named by its resolved path. Always a leaf.
    File,
}

impl fmt::Display for VertexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexKind::Module => write!(f, "module"),
            VertexKind::Package => write!(f, "package"),
            VertexKind::Class => write!(f, "class"),
            VertexKind::Function => write!(f, "function"),
            VertexKind::Method => write!(f, "method"),
            VertexKind::File => write!(f, "file"),
        }
    }
}

/// The kind of a directed edge in the structure graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// Module holds another module as a live attribute (module -> module).
    Imports,
    /// Package directory enumeration found the target (package -> module).
    Contains,
    /// Class member of a module or class (module/class -> class).
    HasClass,
    /// Function member of a module or class (module/class -> function).
    HasFunction,
    /// Method member of a class (class -> method).
    HasMethod,
    /// Next ancestor in the linearized ancestor chain (class -> class).
    Subclasses,
    /// Defining source file (any non-file vertex -> file).
    FoundIn,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Imports => write!(f, "imports"),
            EdgeKind::Contains => write!(f, "contains"),
            EdgeKind::HasClass => write!(f, "has-class"),
            EdgeKind::HasFunction => write!(f, "has-function"),
            EdgeKind::HasMethod => write!(f, "has-method"),
            EdgeKind::Subclasses => write!(f, "subclasses"),
            EdgeKind::FoundIn => write!(f, "found-in"),
        }
    }
}

/// Data stored on a graph vertex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexData {
    /// What kind of element this is.
    pub kind: VertexKind,
    /// The name the uniqueness constraint is keyed on.
    pub name: String,
    /// Extra property: set for classes whose bases name an abstract marker.
    /// Repeated sets are last-write-wins.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_abstract: bool,
}

impl VertexData {
    pub fn new(kind: VertexKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            is_abstract: false,
        }
    }
}

/// Data stored on a graph edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeData {
    /// The kind of relationship.
    pub kind: EdgeKind,
}

impl EdgeData {
    pub fn new(kind: EdgeKind) -> Self {
        Self { kind }
    }
}

/// Per-kind vertex counts plus totals, reported after a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub modules: usize,
    pub packages: usize,
    pub classes: usize,
    pub methods: usize,
    pub functions: usize,
    pub files: usize,
    pub vertices: usize,
    pub edges: usize,
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vertices:  {}", self.vertices)?;
        writeln!(f, "Edges:     {}", self.edges)?;
        writeln!(f, "Modules:   {}", self.modules)?;
        writeln!(f, "Classes:   {}", self.classes)?;
        writeln!(f, "Methods:   {}", self.methods)?;
        writeln!(f, "Functions: {}", self.functions)?;
        write!(f, "Files:     {}", self.files)
    }
}
