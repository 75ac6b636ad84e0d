//! Structure graph module: the typed vertex/edge repository a scan fills.
//!
//! Provides the data model, the get-or-create store, and the serializable
//! dump handed to downstream consumers.

pub mod export;
pub mod store;
pub mod types;

pub use export::{EdgeDump, GraphDump, VertexDump};
pub use store::{GraphStore, VertexId};
pub use types::{EdgeData, EdgeKind, GraphSummary, VertexData, VertexKind};
