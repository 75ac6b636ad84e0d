//! # orbweb
//!
//! Map the internal structure of a Python package as a typed graph.
//!
//! orbweb inspects a package (submodules, classes, inheritance chains,
//! methods, functions, and source files) and reconstructs it as a directed,
//! typed graph, then hands that graph to a visualization or serialization
//! consumer as JSON.
//!
//! ## Key Features
//!
//! - **Typed graph**: per-kind vertex uniqueness, idempotent edges
//! - **Cycle-safe**: import cycles and diamonds terminate via a visited set
//! - **Best-effort**: a module that fails to load never aborts the scan
//! - **Filterable**: regex exclusion rules suppress whole subtrees
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use orbweb::{ExclusionFilter, GraphDump, Scanner};
//!
//! // Scan a package directory
//! let (mut scanner, root) =
//!     Scanner::for_path(Path::new("./mypkg"), ExclusionFilter::new()).unwrap();
//! let report = scanner.scan(&root).unwrap();
//! println!("{}", report.summary);
//!
//! // Hand the graph to a consumer
//! let dump = GraphDump::from_store(scanner.graph());
//! ```
//!
//! ## Known Limitations
//!
//! Class, function, and method vertices are keyed by simple name: two
//! unrelated classes named `Handler` collapse into one vertex. Module
//! vertices are keyed by fully qualified dotted path and do not collapse.

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod inspect;
pub mod scan;
pub mod scrape;

// Re-exports for convenience
pub use error::{OrbwebError, Result};

// Graph re-exports
pub use graph::{EdgeKind, GraphDump, GraphStore, GraphSummary, VertexKind};

// Scan pipeline
pub use filter::ExclusionFilter;
pub use inspect::{DiscoverModules, FsDiscoverer, Introspect, ModuleWorld, ObjectId, Role};
pub use scan::{ScanReport, Scanner};
pub use scrape::Scraper;
