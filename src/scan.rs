//! Scan orchestration.
//!
//! A [`Scanner`] owns everything one scan needs (graph store, exclusion
//! rules, the introspection and discovery providers, and the visited set)
//! and seeds the traversal engine from a root module or package. Running
//! `scan` twice on the same root creates no duplicates (get-or-create
//! everywhere), but the visited set suppresses deep re-expansion: the model
//! is one shot per scanner.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::{OrbwebError, Result};
use crate::filter::ExclusionFilter;
use crate::graph::{EdgeKind, GraphStore, GraphSummary, VertexKind};
use crate::inspect::{
    DiscoverModules, FsDiscoverer, InspectError, Introspect, ModuleWorld, ObjectId,
};
use crate::scrape::{Scraper, VisitedSet};

/// Outcome of a completed scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Dotted name of the scanned root.
    pub root: String,
    /// Per-kind vertex counts plus totals.
    pub summary: GraphSummary,
}

/// Owns the state of one scan and drives the traversal engine.
pub struct Scanner<I: Introspect, D: DiscoverModules> {
    world: I,
    discoverer: D,
    graph: GraphStore,
    filter: ExclusionFilter,
    seen: VisitedSet,
}

impl Scanner<ModuleWorld, FsDiscoverer> {
    /// Scanner for a filesystem path: a package directory or a single
    /// `.py` file. Returns the scanner and the root's dotted name.
    pub fn for_path(path: &Path, filter: ExclusionFilter) -> Result<(Self, String)> {
        let path = path.canonicalize().map_err(OrbwebError::Io)?;
        let (search_root, name) = if path.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
                InspectError::ModuleNotFound(path.to_string_lossy().to_string())
            })?;
            (path.parent().unwrap_or(&path).to_path_buf(), name.to_string())
        } else {
            let stem = path.file_stem().and_then(|n| n.to_str()).ok_or_else(|| {
                InspectError::ModuleNotFound(path.to_string_lossy().to_string())
            })?;
            (path.parent().unwrap_or(&path).to_path_buf(), stem.to_string())
        };
        let world = ModuleWorld::with_root(search_root);
        Ok((Self::new(world, FsDiscoverer, filter), name))
    }
}

impl<I: Introspect, D: DiscoverModules> Scanner<I, D> {
    pub fn new(world: I, discoverer: D, filter: ExclusionFilter) -> Self {
        Self {
            world,
            discoverer,
            graph: GraphStore::new(),
            filter,
            seen: VisitedSet::new(),
        }
    }

    /// Append an exclusion rule. Only valid before the scan starts.
    pub fn add_exclusion(&mut self, pattern: &str) -> Result<()> {
        self.filter.add_rule(pattern)
    }

    /// Scan from the root module or package. Failing to load the root is
    /// the one import error that is fatal: there is nothing to scan.
    pub fn scan(&mut self, root: &str) -> Result<ScanReport> {
        let obj = self.world.import_module(root)?;
        Scraper::new(
            &mut self.world,
            &mut self.graph,
            &self.filter,
            &mut self.seen,
        )
        .scrape_module(obj);
        if self.world.is_package(obj) {
            self.scrape_pkg(obj);
        }

        let summary = self.graph.summary();
        info!("vertices: {}", summary.vertices);
        info!("edges: {}", summary.edges);
        info!("modules: {}", summary.modules);
        info!("classes: {}", summary.classes);
        info!("methods: {}", summary.methods);
        info!("functions: {}", summary.functions);
        info!("files: {}", summary.files);
        Ok(ScanReport {
            root: root.to_string(),
            summary,
        })
    }

    /// Expand a package: enumerate its directory, import each submodule,
    /// link it with a `contains` edge, recurse into subpackages, and scrape
    /// every submodule standalone. Each submodule failure is isolated.
    fn scrape_pkg(&mut self, pkg: ObjectId) {
        let pkg_name = self.world.name_of(pkg);
        let pkg_vertex = self
            .graph
            .get_or_create_vertex(VertexKind::Module, &pkg_name);
        let Some(dir) = self.world.package_dir(pkg) else {
            debug!("`{pkg_name}` has no package directory");
            return;
        };
        let submodules = match self.discoverer.list_submodules(&dir) {
            Ok(submodules) => submodules,
            Err(err) => {
                error!("could not enumerate `{pkg_name}`: {err}");
                return;
            }
        };
        for sub in submodules {
            let full_name = format!("{pkg_name}.{}", sub.name);
            if self.filter.matches(&sub.name) || self.filter.matches(&full_name) {
                debug!("excluding `{full_name}`");
                continue;
            }
            let module = match self.world.import_module(&full_name) {
                Ok(module) => module,
                Err(err) => {
                    error!("could not import `{full_name}`: {err}");
                    continue;
                }
            };
            let node = self
                .graph
                .get_or_create_vertex(VertexKind::Module, &full_name);
            self.graph
                .get_or_create_edge(EdgeKind::Contains, pkg_vertex, node);
            debug!("({pkg_name})-[:contains]->({full_name})");
            if sub.is_package {
                self.scrape_pkg(module);
            }
            Scraper::new(
                &mut self.world,
                &mut self.graph,
                &self.filter,
                &mut self.seen,
            )
            .scrape_module(module);
        }
    }

    /// The finished graph.
    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// Hand the finished graph to a consumer.
    pub fn into_graph(self) -> GraphStore {
        self.graph
    }
}
