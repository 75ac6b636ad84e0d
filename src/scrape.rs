//! The recursive walker at the heart of the scan.
//!
//! Drives the introspection capability over a module tree, classifying each
//! member and upserting the matching vertices and edges before recursing
//! into member modules. Cyclic and diamond-shaped import graphs terminate
//! through the visited set; a failed member never takes its siblings down
//! with it.

use std::collections::HashSet;

use tracing::{debug, error, info};

use crate::filter::ExclusionFilter;
use crate::graph::{EdgeKind, GraphStore, VertexId, VertexKind};
use crate::inspect::{InspectError, Introspect, ObjectId, Role};

/// Identity pairs `(live object, parent vertex)` already expanded. Entries
/// are added once and never removed; the set lives for one whole scan. The
/// same module reached under a *different* parent is expanded again, since
/// imports are context-dependent.
pub type VisitedSet = HashSet<(ObjectId, VertexId)>;

/// The traversal engine. Borrows all its state from the orchestrator; one
/// scan drives exactly one scraper at a time.
pub struct Scraper<'a, I: Introspect> {
    world: &'a mut I,
    graph: &'a mut GraphStore,
    filter: &'a ExclusionFilter,
    seen: &'a mut VisitedSet,
}

impl<'a, I: Introspect> Scraper<'a, I> {
    pub fn new(
        world: &'a mut I,
        graph: &'a mut GraphStore,
        filter: &'a ExclusionFilter,
        seen: &'a mut VisitedSet,
    ) -> Self {
        Self {
            world,
            graph,
            filter,
            seen,
        }
    }

    /// Upsert the vertex for a module and scrape it: file, member modules,
    /// and functions. Returns the module's vertex.
    pub fn scrape_module(&mut self, obj: ObjectId) -> VertexId {
        let name = self.world.name_of(obj);
        info!("scraping `{name}`");
        let parent = self.graph.get_or_create_vertex(VertexKind::Module, &name);
        self.map_filename(obj, parent);
        self.map_modules(obj, parent);
        self.map_functions(obj, parent);
        parent
    }

    /// Resolve `obj`'s originating source file and record it. An object
    /// with no resolvable source is an expected outcome, not an error.
    pub fn map_filename(&mut self, obj: ObjectId, parent: VertexId) {
        let Some(path) = self.world.source_of(obj) else {
            debug!("no source file for `{}`", self.world.name_of(obj));
            return;
        };
        let name = path.to_string_lossy();
        let node = self.graph.get_or_create_vertex(VertexKind::File, &name);
        self.graph.get_or_create_edge(EdgeKind::FoundIn, parent, node);
        debug!("({})-[:found-in]->({})", self.vertex_name(parent), name);
    }

    /// Map every function member of `obj` under `parent`.
    pub fn map_functions(&mut self, obj: ObjectId, parent: VertexId) {
        for member in self.world.members(obj, Role::Function) {
            let func = match member.resolved {
                Ok(func) => func,
                Err(err) => {
                    log_member_failure(&member.name, &err);
                    continue;
                }
            };
            let node = self
                .graph
                .get_or_create_vertex(VertexKind::Function, &member.name);
            self.graph
                .get_or_create_edge(EdgeKind::HasFunction, parent, node);
            self.map_filename(func, node);
            debug!(
                "({})-[:has-function]->({})",
                self.vertex_name(parent),
                member.name
            );
        }
    }

    /// Map every method member of `obj` under `parent`.
    pub fn map_methods(&mut self, obj: ObjectId, parent: VertexId) {
        for member in self.world.members(obj, Role::Method) {
            if let Err(err) = member.resolved {
                log_member_failure(&member.name, &err);
                continue;
            }
            let node = self
                .graph
                .get_or_create_vertex(VertexKind::Method, &member.name);
            self.graph
                .get_or_create_edge(EdgeKind::HasMethod, parent, node);
            debug!(
                "({})-[:has-method]->({})",
                self.vertex_name(parent),
                member.name
            );
        }
    }

    /// Map every class member of `obj` under `parent`, then walk each
    /// class's linearized ancestor chain, emitting one `subclasses` edge per
    /// consecutive pair: a straight-line path, not a star.
    pub fn map_classes(&mut self, obj: ObjectId, parent: VertexId) {
        for member in self.world.members(obj, Role::Class) {
            let class = match member.resolved {
                Ok(class) => class,
                Err(err) => {
                    log_member_failure(&member.name, &err);
                    continue;
                }
            };
            let node = self.upsert_class(class, &member.name);
            self.graph
                .get_or_create_edge(EdgeKind::HasClass, parent, node);
            debug!(
                "({})-[:has-class]->({})",
                self.vertex_name(parent),
                member.name
            );
            self.map_filename(class, node);
            self.map_methods(class, node);

            let mut from = node;
            for ancestor in self.world.ancestor_chain(class) {
                let ancestor_name = self.world.name_of(ancestor);
                let ancestor_node = self.upsert_class(ancestor, &ancestor_name);
                self.graph
                    .get_or_create_edge(EdgeKind::Subclasses, from, ancestor_node);
                debug!(
                    "({})-[:subclasses]->({})",
                    self.vertex_name(from),
                    ancestor_name
                );
                self.map_filename(ancestor, ancestor_node);
                self.map_methods(ancestor, ancestor_node);
                from = ancestor_node;
            }
        }
    }

    /// Map every module member of `obj` under `parent` and recurse into
    /// each. The exclusion filter is consulted before anything is created;
    /// the visited set stops re-expansion of the same module under the same
    /// parent.
    pub fn map_modules(&mut self, obj: ObjectId, parent: VertexId) {
        for member in self.world.members(obj, Role::Module) {
            if self.filter.matches(&member.name) {
                debug!("excluding `{}`", member.name);
                continue;
            }
            let module = match member.resolved {
                Ok(module) => module,
                Err(err) => {
                    log_member_failure(&member.name, &err);
                    continue;
                }
            };
            let key = (module, parent);
            if self.seen.contains(&key) {
                continue;
            }
            self.seen.insert(key);

            let name = self.world.name_of(module);
            let node = self.graph.get_or_create_vertex(VertexKind::Module, &name);
            self.graph.get_or_create_edge(EdgeKind::Imports, parent, node);
            debug!("({})-[:imports]->({})", self.vertex_name(parent), name);
            self.map_filename(module, node);
            self.map_classes(module, node);
            self.map_functions(module, node);
            self.map_modules(module, node);
        }
    }

    fn upsert_class(&mut self, obj: ObjectId, name: &str) -> VertexId {
        let is_abstract = self.world.is_abstract(obj);
        self.graph
            .get_or_create_vertex_with(VertexKind::Class, name, is_abstract)
    }

    fn vertex_name(&self, id: VertexId) -> &str {
        &self.graph.vertex(id).name
    }
}

/// A member that failed to resolve is logged and skipped; its siblings
/// continue. Absence from the search roots is the everyday case (stdlib,
/// third-party) and stays at debug; anything else is a real error.
fn log_member_failure(name: &str, err: &InspectError) {
    match err {
        InspectError::ModuleNotFound(_) => debug!("could not import `{name}`: {err}"),
        _ => error!("could not process `{name}`: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::Member;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Hand-built object table standing in for a live runtime.
    #[derive(Default)]
    struct MockWorld {
        names: Vec<String>,
        roles: Vec<Role>,
        sources: Vec<Option<PathBuf>>,
        members: HashMap<(u32, &'static str), Vec<(String, Option<ObjectId>)>>,
        ancestors: HashMap<u32, Vec<ObjectId>>,
    }

    fn role_key(role: Role) -> &'static str {
        match role {
            Role::Module => "module",
            Role::Class => "class",
            Role::Function => "function",
            Role::Method => "method",
        }
    }

    impl MockWorld {
        fn add(&mut self, role: Role, name: &str) -> ObjectId {
            let id = ObjectId(self.names.len() as u32);
            self.names.push(name.to_string());
            self.roles.push(role);
            self.sources.push(None);
            id
        }

        fn add_with_source(&mut self, role: Role, name: &str, source: &str) -> ObjectId {
            let id = self.add(role, name);
            self.sources[id.index()] = Some(PathBuf::from(source));
            id
        }

        fn member(&mut self, owner: ObjectId, role: Role, name: &str, target: Option<ObjectId>) {
            self.members
                .entry((owner.0, role_key(role)))
                .or_default()
                .push((name.to_string(), target));
        }

        fn set_ancestors(&mut self, class: ObjectId, chain: Vec<ObjectId>) {
            self.ancestors.insert(class.0, chain);
        }
    }

    impl Introspect for MockWorld {
        fn classify(&self, obj: ObjectId) -> Role {
            self.roles[obj.index()]
        }

        fn name_of(&self, obj: ObjectId) -> String {
            self.names[obj.index()].clone()
        }

        fn source_of(&self, obj: ObjectId) -> Option<PathBuf> {
            self.sources[obj.index()].clone()
        }

        fn members(&mut self, obj: ObjectId, role: Role) -> Vec<Member> {
            self.members
                .get(&(obj.0, role_key(role)))
                .map(|list| {
                    list.iter()
                        .map(|(name, target)| Member {
                            name: name.clone(),
                            resolved: target
                                .ok_or_else(|| InspectError::ModuleNotFound(name.clone())),
                        })
                        .collect()
                })
                .unwrap_or_default()
        }

        fn ancestor_chain(&mut self, obj: ObjectId) -> Vec<ObjectId> {
            self.ancestors.get(&obj.0).cloned().unwrap_or_default()
        }

        fn import_module(&mut self, name: &str) -> Result<ObjectId, InspectError> {
            Err(InspectError::ModuleNotFound(name.to_string()))
        }

        fn is_package(&self, _obj: ObjectId) -> bool {
            false
        }

        fn package_dir(&self, _obj: ObjectId) -> Option<PathBuf> {
            None
        }
    }

    fn scrape(world: &mut MockWorld, root: ObjectId) -> GraphStore {
        let mut graph = GraphStore::new();
        let filter = ExclusionFilter::new();
        let mut seen = VisitedSet::new();
        Scraper::new(world, &mut graph, &filter, &mut seen).scrape_module(root);
        graph
    }

    fn edge_names(
        graph: &GraphStore,
        kind: EdgeKind,
    ) -> Vec<(String, String)> {
        graph
            .edges_of(kind)
            .map(|(_, from, to)| {
                (
                    graph.vertex(from).name.clone(),
                    graph.vertex(to).name.clone(),
                )
            })
            .collect()
    }

    #[test]
    fn self_import_terminates_with_one_vertex() {
        let mut world = MockWorld::default();
        let a = world.add(Role::Module, "a");
        world.member(a, Role::Module, "a", Some(a));

        let graph = scrape(&mut world, a);
        assert_eq!(graph.vertices_of(VertexKind::Module).count(), 1);
        assert_eq!(
            edge_names(&graph, EdgeKind::Imports),
            vec![("a".to_string(), "a".to_string())]
        );
    }

    #[test]
    fn mutual_imports_terminate() {
        let mut world = MockWorld::default();
        let a = world.add(Role::Module, "a");
        let b = world.add(Role::Module, "b");
        world.member(a, Role::Module, "b", Some(b));
        world.member(b, Role::Module, "a", Some(a));

        let graph = scrape(&mut world, a);
        assert_eq!(graph.vertices_of(VertexKind::Module).count(), 2);
        let imports = edge_names(&graph, EdgeKind::Imports);
        assert!(imports.contains(&("a".to_string(), "b".to_string())));
        assert!(imports.contains(&("b".to_string(), "a".to_string())));
    }

    #[test]
    fn failed_member_does_not_stop_siblings() {
        let mut world = MockWorld::default();
        let m = world.add(Role::Module, "m");
        let first = world.add(Role::Function, "first");
        let third = world.add(Role::Function, "third");
        world.member(m, Role::Function, "first", Some(first));
        world.member(m, Role::Function, "broken", None);
        world.member(m, Role::Function, "third", Some(third));

        let graph = scrape(&mut world, m);
        let functions: Vec<_> = graph
            .vertices_of(VertexKind::Function)
            .map(|(_, v)| v.name.clone())
            .collect();
        assert_eq!(functions, vec!["first", "third"]);
    }

    #[test]
    fn ancestor_chain_is_a_path_not_a_star() {
        let mut world = MockWorld::default();
        let m = world.add(Role::Module, "m");
        let inner = world.add(Role::Module, "m.inner");
        let c = world.add(Role::Class, "C");
        let b = world.add(Role::Class, "B");
        let a = world.add(Role::Class, "A");
        world.member(m, Role::Module, "inner", Some(inner));
        world.member(inner, Role::Class, "C", Some(c));
        world.set_ancestors(c, vec![b, a]);

        let graph = scrape(&mut world, m);
        let subclasses = edge_names(&graph, EdgeKind::Subclasses);
        assert!(subclasses.contains(&("C".to_string(), "B".to_string())));
        assert!(subclasses.contains(&("B".to_string(), "A".to_string())));
        assert!(!subclasses.contains(&("C".to_string(), "A".to_string())));
    }

    #[test]
    fn ancestors_get_method_and_file_mapping() {
        let mut world = MockWorld::default();
        let m = world.add(Role::Module, "m");
        let inner = world.add(Role::Module, "m.inner");
        let c = world.add(Role::Class, "C");
        let base = world.add_with_source(Role::Class, "Base", "/src/base.py");
        let run = world.add(Role::Method, "run");
        world.member(m, Role::Module, "inner", Some(inner));
        world.member(inner, Role::Class, "C", Some(c));
        world.set_ancestors(c, vec![base]);
        world.member(base, Role::Method, "run", Some(run));

        let graph = scrape(&mut world, m);
        assert!(edge_names(&graph, EdgeKind::HasMethod)
            .contains(&("Base".to_string(), "run".to_string())));
        assert!(edge_names(&graph, EdgeKind::FoundIn)
            .contains(&("Base".to_string(), "/src/base.py".to_string())));
    }

    #[test]
    fn excluded_module_leaves_no_trace() {
        let mut world = MockWorld::default();
        let m = world.add(Role::Module, "m");
        let secret = world.add(Role::Module, "secret_mod");
        let open = world.add(Role::Module, "open_mod");
        let hidden_fn = world.add(Role::Function, "hidden");
        world.member(m, Role::Module, "secret_mod", Some(secret));
        world.member(m, Role::Module, "open_mod", Some(open));
        world.member(secret, Role::Function, "hidden", Some(hidden_fn));

        let mut graph = GraphStore::new();
        let filter = ExclusionFilter::from_patterns(["^secret"]).unwrap();
        let mut seen = VisitedSet::new();
        Scraper::new(&mut world, &mut graph, &filter, &mut seen).scrape_module(m);

        assert!(graph.find_vertex(VertexKind::Module, "secret_mod").is_none());
        assert!(graph.find_vertex(VertexKind::Function, "hidden").is_none());
        assert!(graph.find_vertex(VertexKind::Module, "open_mod").is_some());
    }

    #[test]
    fn same_module_under_different_parents_is_expanded_twice() {
        let mut world = MockWorld::default();
        let root = world.add(Role::Module, "root");
        let left = world.add(Role::Module, "left");
        let right = world.add(Role::Module, "right");
        let shared = world.add(Role::Module, "shared");
        let util = world.add(Role::Function, "util");
        world.member(root, Role::Module, "left", Some(left));
        world.member(root, Role::Module, "right", Some(right));
        world.member(left, Role::Module, "shared", Some(shared));
        world.member(right, Role::Module, "shared", Some(shared));
        world.member(shared, Role::Function, "util", Some(util));

        let graph = scrape(&mut world, root);
        // one vertex, two imports edges into it
        assert_eq!(graph.vertices_of(VertexKind::Module).count(), 4);
        let imports = edge_names(&graph, EdgeKind::Imports);
        assert!(imports.contains(&("left".to_string(), "shared".to_string())));
        assert!(imports.contains(&("right".to_string(), "shared".to_string())));
        assert_eq!(graph.vertices_of(VertexKind::Function).count(), 1);
    }

    #[test]
    fn missing_source_is_skipped_silently() {
        let mut world = MockWorld::default();
        let m = world.add(Role::Module, "m");

        let graph = scrape(&mut world, m);
        assert_eq!(graph.vertices_of(VertexKind::File).count(), 0);

        let mut world = MockWorld::default();
        let m = world.add_with_source(Role::Module, "m", "/src/m.py");
        let graph = scrape(&mut world, m);
        assert_eq!(graph.vertices_of(VertexKind::File).count(), 1);
        assert!(edge_names(&graph, EdgeKind::FoundIn)
            .contains(&("m".to_string(), "/src/m.py".to_string())));
    }
}
