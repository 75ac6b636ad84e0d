//! The live object model, realized statically.
//!
//! `ModuleWorld` is the in-repo [`Introspect`] provider: a process-scoped
//! arena of objects discovered by parsing Python sources. Importing a module
//! resolves its dotted path against the search roots, parses the file, and
//! caches the result under its fully qualified name, so the same path always
//! yields the same handle. Nothing is ever evicted; handles stay valid for
//! the world's lifetime.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use super::python::{self, ImportStmt};
use super::{InspectError, Introspect, Member, ObjectId, Role};

/// How many re-export hops a class lookup will follow
/// (`from .impl import C` chains in `__init__.py` files).
const REEXPORT_DEPTH: usize = 8;

#[derive(Debug)]
enum Object {
    Module(ModuleObj),
    Class(ClassObj),
    Function(FuncObj),
    Method(FuncObj),
}

#[derive(Debug)]
struct ModuleObj {
    name: String,
    file: PathBuf,
    is_package: bool,
    imports: Vec<ImportStmt>,
    classes: Vec<ObjectId>,
    functions: Vec<ObjectId>,
}

#[derive(Debug)]
struct ClassObj {
    name: String,
    /// Dotted name of the defining module; base names resolve in its scope.
    module: String,
    file: PathBuf,
    bases: Vec<String>,
    methods: Vec<ObjectId>,
    is_abstract: bool,
}

#[derive(Debug)]
struct FuncObj {
    name: String,
    file: PathBuf,
}

/// Arena of loaded objects plus the module cache.
pub struct ModuleWorld {
    roots: Vec<PathBuf>,
    objects: Vec<Object>,
    modules: HashMap<String, ObjectId>,
}

impl ModuleWorld {
    /// A world resolving dotted paths against the given search roots.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            objects: Vec::new(),
            modules: HashMap::new(),
        }
    }

    /// Convenience constructor for a single search root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::new(vec![root.into()])
    }

    /// True if `name` resolves to a module or package file on some root.
    pub fn module_exists(&self, name: &str) -> bool {
        self.resolve_file(name).is_some()
    }

    fn alloc(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.index()]
    }

    fn module_obj(&self, id: ObjectId) -> Option<&ModuleObj> {
        match self.object(id) {
            Object::Module(m) => Some(m),
            _ => None,
        }
    }

    fn class_obj(&self, id: ObjectId) -> Option<&ClassObj> {
        match self.object(id) {
            Object::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Map a dotted path to `(file, is_package)`: a `<path>/__init__.py`
    /// package wins over a `<path>.py` module, first root wins overall.
    fn resolve_file(&self, name: &str) -> Option<(PathBuf, bool)> {
        for root in &self.roots {
            let mut path = root.clone();
            for segment in name.split('.') {
                path.push(segment);
            }
            let init = path.join("__init__.py");
            if init.is_file() {
                return Some((init, true));
            }
            let file = path.with_extension("py");
            if file.is_file() {
                return Some((file, false));
            }
        }
        None
    }

    /// Resolve the base of a relative import. `level` counts leading dots;
    /// one dot means the current package.
    fn resolve_from_base(
        &self,
        module_name: &str,
        is_package: bool,
        level: usize,
        base: Option<&str>,
    ) -> Result<String, InspectError> {
        if level == 0 {
            return base.map(str::to_string).ok_or(InspectError::RelativeEscape {
                module: module_name.to_string(),
            });
        }
        let mut parts: Vec<&str> = module_name.split('.').collect();
        if !is_package {
            parts.pop();
        }
        for _ in 1..level {
            if parts.pop().is_none() {
                return Err(InspectError::RelativeEscape {
                    module: module_name.to_string(),
                });
            }
        }
        let mut resolved = parts.join(".");
        if let Some(base) = base {
            if resolved.is_empty() {
                resolved = base.to_string();
            } else {
                resolved.push('.');
                resolved.push_str(base);
            }
        }
        if resolved.is_empty() {
            return Err(InspectError::RelativeEscape {
                module: module_name.to_string(),
            });
        }
        Ok(resolved)
    }

    /// Clone the facts `members`/`ancestor_chain` need, releasing the arena
    /// borrow before any lazy import happens.
    fn module_facts(&self, obj: ObjectId) -> Option<(String, bool, Vec<ImportStmt>)> {
        self.module_obj(obj)
            .map(|m| (m.name.clone(), m.is_package, m.imports.clone()))
    }

    // ─── Member Listing ─────────────────────────────────────────

    fn module_members(&mut self, obj: ObjectId) -> Vec<Member> {
        let Some((name, is_package, imports)) = self.module_facts(obj) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut bound = HashSet::new();
        for import in imports {
            match import {
                ImportStmt::Import { path, alias } => {
                    // `import a.b` binds `a`; `import a.b as c` binds `c`
                    let (bound_name, target) = match alias {
                        Some(alias) => (alias, path),
                        None => {
                            let top = path.split('.').next().unwrap_or_default().to_string();
                            (top.clone(), top)
                        }
                    };
                    if bound.insert(bound_name.clone()) {
                        let resolved = self.import_module(&target);
                        out.push(Member {
                            name: bound_name,
                            resolved,
                        });
                    }
                }
                ImportStmt::ImportFrom { level, base, names } => {
                    let Ok(target_base) =
                        self.resolve_from_base(&name, is_package, level, base.as_deref())
                    else {
                        continue; // surfaced via function members
                    };
                    for imported in names {
                        let candidate = format!("{}.{}", target_base, imported.name);
                        if !self.module_exists(&candidate) {
                            continue; // not a module binding
                        }
                        let bound_name = imported.bound().to_string();
                        if bound.insert(bound_name.clone()) {
                            let resolved = self.import_module(&candidate);
                            out.push(Member {
                                name: bound_name,
                                resolved,
                            });
                        }
                    }
                }
            }
        }
        out
    }

    fn class_members(&mut self, obj: ObjectId) -> Vec<Member> {
        let Some(m) = self.module_obj(obj) else {
            return Vec::new();
        };
        let local = m.classes.clone();
        let Some((name, is_package, imports)) = self.module_facts(obj) else {
            return Vec::new();
        };

        let mut out: Vec<Member> = local
            .into_iter()
            .map(|id| Member {
                name: self.name_of(id),
                resolved: Ok(id),
            })
            .collect();

        for import in imports {
            let ImportStmt::ImportFrom { level, base, names } = import else {
                continue;
            };
            let Ok(target_base) = self.resolve_from_base(&name, is_package, level, base.as_deref())
            else {
                continue;
            };
            for imported in names {
                let candidate = format!("{}.{}", target_base, imported.name);
                if self.module_exists(&candidate) {
                    continue; // module binding, not a class
                }
                let Ok(base_module) = self.import_module(&target_base) else {
                    continue; // failure surfaced via function members
                };
                if let Some(class_id) = self.find_class(base_module, &imported.name, REEXPORT_DEPTH)
                {
                    out.push(Member {
                        name: imported.bound().to_string(),
                        resolved: Ok(class_id),
                    });
                }
            }
        }
        out
    }

    fn function_members(&mut self, obj: ObjectId) -> Vec<Member> {
        let Some(m) = self.module_obj(obj) else {
            return Vec::new();
        };
        let local = m.functions.clone();
        let Some((name, is_package, imports)) = self.module_facts(obj) else {
            return Vec::new();
        };

        let mut out: Vec<Member> = local
            .into_iter()
            .map(|id| Member {
                name: self.name_of(id),
                resolved: Ok(id),
            })
            .collect();

        for import in imports {
            let ImportStmt::ImportFrom { level, base, names } = import else {
                continue;
            };
            let target_base =
                match self.resolve_from_base(&name, is_package, level, base.as_deref()) {
                    Ok(base) => base,
                    Err(_) => {
                        // every name of an unresolvable `from` clause is a
                        // failed member; this role is queried on both scrape
                        // paths, so the failure is reported exactly here
                        for imported in names {
                            out.push(Member {
                                name: imported.bound().to_string(),
                                resolved: Err(InspectError::RelativeEscape {
                                    module: name.clone(),
                                }),
                            });
                        }
                        continue;
                    }
                };
            for imported in names {
                let candidate = format!("{}.{}", target_base, imported.name);
                if self.module_exists(&candidate) {
                    continue;
                }
                match self.import_module(&target_base) {
                    Ok(base_module) => {
                        if let Some(func_id) = self.find_function(base_module, &imported.name) {
                            out.push(Member {
                                name: imported.bound().to_string(),
                                resolved: Ok(func_id),
                            });
                        }
                    }
                    Err(err) => {
                        out.push(Member {
                            name: imported.bound().to_string(),
                            resolved: Err(err),
                        });
                    }
                }
            }
        }
        out
    }

    fn method_members(&mut self, obj: ObjectId) -> Vec<Member> {
        let Some(c) = self.class_obj(obj) else {
            return Vec::new();
        };
        c.methods
            .clone()
            .into_iter()
            .map(|id| Member {
                name: self.name_of(id),
                resolved: Ok(id),
            })
            .collect()
    }

    // ─── Class Resolution ───────────────────────────────────────

    /// A class named `name` in `module`, following re-export chains up to
    /// `depth` hops.
    fn find_class(&mut self, module: ObjectId, name: &str, depth: usize) -> Option<ObjectId> {
        let m = self.module_obj(module)?;
        for &class_id in &m.classes {
            if self.class_obj(class_id).is_some_and(|c| c.name == name) {
                return Some(class_id);
            }
        }
        if depth == 0 {
            return None;
        }
        let (module_name, is_package, imports) = self.module_facts(module)?;
        for import in imports {
            let ImportStmt::ImportFrom { level, base, names } = import else {
                continue;
            };
            let Ok(target_base) =
                self.resolve_from_base(&module_name, is_package, level, base.as_deref())
            else {
                continue;
            };
            for imported in names {
                if imported.bound() != name {
                    continue;
                }
                if let Ok(next) = self.import_module(&target_base) {
                    if let Some(found) = self.find_class(next, &imported.name, depth - 1) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    fn find_function(&mut self, module: ObjectId, name: &str) -> Option<ObjectId> {
        let m = self.module_obj(module)?;
        for &func_id in &m.functions {
            if let Object::Function(f) = self.object(func_id) {
                if f.name == name {
                    return Some(func_id);
                }
            }
        }
        None
    }

    /// Resolve a dotted module reference (`mixins`, `a.b`) through the
    /// import bindings of `module` to a dotted path.
    fn resolve_module_ref(&mut self, module: ObjectId, dotted: &str) -> Option<String> {
        let (module_name, is_package, imports) = self.module_facts(module)?;
        let (first, rest) = match dotted.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (dotted, None),
        };
        let join = |path: &str| match rest {
            Some(rest) => format!("{path}.{rest}"),
            None => path.to_string(),
        };
        for import in imports {
            match import {
                ImportStmt::Import { path, alias } => match alias {
                    Some(alias) if alias == first => return Some(join(&path)),
                    Some(_) => {}
                    None => {
                        let top = path.split('.').next().unwrap_or_default();
                        if top == first {
                            return Some(join(top));
                        }
                    }
                },
                ImportStmt::ImportFrom { level, base, names } => {
                    for imported in &names {
                        if imported.bound() != first {
                            continue;
                        }
                        let Ok(target_base) = self.resolve_from_base(
                            &module_name,
                            is_package,
                            level,
                            base.as_deref(),
                        ) else {
                            continue;
                        };
                        let candidate = format!("{}.{}", target_base, imported.name);
                        if self.module_exists(&candidate) {
                            return Some(join(&candidate));
                        }
                    }
                }
            }
        }
        None
    }

    /// Resolve one base expression in the scope of the defining module.
    fn resolve_base(&mut self, defining_module: &str, base: &str) -> Option<ObjectId> {
        let module_id = self.modules.get(defining_module).copied()?;
        if let Some((prefix, last)) = base.rsplit_once('.') {
            let target_name = self.resolve_module_ref(module_id, prefix)?;
            let target = self.import_module(&target_name).ok()?;
            return self.find_class(target, last, REEXPORT_DEPTH);
        }
        self.find_class(module_id, base, REEXPORT_DEPTH)
    }

    /// Direct bases of a class, resolved to handles. Unresolvable bases
    /// (builtins, stdlib, anything off the search roots) drop out silently.
    fn resolved_bases(&mut self, class_id: ObjectId) -> Vec<ObjectId> {
        let Some(c) = self.class_obj(class_id) else {
            return Vec::new();
        };
        let bases = c.bases.clone();
        let defining_module = c.module.clone();
        bases
            .iter()
            .filter_map(|base| {
                let resolved = self.resolve_base(&defining_module, base);
                if resolved.is_none() {
                    debug!("no resolvable ancestor for base `{base}` of `{defining_module}`");
                }
                resolved
            })
            .collect()
    }

    fn walk_bases(
        &mut self,
        class_id: ObjectId,
        chain: &mut Vec<ObjectId>,
        seen: &mut HashSet<ObjectId>,
    ) {
        for base in self.resolved_bases(class_id) {
            if seen.insert(base) {
                chain.push(base);
                self.walk_bases(base, chain, seen);
            }
        }
    }
}

impl Introspect for ModuleWorld {
    fn classify(&self, obj: ObjectId) -> Role {
        match self.object(obj) {
            Object::Module(_) => Role::Module,
            Object::Class(_) => Role::Class,
            Object::Function(_) => Role::Function,
            Object::Method(_) => Role::Method,
        }
    }

    fn name_of(&self, obj: ObjectId) -> String {
        match self.object(obj) {
            Object::Module(m) => m.name.clone(),
            Object::Class(c) => c.name.clone(),
            Object::Function(f) | Object::Method(f) => f.name.clone(),
        }
    }

    fn source_of(&self, obj: ObjectId) -> Option<PathBuf> {
        match self.object(obj) {
            Object::Module(m) => Some(m.file.clone()),
            Object::Class(c) => Some(c.file.clone()),
            Object::Function(f) | Object::Method(f) => Some(f.file.clone()),
        }
    }

    fn members(&mut self, obj: ObjectId, role: Role) -> Vec<Member> {
        match role {
            Role::Module => self.module_members(obj),
            Role::Class => self.class_members(obj),
            Role::Function => self.function_members(obj),
            Role::Method => self.method_members(obj),
        }
    }

    fn ancestor_chain(&mut self, obj: ObjectId) -> Vec<ObjectId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([obj]);
        self.walk_bases(obj, &mut chain, &mut seen);
        chain
    }

    fn is_abstract(&self, obj: ObjectId) -> bool {
        self.class_obj(obj).is_some_and(|c| c.is_abstract)
    }

    fn import_module(&mut self, name: &str) -> Result<ObjectId, InspectError> {
        if let Some(&id) = self.modules.get(name) {
            return Ok(id);
        }
        let (file, is_package) = self
            .resolve_file(name)
            .ok_or_else(|| InspectError::ModuleNotFound(name.to_string()))?;
        let source = fs::read_to_string(&file).map_err(|source| InspectError::Read {
            path: file.clone(),
            source,
        })?;
        let syntax =
            python::parse_module(&source).ok_or_else(|| InspectError::Parse(file.clone()))?;
        debug!("imported `{}` from {}", name, file.display());

        let mut classes = Vec::with_capacity(syntax.classes.len());
        for class in &syntax.classes {
            let methods = class
                .methods
                .iter()
                .map(|method| {
                    self.alloc(Object::Method(FuncObj {
                        name: method.clone(),
                        file: file.clone(),
                    }))
                })
                .collect();
            classes.push(self.alloc(Object::Class(ClassObj {
                name: class.name.clone(),
                module: name.to_string(),
                file: file.clone(),
                bases: class.bases.clone(),
                methods,
                is_abstract: class.is_abstract,
            })));
        }
        let functions = syntax
            .functions
            .iter()
            .map(|func| {
                self.alloc(Object::Function(FuncObj {
                    name: func.clone(),
                    file: file.clone(),
                }))
            })
            .collect();

        let id = self.alloc(Object::Module(ModuleObj {
            name: name.to_string(),
            file,
            is_package,
            imports: syntax.imports,
            classes,
            functions,
        }));
        self.modules.insert(name.to_string(), id);
        Ok(id)
    }

    fn is_package(&self, obj: ObjectId) -> bool {
        self.module_obj(obj).is_some_and(|m| m.is_package)
    }

    fn package_dir(&self, obj: ObjectId) -> Option<PathBuf> {
        let m = self.module_obj(obj)?;
        if !m.is_package {
            return None;
        }
        m.file.parent().map(|p| p.to_path_buf())
    }
}
