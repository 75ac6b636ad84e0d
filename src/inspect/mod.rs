//! Introspection capability: the traversal's window onto the live object
//! model.
//!
//! The engine never touches Python source itself; it talks to the
//! [`Introspect`] trait: classify an object, list its members by role,
//! resolve its source file, walk its ancestor chain. The in-repo provider is
//! [`ModuleWorld`], which realizes the capability by static analysis: every
//! discovered object gets a stable [`ObjectId`] handle on first sight, and
//! "importing" a module parses its file into the arena.

pub mod discover;
pub mod python;
pub mod world;

use std::path::PathBuf;

use thiserror::Error;

pub use discover::{DiscoverModules, FsDiscoverer, Submodule};
pub use world::ModuleWorld;

/// Stable handle of a discovered live object, assigned on first sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) u32);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The role an object plays in its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Module,
    Class,
    Function,
    Method,
}

/// A named member of an object. Resolution happens per member: a failed
/// import travels up as a value so the caller can log it and continue with
/// the member's siblings.
#[derive(Debug)]
pub struct Member {
    /// The name the member is bound to in its container.
    pub name: String,
    /// The resolved object, or why resolving it failed.
    pub resolved: Result<ObjectId, InspectError>,
}

/// Failures while resolving or loading an object. Expected during a scan;
/// always handled at member granularity, never fatal to the traversal.
#[derive(Debug, Error)]
pub enum InspectError {
    /// No search root contains a file for this dotted path.
    #[error("module `{0}` not found on any search root")]
    ModuleNotFound(String),

    /// The module file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The parser could not produce a tree for the file.
    #[error("failed to parse {0}")]
    Parse(PathBuf),

    /// A relative import reaches above the top-level package.
    #[error("relative import in `{module}` escapes the package root")]
    RelativeEscape { module: String },

    /// Enumerating a package directory failed.
    #[error("failed to list {path}: {message}")]
    Discover { path: PathBuf, message: String },
}

/// The introspection capability consumed by the traversal engine.
pub trait Introspect {
    /// What kind of object this handle refers to.
    fn classify(&self, obj: ObjectId) -> Role;

    /// Fully qualified dotted path for modules; simple name otherwise.
    fn name_of(&self, obj: ObjectId) -> String;

    /// The object's originating source file. `None` is an expected outcome
    /// (an object with no resolvable source), not an error.
    fn source_of(&self, obj: ObjectId) -> Option<PathBuf>;

    /// Ordered members of `obj` playing `role`. Resolution failures are
    /// carried per member.
    fn members(&mut self, obj: ObjectId, role: Role) -> Vec<Member>;

    /// Linearized ancestor chain of a class: most-derived first, the class
    /// itself excluded, deduplicated. Unresolvable ancestors are dropped.
    fn ancestor_chain(&mut self, obj: ObjectId) -> Vec<ObjectId>;

    /// Extra vertex property: whether a class is marked abstract.
    fn is_abstract(&self, _obj: ObjectId) -> bool {
        false
    }

    /// Load a module by dotted path. May have already happened; the same
    /// path always yields the same handle.
    fn import_module(&mut self, name: &str) -> Result<ObjectId, InspectError>;

    /// True if the module is a package (directory with an init file).
    fn is_package(&self, obj: ObjectId) -> bool;

    /// The directory to enumerate for a package's submodules.
    fn package_dir(&self, obj: ObjectId) -> Option<PathBuf>;
}
