//! Package directory enumeration.
//!
//! The orchestrator asks this capability for the submodules directly under a
//! package's source directory. The listing is non-recursive: `*.py` files
//! are modules, subdirectories with an `__init__.py` are packages. Nested
//! levels are reached by recursing through package expansion, not here.

use std::path::Path;

use ignore::WalkBuilder;
use tracing::debug;

use super::InspectError;

/// A directly contained submodule of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submodule {
    /// Unqualified name (`a` for `a.py`, `sub` for `sub/__init__.py`).
    pub name: String,
    /// True for a subpackage.
    pub is_package: bool,
}

/// The module-discovery capability consumed by package expansion.
pub trait DiscoverModules {
    fn list_submodules(&self, dir: &Path) -> Result<Vec<Submodule>, InspectError>;
}

/// Filesystem-backed discoverer.
#[derive(Debug, Default)]
pub struct FsDiscoverer;

impl DiscoverModules for FsDiscoverer {
    fn list_submodules(&self, dir: &Path) -> Result<Vec<Submodule>, InspectError> {
        if !dir.is_dir() {
            return Err(InspectError::Discover {
                path: dir.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let mut out = Vec::new();
        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .hidden(true)
            .max_depth(Some(1))
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("skipping unreadable entry under {}: {err}", dir.display());
                    continue;
                }
            };
            if entry.depth() != 1 {
                continue;
            }
            let path = entry.path();
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            if is_dir {
                if path.join("__init__.py").is_file() {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        out.push(Submodule {
                            name: name.to_string(),
                            is_package: true,
                        });
                    }
                }
            } else if path.extension().is_some_and(|ext| ext == "py") {
                let stem = path.file_stem().and_then(|s| s.to_str());
                if let Some(stem) = stem {
                    if stem != "__init__" {
                        out.push(Submodule {
                            name: stem.to_string(),
                            is_package: false,
                        });
                    }
                }
            }
        }
        Ok(out)
    }
}
