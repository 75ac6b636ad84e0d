//! Configuration file support.
//!
//! A scan can pick up exclusion patterns from an `orbweb.toml` inside the
//! scanned directory, next to a scanned file, or anywhere via `--config`:
//!
//! ```toml
//! exclude = ["^_", "tests?$"]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{OrbwebError, Result};

/// Default config file name looked up next to the scan root.
pub const CONFIG_FILE: &str = "orbweb.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Exclusion patterns applied before descending into any module.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Config {
    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| OrbwebError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| OrbwebError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `orbweb.toml` from `dir` if present.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            Ok(Some(Self::load(&candidate)?))
        } else {
            Ok(None)
        }
    }
}
