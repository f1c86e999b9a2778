//! Persisted document state.
//!
//! Every pass serializes the whole tree to two sinks with identical
//! content: the canonical document path and a working copy. There is no
//! atomic rename or rollback; a pass either completes or aborts.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::tree::{xml, Tree};

/// Canonical + working path pair for a document under classification.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
    working_path: PathBuf,
}

impl DocumentStore {
    /// Create a store for `path`, with the working copy at `<path>.tmp`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut working = OsString::from(path.as_os_str());
        working.push(".tmp");
        Self {
            path,
            working_path: PathBuf::from(working),
        }
    }

    /// Create a store with an explicit working path.
    pub fn with_working_path(path: impl Into<PathBuf>, working_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            working_path: working_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn working_path(&self) -> &Path {
        &self.working_path
    }

    /// Load a fresh tree from the canonical path.
    pub fn load(&self) -> Result<Tree> {
        xml::parse_file(&self.path)
    }

    /// Serialize the tree and write identical content to both paths.
    pub fn persist(&self, tree: &Tree) -> Result<()> {
        let serialized = xml::to_xml_string(tree)?;
        fs::write(&self.path, &serialized)?;
        fs::write(&self.working_path, &serialized)?;
        Ok(())
    }
}
