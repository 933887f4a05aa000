//! File tree abstraction for the ownership crawl.
//!
//! A [`TreeNode`] knows its own name, whether it is a directory, and how
//! to list its children. Children are discovered lazily on first request
//! and cached on the node, so repeated listings return the same set.
//! Names in the caller's [`IgnoreList`] are never returned as children,
//! at any depth.

pub mod walker;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::OwnershipError;

/// Join a base path and a child name into a `/`-separated relative path.
///
/// An empty base yields the name alone; an empty name yields the base.
pub fn build_path(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    if base.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{name}")
    }
}

/// Literal name segments excluded at every tree level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    names: Vec<String>,
}

impl IgnoreList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        for name in names {
            let name = name.into();
            if !list.names.contains(&name) {
                list.names.push(name);
            }
        }
        list
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// A node in a browsable file tree.
pub trait TreeNode {
    /// Name of this node (a single path segment; empty for an anonymous root).
    fn name(&self) -> &str;

    fn is_dir(&self) -> bool;

    /// Children of this node, minus anything in `ignore`.
    fn children(&self, ignore: &IgnoreList) -> Vec<&dyn TreeNode>;
}

/// A node backed by a directory entry on disk.
#[derive(Debug)]
pub struct FsNode {
    name: String,
    path: PathBuf,
    is_dir: bool,
    children: OnceLock<Vec<FsNode>>,
}

impl FsNode {
    /// Anonymous root over `path`, so visited paths are relative to it.
    pub fn root(path: &Path) -> Result<Self, OwnershipError> {
        let meta = fs::metadata(path).map_err(|_| OwnershipError::RootNotFound(path.into()))?;
        Ok(Self::new(String::new(), path.to_path_buf(), meta.is_dir()))
    }

    fn new(name: String, path: PathBuf, is_dir: bool) -> Self {
        Self {
            name,
            path,
            is_dir,
            children: OnceLock::new(),
        }
    }

    fn discover(&self) -> Vec<FsNode> {
        if !self.is_dir {
            return Vec::new();
        }
        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("cannot list {}: {err}", self.path.display());
                return Vec::new();
            }
        };

        let mut nodes: Vec<FsNode> = entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        log::warn!("cannot read entry in {}: {err}", self.path.display());
                        return None;
                    }
                };
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    log::warn!("skipping non UTF-8 name: {}", entry.path().display());
                    return None;
                };
                // Symlinks are not followed.
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                Some(FsNode::new(name, entry.path(), is_dir))
            })
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        nodes
    }
}

impl TreeNode for FsNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }

    fn children(&self, ignore: &IgnoreList) -> Vec<&dyn TreeNode> {
        self.children
            .get_or_init(|| self.discover())
            .iter()
            .filter(|c| !ignore.is_ignored(&c.name))
            .map(|c| c as &dyn TreeNode)
            .collect()
    }
}

/// In-memory tree used as a test double.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct MemNode {
    name: String,
    is_dir: bool,
    children: Vec<MemNode>,
}

#[cfg(test)]
impl MemNode {
    pub fn file(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_dir: false,
            children: Vec::new(),
        }
    }

    pub fn dir(name: &str, children: Vec<MemNode>) -> Self {
        Self {
            name: name.to_string(),
            is_dir: true,
            children,
        }
    }
}

#[cfg(test)]
impl TreeNode for MemNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }

    fn children(&self, ignore: &IgnoreList) -> Vec<&dyn TreeNode> {
        self.children
            .iter()
            .filter(|c| !ignore.is_ignored(&c.name))
            .map(|c| c as &dyn TreeNode)
            .collect()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
