use std::path::{Path, PathBuf};

use git2::{BlameOptions, Repository};
use parking_lot::Mutex;

use crate::analyzer::{BlameSource, Editors};
use crate::error::OwnershipError;

/// [`BlameSource`] over a git working copy, blaming files at HEAD.
///
/// `git2::Repository` handles cannot be shared between threads, so each
/// concurrent call borrows its own handle from a small pool and returns it
/// afterwards. The pool grows to the number of simultaneous callers.
pub struct GitBlameSource {
    root: PathBuf,
    handles: Mutex<Vec<Repository>>,
}

impl GitBlameSource {
    /// Open the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self, OwnershipError> {
        let repo = Repository::discover(path)?;
        let root = repo
            .workdir()
            .ok_or_else(|| OwnershipError::Config("bare repositories are not supported".into()))?
            .to_path_buf();
        Ok(Self {
            root,
            handles: Mutex::new(vec![repo]),
        })
    }

    /// Working directory root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `/`-separated location of `path` relative to the working directory
    /// root; empty for the root itself.
    pub fn relative_prefix(&self, path: &Path) -> Result<String, OwnershipError> {
        let root = self.root.canonicalize()?;
        let target = path
            .canonicalize()
            .map_err(|_| OwnershipError::RootNotFound(path.to_path_buf()))?;
        let rel = target.strip_prefix(&root).map_err(|_| {
            OwnershipError::Config(format!(
                "{} is outside the repository at {}",
                path.display(),
                self.root.display()
            ))
        })?;
        let segments: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(segments.join("/"))
    }

    fn checkout(&self) -> Result<Repository, git2::Error> {
        if let Some(repo) = self.handles.lock().pop() {
            return Ok(repo);
        }
        log::debug!("opening extra repository handle");
        Repository::open(&self.root)
    }

    fn release(&self, repo: Repository) {
        self.handles.lock().push(repo);
    }
}

/// Blame `rel_path` at HEAD and count lines per author e-mail
/// (author name when the e-mail is missing).
fn blame_lines(repo: &Repository, rel_path: &Path) -> Result<Editors, git2::Error> {
    let mut opts = BlameOptions::new();
    let blame = repo.blame_file(rel_path, Some(&mut opts))?;

    let mut editors = Editors::new();
    for hunk in blame.iter() {
        let sig = hunk.final_signature();
        let author = sig
            .email()
            .filter(|e| !e.is_empty())
            .or_else(|| sig.name())
            .unwrap_or("unknown")
            .to_string();
        *editors.entry(author).or_default() += hunk.lines_in_hunk();
    }
    Ok(editors)
}

impl BlameSource for GitBlameSource {
    fn editors_by_file(&self, path: &str) -> Result<Editors, String> {
        let repo = self.checkout().map_err(|e| e.message().to_string())?;
        let result = blame_lines(&repo, Path::new(path));
        self.release(repo);
        result.map_err(|e| e.message().to_string())
    }
}

#[cfg(test)]
pub mod fixture;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
