use std::collections::BTreeMap;

use parking_lot::Mutex;

use super::{EditorStorage, Editors};

/// What is known about one file after analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEditors {
    /// Line counts per author; absent when blame failed.
    pub editors: Option<Editors>,
    /// Blame failure message; empty on success.
    pub error: String,
}

/// Thread-safe map from file path to its [`FileEditors`].
#[derive(Debug, Default)]
pub struct EditorsStore {
    files: Mutex<BTreeMap<String, FileEditors>>,
}

impl EditorsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `path`, or `None` when the path was never stored.
    pub fn file_editors(&self, path: &str) -> Option<FileEditors> {
        self.files.lock().get(path).cloned()
    }

    /// Stored paths in lexical order.
    pub fn all_files(&self) -> Vec<String> {
        self.files.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }

    /// Number of entries that carry a blame error.
    pub fn error_count(&self) -> usize {
        self.files
            .lock()
            .values()
            .filter(|f| !f.error.is_empty())
            .count()
    }
}

impl EditorStorage for EditorsStore {
    fn set_file_editors(&self, path: &str, editors: Option<Editors>, error: String) {
        self.files
            .lock()
            .insert(path.to_string(), FileEditors { editors, error });
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
